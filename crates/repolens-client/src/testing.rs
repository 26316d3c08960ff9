//! Scripted in-memory backend for tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::time::Instant;

use repolens_core::{
    AnalysisResult, LensError, LensResult, MethodDetails, RepoHandle, Submission,
};

use crate::backend::{AnalysisBackend, FetchOutcome};

#[derive(Debug, Clone)]
enum Reply {
    Pending,
    /// `None` uses the handle as the summary.
    Ready(Option<String>),
    Fail(u16),
}

/// Backend that hands out scripted handles and replies. The last handle
/// and the last reply repeat once the script runs out.
pub struct FakeBackend {
    handles: Mutex<VecDeque<RepoHandle>>,
    replies: Mutex<VecDeque<Reply>>,
    /// `Some(status)` rejects that submit.
    submit_results: Mutex<VecDeque<Option<u16>>>,
    submissions: Mutex<Vec<Submission>>,
    fetches: Mutex<Vec<(RepoHandle, Instant)>>,
}

impl FakeBackend {
    fn scripted(handles: &[&str], replies: Vec<Reply>) -> Self {
        Self {
            handles: Mutex::new(handles.iter().map(|h| RepoHandle::new(*h)).collect()),
            replies: Mutex::new(replies.into()),
            submit_results: Mutex::new(VecDeque::from([None])),
            submissions: Mutex::new(Vec::new()),
            fetches: Mutex::new(Vec::new()),
        }
    }

    /// Every fetch returns a result with `summary`.
    pub fn ready(handle: &str, summary: &str) -> Self {
        Self::scripted(&[handle], vec![Reply::Ready(Some(summary.to_string()))])
    }

    /// `pending` fetches answer "not ready", then a result with `summary`.
    pub fn pending_then_ready(handle: &str, pending: usize, summary: &str) -> Self {
        let mut replies = vec![Reply::Pending; pending];
        replies.push(Reply::Ready(Some(summary.to_string())));
        Self::scripted(&[handle], replies)
    }

    /// Every fetch fails with `status`.
    pub fn failing(handle: &str, status: u16) -> Self {
        Self::scripted(&[handle], vec![Reply::Fail(status)])
    }

    /// Successive submits receive successive handles; each result's summary
    /// is its handle.
    pub fn with_handles(handles: &[&str]) -> Self {
        Self::scripted(handles, vec![Reply::Ready(None)])
    }

    /// Every submit fails with `status`.
    pub fn rejecting_submits(status: u16) -> Self {
        Self {
            submit_results: Mutex::new(VecDeque::from([Some(status)])),
            ..Self::scripted(&["unused"], vec![Reply::Pending])
        }
    }

    /// The first submit receives `handle`, later submits fail with `status`.
    /// Fetches never complete.
    pub fn accepting_then_rejecting(handle: &str, status: u16) -> Self {
        Self {
            submit_results: Mutex::new(VecDeque::from([None, Some(status)])),
            ..Self::scripted(&[handle], vec![Reply::Pending])
        }
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().unwrap().clone()
    }

    /// Every fetch so far, with the (tokio) time it happened.
    pub fn fetches(&self) -> Vec<(RepoHandle, Instant)> {
        self.fetches.lock().unwrap().clone()
    }

    fn next<T: Clone>(queue: &Mutex<VecDeque<T>>) -> Option<T> {
        let mut queue = queue.lock().unwrap();
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

/// A result with a single `foo` method.
pub fn sample_result(summary: &str) -> AnalysisResult {
    let mut result = AnalysisResult {
        summary: summary.to_string(),
        methods: Default::default(),
    };
    result.methods.insert(
        "foo".to_string(),
        MethodDetails {
            description: "D".to_string(),
            time_complexity: "O(n)".to_string(),
            space_complexity: "O(1)".to_string(),
        },
    );
    result
}

#[async_trait]
impl AnalysisBackend for FakeBackend {
    async fn submit(&self, submission: &Submission) -> LensResult<RepoHandle> {
        self.submissions.lock().unwrap().push(submission.clone());
        if let Some(Some(status)) = Self::next(&self.submit_results) {
            return Err(LensError::Status {
                status,
                body: "rejected".to_string(),
            });
        }
        Self::next(&self.handles).ok_or_else(|| LensError::decode("no handle scripted"))
    }

    async fn fetch(&self, handle: &RepoHandle) -> LensResult<FetchOutcome> {
        self.fetches
            .lock()
            .unwrap()
            .push((handle.clone(), Instant::now()));

        match Self::next(&self.replies) {
            Some(Reply::Ready(summary)) => {
                let summary = summary.unwrap_or_else(|| handle.to_string());
                Ok(FetchOutcome::Ready(sample_result(&summary)))
            }
            Some(Reply::Fail(status)) => Err(LensError::Status {
                status,
                body: "boom".to_string(),
            }),
            Some(Reply::Pending) | None => Ok(FetchOutcome::Pending),
        }
    }
}
