//! One user's form-and-result session.
//!
//! Holds the current [`ViewState`] in a watch channel and drives it: a submit
//! request, then one poll task for the accepted handle. Submitting again
//! aborts the previous poll task.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use repolens_core::{LensError, LensResult, PollPolicy, RepoHandle, Submission, ViewEvent, ViewState};

use crate::backend::AnalysisBackend;
use crate::poller::poll_until_ready;

/// Drives a [`ViewState`] through submit and poll.
pub struct AnalysisSession {
    backend: Arc<dyn AnalysisBackend>,
    policy: PollPolicy,
    state: Arc<watch::Sender<ViewState>>,
    next_ticket: AtomicU64,
    poll_task: Mutex<Option<JoinHandle<()>>>,
}

impl AnalysisSession {
    pub fn new(backend: Arc<dyn AnalysisBackend>, policy: PollPolicy) -> Self {
        let (tx, _rx) = watch::channel(ViewState::Idle);
        Self {
            backend,
            policy,
            state: Arc::new(tx),
            next_ticket: AtomicU64::new(1),
            poll_task: Mutex::new(None),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> ViewState {
        self.state.borrow().clone()
    }

    /// Receive every state change.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Submit `repo_url` and start polling for its result.
    ///
    /// Any string is accepted. On failure the view moves to `Failed` and the
    /// error is returned as well.
    pub async fn submit(&self, repo_url: impl Into<String>) -> LensResult<RepoHandle> {
        let repo_url = repo_url.into();
        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);

        self.begin(&repo_url, ticket);

        let handle = match self.backend.submit(&Submission::new(repo_url.as_str())).await {
            Ok(handle) => handle,
            Err(e) => {
                warn!(repo_url = %repo_url, error = %e, "Submit failed");
                dispatch(
                    &self.state,
                    ViewEvent::SubmitFailed {
                        ticket,
                        error: e.to_string(),
                    },
                );
                return Err(e);
            }
        };

        if self.accept(ticket, &handle) {
            info!(repo_url = %repo_url, repo_id = %handle, "Submission accepted, polling for result");
        } else {
            debug!(repo_id = %handle, "Submission superseded before it was accepted");
        }

        Ok(handle)
    }

    /// Wait until the current submission resolves or fails.
    pub async fn wait(&self) -> LensResult<ViewState> {
        let mut rx = self.subscribe();
        let state = rx
            .wait_for(ViewState::is_terminal)
            .await
            .map_err(|_| LensError::config("session state channel closed"))?;
        Ok(ViewState::clone(&state))
    }

    /// Abort the running poll task and enter `Submitting` for `ticket`.
    ///
    /// Runs under the task lock so it cannot interleave with [`Self::accept`].
    fn begin(&self, repo_url: &str, ticket: u64) {
        let mut task = self.lock_task();
        if let Some(previous) = task.take() {
            debug!("Aborting previous poll task");
            previous.abort();
        }
        dispatch(
            &self.state,
            ViewEvent::Submit {
                repo_url: repo_url.to_string(),
                ticket,
            },
        );
    }

    /// Record `handle` for `ticket` and start its poll task, unless a newer
    /// submission has begun in the meantime.
    fn accept(&self, ticket: u64, handle: &RepoHandle) -> bool {
        let mut task = self.lock_task();
        let current = matches!(
            &*self.state.borrow(),
            ViewState::Submitting { ticket: t, .. } if *t == ticket
        );
        if !current {
            return false;
        }

        dispatch(
            &self.state,
            ViewEvent::Accepted {
                ticket,
                handle: handle.clone(),
                at: Utc::now(),
            },
        );
        if let Some(previous) = task.replace(self.spawn_poll(handle.clone())) {
            previous.abort();
        }
        true
    }

    fn spawn_poll(&self, handle: RepoHandle) -> JoinHandle<()> {
        let backend = Arc::clone(&self.backend);
        let policy = self.policy.clone();
        let state = Arc::clone(&self.state);

        tokio::spawn(async move {
            let outcome = poll_until_ready(&*backend, &handle, &policy, |event| {
                dispatch(&state, event);
            })
            .await;

            let event = match outcome {
                Ok(result) => ViewEvent::Fetched { handle, result },
                Err(e) => ViewEvent::FetchFailed {
                    handle,
                    error: e.to_string(),
                },
            };
            dispatch(&state, event);
        })
    }

    fn lock_task(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.poll_task.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn stop_polling(&self) {
        if let Some(task) = self.lock_task().take() {
            debug!("Aborting poll task");
            task.abort();
        }
    }
}

impl Drop for AnalysisSession {
    fn drop(&mut self) {
        self.stop_polling();
    }
}

/// Apply `event` and return the resulting state.
fn dispatch(state: &watch::Sender<ViewState>, event: ViewEvent) -> ViewState {
    let mut next = ViewState::Idle;
    state.send_if_modified(|current| {
        let updated = current.apply(event);
        let changed = updated != *current;
        if changed {
            debug!(from = current.name(), to = updated.name(), "View state changed");
            *current = updated;
        }
        next = current.clone();
        changed
    });
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeBackend;
    use std::time::Duration;
    use tokio::time::Instant;

    fn new_session(backend: &Arc<FakeBackend>) -> AnalysisSession {
        let backend: Arc<dyn AnalysisBackend> = backend.clone();
        AnalysisSession::new(backend, PollPolicy::fixed(Duration::from_secs(120)))
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_waits_before_fetching() {
        let backend = Arc::new(FakeBackend::ready("abc", "S"));
        let session = new_session(&backend);
        let start = Instant::now();

        let handle = session.submit("https://github.com/x/y").await.unwrap();
        assert_eq!(handle.as_str(), "abc");
        assert!(matches!(session.state(), ViewState::Submitted { .. }));
        assert_eq!(backend.submissions()[0].repo_url, "https://github.com/x/y");

        tokio::time::sleep(Duration::from_secs(119)).await;
        assert!(backend.fetches().is_empty());
        assert!(session.state().is_in_progress());

        let state = session.wait().await.unwrap();
        assert_eq!(state.result().map(|r| r.summary.as_str()), Some("S"));

        let fetches = backend.fetches();
        assert_eq!(fetches.len(), 1);
        assert_eq!(fetches[0].0.as_str(), "abc");
        assert!(fetches[0].1 - start >= Duration::from_secs(120));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_url_still_submitted() {
        let backend = Arc::new(FakeBackend::ready("abc", "S"));
        let session = new_session(&backend);

        session.submit("").await.unwrap();
        assert_eq!(backend.submissions(), vec![Submission::new("")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resubmit_shows_only_second_analysis() {
        let backend = Arc::new(FakeBackend::with_handles(&["first", "second"]));
        let session = new_session(&backend);

        session.submit("https://github.com/a/a").await.unwrap();
        tokio::time::sleep(Duration::from_secs(60)).await;
        session.submit("https://github.com/b/b").await.unwrap();

        let state = session.wait().await.unwrap();
        assert_eq!(state.repo_url(), Some("https://github.com/b/b"));
        assert_eq!(state.result().map(|r| r.summary.as_str()), Some("second"));

        let fetched: Vec<String> = backend
            .fetches()
            .iter()
            .map(|(h, _)| h.to_string())
            .collect();
        assert_eq!(fetched, vec!["second"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_failure_shows_error_without_result() {
        let backend = Arc::new(FakeBackend::failing("abc", 503));
        let session = new_session(&backend);

        session.submit("u").await.unwrap();
        let state = session.wait().await.unwrap();

        assert!(state.result().is_none());
        assert!(state.error().unwrap().contains("503"));
        assert_eq!(state.handle().map(|h| h.as_str()), Some("abc"));
    }

    #[tokio::test]
    async fn test_submit_failure_is_reported() {
        let backend = Arc::new(FakeBackend::rejecting_submits(401));
        let session = new_session(&backend);

        let err = session.submit("u").await.unwrap_err();
        assert!(matches!(err, LensError::Status { status: 401, .. }));

        let state = session.state();
        assert!(matches!(state, ViewState::Failed { handle: None, .. }));
        assert!(backend.fetches().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_resubmit_leaves_no_poll_running() {
        let backend = Arc::new(FakeBackend::accepting_then_rejecting("first", 500));
        let session = new_session(&backend);

        session.submit("https://github.com/a/a").await.unwrap();
        assert!(session.submit("https://github.com/b/b").await.is_err());

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert!(backend.fetches().is_empty());
        assert!(matches!(session.state(), ViewState::Failed { handle: None, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_accept_does_not_start_polling() {
        let backend = Arc::new(FakeBackend::ready("abc", "S"));
        let session = new_session(&backend);

        // The older submission's answer arrives after a newer one began.
        session.begin("https://github.com/a/a", 1);
        session.begin("https://github.com/b/b", 2);
        assert!(!session.accept(1, &RepoHandle::new("abc")));
        assert!(session.lock_task().is_none());
        assert!(matches!(session.state(), ViewState::Submitting { ticket: 2, .. }));

        assert!(session.accept(2, &RepoHandle::new("abc")));
        assert!(session.lock_task().is_some());
        let state = session.wait().await.unwrap();
        assert_eq!(state.repo_url(), Some("https://github.com/b/b"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_progress() {
        let backend = Arc::new(FakeBackend::ready("abc", "S"));
        let session = new_session(&backend);
        let mut rx = session.subscribe();

        session.submit("u").await.unwrap();
        rx.wait_for(|s| s.is_fetching() || s.is_terminal())
            .await
            .unwrap();
        let state = session.wait().await.unwrap();
        assert!(matches!(state, ViewState::Resolved { .. }));
    }
}
