//! View state and events.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analysis::{AnalysisResult, RepoHandle};

/// Where a single analysis session stands.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewState {
    /// Nothing submitted yet.
    #[default]
    Idle,
    /// Submit request in flight. `ticket` tells overlapping submits apart.
    Submitting { repo_url: String, ticket: u64 },
    /// Handle received, waiting before the next result request.
    Submitted {
        repo_url: String,
        handle: RepoHandle,
        submitted_at: DateTime<Utc>,
        attempts: u32,
    },
    /// Result request in flight.
    Fetching {
        repo_url: String,
        handle: RepoHandle,
        submitted_at: DateTime<Utc>,
        attempt: u32,
    },
    Resolved {
        repo_url: String,
        handle: RepoHandle,
        result: AnalysisResult,
    },
    Failed {
        repo_url: String,
        handle: Option<RepoHandle>,
        error: String,
    },
}

impl ViewState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Submitting { .. } => "submitting",
            Self::Submitted { .. } => "submitted",
            Self::Fetching { .. } => "fetching",
            Self::Resolved { .. } => "resolved",
            Self::Failed { .. } => "failed",
        }
    }

    /// The handle of the current submission, if the backend assigned one.
    pub fn handle(&self) -> Option<&RepoHandle> {
        match self {
            Self::Submitted { handle, .. }
            | Self::Fetching { handle, .. }
            | Self::Resolved { handle, .. } => Some(handle),
            Self::Failed { handle, .. } => handle.as_ref(),
            Self::Idle | Self::Submitting { .. } => None,
        }
    }

    pub fn repo_url(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Submitting { repo_url, .. }
            | Self::Submitted { repo_url, .. }
            | Self::Fetching { repo_url, .. }
            | Self::Resolved { repo_url, .. }
            | Self::Failed { repo_url, .. } => Some(repo_url),
        }
    }

    /// True from the moment a URL is submitted until it resolves or fails.
    pub fn is_in_progress(&self) -> bool {
        matches!(
            self,
            Self::Submitting { .. } | Self::Submitted { .. } | Self::Fetching { .. }
        )
    }

    pub fn is_fetching(&self) -> bool {
        matches!(self, Self::Fetching { .. })
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            Self::Resolved { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Resolved or failed; no further events for this submission apply.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved { .. } | Self::Failed { .. })
    }
}

/// Something that happened to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Submit {
        repo_url: String,
        ticket: u64,
    },
    Accepted {
        ticket: u64,
        handle: RepoHandle,
        at: DateTime<Utc>,
    },
    SubmitFailed {
        ticket: u64,
        error: String,
    },
    FetchStarted {
        handle: RepoHandle,
        attempt: u32,
    },
    NotReady {
        handle: RepoHandle,
    },
    Fetched {
        handle: RepoHandle,
        result: AnalysisResult,
    },
    FetchFailed {
        handle: RepoHandle,
        error: String,
    },
}
