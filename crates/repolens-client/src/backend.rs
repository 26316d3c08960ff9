//! Backend abstraction.

use async_trait::async_trait;
use repolens_core::{AnalysisResult, LensResult, RepoHandle, Submission};

/// Answer of a single result request.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Ready(AnalysisResult),
    /// The backend has not finished this analysis yet.
    Pending,
}

/// The two operations the analysis view needs from a backend.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Register a repository URL for analysis.
    async fn submit(&self, submission: &Submission) -> LensResult<RepoHandle>;

    /// Ask for the result of a previous submission.
    async fn fetch(&self, handle: &RepoHandle) -> LensResult<FetchOutcome>;
}
