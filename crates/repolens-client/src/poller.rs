//! Result polling.
//!
//! Waits according to a [`PollPolicy`] before every result request. Only
//! "not ready" answers lead to another attempt; any error ends polling.

use tracing::{debug, info, warn};

use repolens_core::{AnalysisResult, LensError, LensResult, PollPolicy, RepoHandle, ViewEvent};

use crate::backend::{AnalysisBackend, FetchOutcome};

/// Poll until the result for `handle` is ready.
///
/// `on_event` sees a `FetchStarted` before each request and a `NotReady`
/// after each pending answer.
pub async fn poll_until_ready(
    backend: &dyn AnalysisBackend,
    handle: &RepoHandle,
    policy: &PollPolicy,
    mut on_event: impl FnMut(ViewEvent) + Send,
) -> LensResult<AnalysisResult> {
    for attempt in 1..=policy.max_attempts {
        let delay = policy.delay_for(attempt);
        debug!(repo_id = %handle, attempt, delay_secs = delay.as_secs_f64(), "Waiting before result request");
        tokio::time::sleep(delay).await;

        on_event(ViewEvent::FetchStarted {
            handle: handle.clone(),
            attempt,
        });

        match backend.fetch(handle).await {
            Ok(FetchOutcome::Ready(result)) => {
                info!(repo_id = %handle, attempt, "Analysis ready");
                return Ok(result);
            }
            Ok(FetchOutcome::Pending) => {
                debug!(repo_id = %handle, attempt, "Analysis not ready");
                on_event(ViewEvent::NotReady {
                    handle: handle.clone(),
                });
            }
            Err(e) => {
                warn!(repo_id = %handle, attempt, error = %e, "Result request failed");
                return Err(e);
            }
        }
    }

    warn!(repo_id = %handle, attempts = policy.max_attempts, "Gave up waiting for analysis");
    Err(LensError::TimedOut {
        attempts: policy.max_attempts,
    })
}

/// Wait for the result of `handle`, or return `None` straight away when
/// there is no handle yet.
pub async fn fetch_after_wait(
    backend: &dyn AnalysisBackend,
    handle: Option<&RepoHandle>,
    policy: &PollPolicy,
) -> LensResult<Option<AnalysisResult>> {
    match handle {
        Some(handle) => poll_until_ready(backend, handle, policy, |_| {}).await.map(Some),
        None => Ok(None),
    }
}
