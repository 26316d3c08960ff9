//! Application state.

use repolens_client::AnalysisSession;
use std::sync::Arc;

/// Seconds between automatic page reloads while an analysis is pending.
pub const DEFAULT_REFRESH_SECS: u64 = 5;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<AnalysisSession>,
    pub refresh_secs: u64,
}

impl AppState {
    pub fn new(session: Arc<AnalysisSession>) -> Self {
        Self {
            session,
            refresh_secs: DEFAULT_REFRESH_SECS,
        }
    }
}
