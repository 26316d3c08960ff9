//! # Repolens Client
//!
//! HTTP access to the repository analysis backend, result polling and the
//! submit-then-poll session that backs both the CLI and the web view.

pub mod backend;
pub mod client;
pub mod poller;
pub mod session;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use backend::{AnalysisBackend, FetchOutcome};
pub use client::AnalysisClient;
pub use poller::{fetch_after_wait, poll_until_ready};
pub use session::AnalysisSession;
