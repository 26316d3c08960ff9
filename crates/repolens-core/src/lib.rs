//! Repolens Core Library
//!
//! Data model, view state machine, rendering and poll policy for the
//! repository analysis client.

pub mod analysis;
pub mod config;
pub mod error;
pub mod poll;
pub mod view;

pub use analysis::{AnalysisResult, MethodDetails, RepoHandle, Submission};
pub use config::LensConfig;
pub use error::{LensError, LensResult};
pub use poll::PollPolicy;
pub use view::{ViewEvent, ViewModel, ViewState};
