//! Repository analysis: submissions, handles and results.

pub mod model;

pub use model::{
    AccessToken, AnalysisPayload, AnalysisResult, Credentials, MethodDetails, RepoHandle,
    Report, ReportMethod, SubmitResponse, Submission, Suggestions,
};
