//! Analysis domain models.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A repository URL as typed by the user. Never validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub repo_url: String,
}

impl Submission {
    pub fn new(repo_url: impl Into<String>) -> Self {
        Self {
            repo_url: repo_url.into(),
        }
    }
}

/// Opaque identifier the backend assigns to a submission.
///
/// Backends encode it either as a string or as a number; both are kept
/// in their textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RepoHandle(String);

impl RepoHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RepoHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RepoHandle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(s) => Ok(Self(s)),
            serde_json::Value::Number(n) => Ok(Self(n.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "expected a string or number repo_id, got {}",
                other
            ))),
        }
    }
}

/// Body returned by the submit endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub repo_id: RepoHandle,
    #[serde(default)]
    pub message: Option<String>,
}

/// Per-method analysis details. Complexities the backend left out are empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDetails {
    pub description: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub time_complexity: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub space_complexity: String,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A finished analysis. Methods keep the order the backend sent them in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summary: String,
    #[serde(default)]
    pub methods: IndexMap<String, MethodDetails>,
}

/// Raw result body, which may describe an analysis still in progress.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisPayload {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub methods: Option<IndexMap<String, MethodDetails>>,
}

impl AnalysisPayload {
    /// Convert into a finished result. A missing summary means the backend
    /// has not completed yet.
    pub fn into_result(self) -> Option<AnalysisResult> {
        let summary = self.summary?;
        Some(AnalysisResult {
            summary,
            methods: self.methods.unwrap_or_default(),
        })
    }
}

/// Repository report from the analysis router: metadata plus every
/// analysed method as a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub repo_name: String,
    pub description: String,
    #[serde(default)]
    pub methods: Vec<ReportMethod>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMethod {
    pub method_name: String,
    #[serde(flatten)]
    pub details: MethodDetails,
}

/// Improvement suggestions for one analysed method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestions {
    pub method_name: String,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// Login or sign-up credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Bearer token issued by the backend's auth endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_handle_from_string_or_number() {
        let text: SubmitResponse =
            serde_json::from_str(r#"{"repo_id": "abc", "message": "started"}"#).unwrap();
        assert_eq!(text.repo_id.as_str(), "abc");
        assert_eq!(text.message.as_deref(), Some("started"));

        let number: SubmitResponse =
            serde_json::from_str(r#"{"repo_id": -8263513227412369000}"#).unwrap();
        assert_eq!(number.repo_id.as_str(), "-8263513227412369000");
        assert_eq!(number.message, None);
    }

    #[test]
    fn test_handle_rejects_other_shapes() {
        let err = serde_json::from_str::<SubmitResponse>(r#"{"repo_id": null}"#);
        assert!(err.is_err());
        let err = serde_json::from_str::<SubmitResponse>(r#"{"repo_id": ["a"]}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_payload_with_summary_is_ready() {
        let payload: AnalysisPayload = serde_json::from_str(
            r#"{
                "summary": "S",
                "methods": {
                    "zeta": {"description": "Z", "time_complexity": "O(1)", "space_complexity": "O(1)"},
                    "alpha": {"description": "A", "time_complexity": "O(n)", "space_complexity": "O(n)"}
                }
            }"#,
        )
        .unwrap();
        let result = payload.into_result().unwrap();
        assert_eq!(result.summary, "S");
        let names: Vec<&str> = result.methods.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_payload_without_summary_is_pending() {
        let payload: AnalysisPayload =
            serde_json::from_str(r#"{"summary": null, "methods": {}}"#).unwrap();
        assert!(payload.into_result().is_none());

        let payload: AnalysisPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.into_result().is_none());
    }

    #[test]
    fn test_payload_without_methods_defaults_empty() {
        let payload: AnalysisPayload = serde_json::from_str(r#"{"summary": "only"}"#).unwrap();
        let result = payload.into_result().unwrap();
        assert!(result.methods.is_empty());
    }

    #[test]
    fn test_null_complexity_is_empty() {
        let payload: AnalysisPayload = serde_json::from_str(
            r#"{"summary":"S","methods":{"foo":{"description":"D","time_complexity":null,"space_complexity":"O(1)"}}}"#,
        )
        .unwrap();
        let result = payload.into_result().unwrap();
        let foo = &result.methods["foo"];
        assert_eq!(foo.time_complexity, "");
        assert_eq!(foo.space_complexity, "O(1)");
        assert_eq!(
            crate::view::method_line("foo", foo),
            "foo: D (Time: , Space: O(1))"
        );

        let payload: AnalysisPayload =
            serde_json::from_str(r#"{"summary":"S","methods":{"bar":{"description":"B"}}}"#).unwrap();
        let result = payload.into_result().unwrap();
        assert_eq!(result.methods["bar"].space_complexity, "");
    }

    #[test]
    fn test_report_lists_methods_in_order() {
        let report: Report = serde_json::from_str(
            r#"{
                "repo_name": "y",
                "description": "A repo",
                "methods": [
                    {"method_name": "zeta", "description": "Z", "time_complexity": "O(1)", "space_complexity": null},
                    {"method_name": "alpha", "description": "A", "time_complexity": "O(n)", "space_complexity": "O(n)"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(report.repo_name, "y");
        let names: Vec<&str> = report.methods.iter().map(|m| m.method_name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert_eq!(report.methods[0].details.space_complexity, "");
        assert_eq!(report.methods[1].details.time_complexity, "O(n)");
    }

    #[test]
    fn test_access_token_defaults_type() {
        let token: AccessToken = serde_json::from_str(r#"{"access_token": "t"}"#).unwrap();
        assert_eq!(token.token_type, "bearer");
    }
}
