//! Rendering of the view state into display text.

use serde::Serialize;

use super::model::ViewState;
use crate::analysis::{AnalysisResult, MethodDetails};

pub const IN_PROGRESS_MESSAGE: &str = "Analysis in progress... Please wait (~2 min).";
pub const FETCHING_MESSAGE: &str = "Fetching analysis...";

/// One list entry: `name: description (Time: t, Space: s)`.
pub fn method_line(name: &str, details: &MethodDetails) -> String {
    format_entry(
        name,
        &details.description,
        &details.time_complexity,
        &details.space_complexity,
    )
}

fn format_entry(name: &str, description: &str, time: &str, space: &str) -> String {
    format!("{}: {} (Time: {}, Space: {})", name, description, time, space)
}

/// A rendered method entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodView {
    pub name: String,
    pub description: String,
    pub time_complexity: String,
    pub space_complexity: String,
}

impl MethodView {
    pub fn line(&self) -> String {
        format_entry(
            &self.name,
            &self.description,
            &self.time_complexity,
            &self.space_complexity,
        )
    }
}

/// Flattened, display-ready view of a [`ViewState`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewModel {
    pub repo_url: String,
    pub handle: Option<String>,
    pub in_progress: bool,
    pub fetching: bool,
    pub error: Option<String>,
    pub summary: Option<String>,
    pub methods: Vec<MethodView>,
}

impl ViewModel {
    pub fn from_state(state: &ViewState) -> Self {
        let mut view = Self {
            repo_url: state.repo_url().unwrap_or_default().to_string(),
            handle: state.handle().map(|h| h.to_string()),
            in_progress: state.is_in_progress(),
            fetching: state.is_fetching(),
            error: state.error().map(str::to_string),
            ..Self::default()
        };

        if let Some(result) = state.result() {
            view.summary = Some(result.summary.clone());
            view.methods = method_views(result);
        }

        view
    }

    /// Plain-text rendering, one line per visible element.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if self.in_progress {
            lines.push(IN_PROGRESS_MESSAGE.to_string());
        }
        if self.fetching {
            lines.push(FETCHING_MESSAGE.to_string());
        }
        if let Some(error) = &self.error {
            lines.push(format!("Analysis failed: {}", error));
        }
        if let Some(summary) = &self.summary {
            lines.push("Analysis Summary".to_string());
            lines.push(summary.clone());
            lines.push("Methods:".to_string());
            lines.extend(self.methods.iter().map(|m| format!("- {}", m.line())));
        }
        lines
    }
}

fn method_views(result: &AnalysisResult) -> Vec<MethodView> {
    result
        .methods
        .iter()
        .map(|(name, details)| MethodView {
            name: name.clone(),
            description: details.description.clone(),
            time_complexity: details.time_complexity.clone(),
            space_complexity: details.space_complexity.clone(),
        })
        .collect()
}
