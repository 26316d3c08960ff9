//! Form-and-result page.
//!
//! Server-rendered; the page reloads itself while an analysis is pending.

use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tracing::{info, warn};

use repolens_core::view::{
    render::MethodView, ViewModel, FETCHING_MESSAGE, IN_PROGRESS_MESSAGE,
};

use crate::state::AppState;

// ============================================================
// TEMPLATES
// ============================================================

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    repo_url: String,
    in_progress: bool,
    fetching: bool,
    has_error: bool,
    error: String,
    has_summary: bool,
    summary: String,
    methods: Vec<MethodView>,
    in_progress_message: &'static str,
    fetching_message: &'static str,
    refresh_secs: u64,
}

impl IndexTemplate {
    fn from_view(view: ViewModel, refresh_secs: u64) -> Self {
        Self {
            repo_url: view.repo_url,
            in_progress: view.in_progress,
            fetching: view.fetching,
            has_error: view.error.is_some(),
            error: view.error.unwrap_or_default(),
            has_summary: view.summary.is_some(),
            summary: view.summary.unwrap_or_default(),
            methods: view.methods,
            in_progress_message: IN_PROGRESS_MESSAGE,
            fetching_message: FETCHING_MESSAGE,
            refresh_secs,
        }
    }
}

// ============================================================
// REQUEST TYPES
// ============================================================

#[derive(Deserialize)]
pub struct SubmitForm {
    #[serde(default)]
    pub repo_url: String,
}

// ============================================================
// HANDLERS
// ============================================================

/// GET / - Render the form and the current analysis.
pub async fn index(State(state): State<AppState>) -> Response {
    let view = ViewModel::from_state(&state.session.state());
    let template = IndexTemplate::from_view(view, state.refresh_secs);

    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(format!("Error: {}", e)),
        )
            .into_response(),
    }
}

/// POST /submit - Submit the form, then show the page again.
pub async fn submit(State(state): State<AppState>, Form(form): Form<SubmitForm>) -> Redirect {
    info!(repo_url = %form.repo_url, "Form submitted");
    if let Err(e) = state.session.submit(form.repo_url).await {
        // The session already moved to the failed state; the page shows it.
        warn!(error = %e, "Submission failed");
    }
    Redirect::to("/")
}
