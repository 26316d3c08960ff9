//! JSON route handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use repolens_core::{LensError, ViewState};

use crate::state::AppState;

#[derive(Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    pub repo_url: String,
}

#[derive(Serialize)]
pub struct SubmitReply {
    pub repo_id: String,
}

/// GET /api/state - Current view state.
pub async fn get_state(State(state): State<AppState>) -> Json<ViewState> {
    Json(state.session.state())
}

/// POST /api/submit - Submit a repository URL.
pub async fn submit(
    State(state): State<AppState>,
    Json(req): Json<SubmitRequest>,
) -> Result<(StatusCode, Json<SubmitReply>), (StatusCode, String)> {
    let handle = state
        .session
        .submit(req.repo_url)
        .await
        .map_err(|e| (status_for(&e), e.to_string()))?;

    Ok((
        StatusCode::ACCEPTED,
        Json(SubmitReply {
            repo_id: handle.to_string(),
        }),
    ))
}

/// GET /health
pub async fn health() -> &'static str {
    "ok"
}

fn status_for(error: &LensError) -> StatusCode {
    match error {
        LensError::Status { status, .. } if *status == 401 || *status == 403 => {
            StatusCode::UNAUTHORIZED
        }
        _ => StatusCode::BAD_GATEWAY,
    }
}
