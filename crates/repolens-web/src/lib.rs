//! Repolens Web Server
//!
//! Axum-based single-page view: a repository URL form and the analysis
//! result, backed by one [`AnalysisSession`].

pub mod routes;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use repolens_client::AnalysisSession;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/state", get(routes::api::get_state))
        .route("/submit", post(routes::api::submit))
        .with_state(state.clone());

    Router::new()
        .route("/", get(routes::page::index))
        .route("/submit", post(routes::page::submit))
        .route("/health", get(routes::api::health))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Run the web server.
pub async fn run_server(session: Arc<AnalysisSession>, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(session);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;
    tracing::info!("Web server listening on http://{}:{}", host, port);

    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use repolens_client::testing::FakeBackend;
    use repolens_client::AnalysisBackend;
    use repolens_core::view::IN_PROGRESS_MESSAGE;
    use repolens_core::{PollPolicy, ViewState};
    use std::time::Duration;
    use tower::ServiceExt;

    fn app_with(backend: FakeBackend, delay: Duration) -> (Router, Arc<AnalysisSession>) {
        let backend: Arc<dyn AnalysisBackend> = Arc::new(backend);
        let session = Arc::new(AnalysisSession::new(backend, PollPolicy::fixed(delay)));
        (create_router(AppState::new(session.clone())), session)
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn get_page(app: &Router) -> String {
        let response = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        body_text(response).await
    }

    fn form_post(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/submit")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_idle_page_shows_form_only() {
        let (app, _session) = app_with(FakeBackend::ready("abc", "S"), Duration::from_secs(120));
        let html = get_page(&app).await;

        assert!(html.contains("Enter GitHub Repo URL"));
        assert!(!html.contains(IN_PROGRESS_MESSAGE));
        assert!(!html.contains("Analysis Summary"));
        assert!(!html.contains("http-equiv=\"refresh\""));
    }

    #[tokio::test]
    async fn test_submit_form_shows_progress() {
        let (app, session) = app_with(FakeBackend::ready("abc", "S"), Duration::from_secs(120));

        let response = app
            .clone()
            .oneshot(form_post("repo_url=https%3A%2F%2Fgithub.com%2Fx%2Fy"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");

        assert!(matches!(session.state(), ViewState::Submitted { .. }));

        let html = get_page(&app).await;
        assert!(html.contains(IN_PROGRESS_MESSAGE));
        assert!(html.contains("http-equiv=\"refresh\""));
        // The escaper may or may not encode '/'.
        assert!(
            html.contains("value=\"https://github.com/x/y\"")
                || html.contains("value=\"https:&#x2f;&#x2f;github.com&#x2f;x&#x2f;y\"")
        );
    }

    #[tokio::test]
    async fn test_resolved_page_lists_methods() {
        let (app, session) = app_with(FakeBackend::ready("abc", "S"), Duration::from_millis(1));

        app.clone().oneshot(form_post("repo_url=u")).await.unwrap();
        session.wait().await.unwrap();

        let html = get_page(&app).await;
        assert!(html.contains("Analysis Summary"));
        assert!(html.contains("<strong>foo:</strong> D (Time: O(n), Space: O(1))"));
        assert_eq!(html.matches("<li>").count(), 1);
        assert!(!html.contains(IN_PROGRESS_MESSAGE));
    }

    #[tokio::test]
    async fn test_summary_is_escaped() {
        let (app, session) = app_with(
            FakeBackend::ready("abc", "<script>alert(1)</script>"),
            Duration::from_millis(1),
        );

        app.clone().oneshot(form_post("repo_url=u")).await.unwrap();
        session.wait().await.unwrap();

        let html = get_page(&app).await;
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[tokio::test]
    async fn test_failed_fetch_shows_error_not_result() {
        let (app, session) = app_with(FakeBackend::failing("abc", 500), Duration::from_millis(1));

        app.clone().oneshot(form_post("repo_url=u")).await.unwrap();
        session.wait().await.unwrap();

        let html = get_page(&app).await;
        assert!(html.contains("Analysis failed"));
        assert!(!html.contains("Analysis Summary"));
    }

    #[tokio::test]
    async fn test_empty_form_is_submitted() {
        let backend = Arc::new(FakeBackend::ready("abc", "S"));
        let dyn_backend: Arc<dyn AnalysisBackend> = backend.clone();
        let session = Arc::new(AnalysisSession::new(
            dyn_backend,
            PollPolicy::fixed(Duration::from_secs(120)),
        ));
        let app = create_router(AppState::new(session));

        app.oneshot(form_post("repo_url=")).await.unwrap();

        let submissions = backend.submissions();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].repo_url, "");
    }

    #[tokio::test]
    async fn test_api_submit_and_state() {
        let (app, _session) = app_with(FakeBackend::ready("abc", "S"), Duration::from_secs(120));

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/submit")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"repo_url": "https://github.com/x/y"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let reply: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(reply["repo_id"], "abc");

        let response = app
            .oneshot(Request::builder().uri("/api/state").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let state: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(state["state"], "submitted");
        assert_eq!(state["handle"], "abc");
        assert_eq!(state["repo_url"], "https://github.com/x/y");
    }

    #[tokio::test]
    async fn test_api_submit_rejected() {
        let (app, _session) = app_with(FakeBackend::rejecting_submits(401), Duration::from_secs(1));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/submit")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"repo_url": "u"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _session) = app_with(FakeBackend::ready("abc", "S"), Duration::from_secs(1));
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(body_text(response).await, "ok");
    }
}
