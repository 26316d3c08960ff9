//! HTTP client for the repository analysis backend.

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use repolens_core::analysis::{
    AccessToken, AnalysisPayload, Credentials, Report, SubmitResponse, Suggestions,
};
use repolens_core::{LensConfig, LensError, LensResult, RepoHandle, Submission};

use crate::backend::{AnalysisBackend, FetchOutcome};

/// Client for the backend's repo, analysis and auth endpoints.
#[derive(Clone)]
pub struct AnalysisClient {
    client: reqwest::Client,
    api_base: Url,
    token: Option<String>,
}

impl AnalysisClient {
    /// Create a client from configuration.
    pub fn new(config: &LensConfig) -> LensResult<Self> {
        let api_base = Url::parse(&config.api_base()).map_err(|e| {
            LensError::config(format!("invalid backend_url '{}': {}", config.backend_url, e))
        })?;
        if api_base.cannot_be_a_base() {
            return Err(LensError::config(format!(
                "backend_url '{}' cannot carry a path",
                config.backend_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| LensError::config(format!("cannot build HTTP client: {}", e)))?;

        debug!(api_base = %api_base, authenticated = config.token.is_some(), "AnalysisClient initialized");

        Ok(Self {
            client,
            api_base,
            token: config.token.clone(),
        })
    }

    /// Use `token` as the bearer token for every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// URL of an endpoint below the API base. Segments are percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Submit a repository URL and return the backend's handle for it.
    pub async fn submit(&self, submission: &Submission) -> LensResult<RepoHandle> {
        let url = self.endpoint(&["repo", "submit_repo"]);
        let request = self.client.post(url.clone()).json(submission);
        let response = self.send(request, &url).await?;
        let body: SubmitResponse = decode(ok_or_status(response).await?, &url).await?;

        info!(
            repo_url = %submission.repo_url,
            repo_id = %body.repo_id,
            backend_message = body.message.as_deref().unwrap_or(""),
            "Repository submitted"
        );
        Ok(body.repo_id)
    }

    /// Request the analysis result once.
    ///
    /// `404` and a body without a summary both mean the analysis is still
    /// running.
    pub async fn fetch(&self, handle: &RepoHandle) -> LensResult<FetchOutcome> {
        let url = self.endpoint(&["repo", "get_repo", handle.as_str()]);
        let response = self.send(self.client.get(url.clone()), &url).await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(repo_id = %handle, "Analysis not found yet");
            return Ok(FetchOutcome::Pending);
        }

        let payload: AnalysisPayload = decode(ok_or_status(response).await?, &url).await?;
        match payload.into_result() {
            Some(result) => {
                info!(repo_id = %handle, methods = result.methods.len(), "Analysis received");
                Ok(FetchOutcome::Ready(result))
            }
            None => {
                debug!(repo_id = %handle, "Analysis has no summary yet");
                Ok(FetchOutcome::Pending)
            }
        }
    }

    /// The analysis router's report: repository name, description and the
    /// analysed methods as a list. Unlike [`Self::fetch`], a 404 is an error.
    pub async fn report(&self, handle: &RepoHandle) -> LensResult<Report> {
        let url = self.endpoint(&["analysis", "get_repo", handle.as_str()]);
        let response = self.send(self.client.get(url.clone()), &url).await?;
        let report: Report = decode(ok_or_status(response).await?, &url).await?;
        debug!(repo_id = %handle, methods = report.methods.len(), "Report received");
        Ok(report)
    }

    /// Improvement suggestions the backend generated for one method.
    pub async fn suggestions(&self, handle: &RepoHandle, method: &str) -> LensResult<Suggestions> {
        let url = self.endpoint(&["analysis", "get_suggestions", handle.as_str(), method]);
        let response = self.send(self.client.get(url.clone()), &url).await?;
        let suggestions: Suggestions = decode(ok_or_status(response).await?, &url).await?;
        debug!(
            repo_id = %handle,
            method,
            count = suggestions.suggestions.len(),
            "Suggestions received"
        );
        Ok(suggestions)
    }

    /// Log in with existing credentials.
    pub async fn login(&self, credentials: &Credentials) -> LensResult<AccessToken> {
        self.authenticate("login", credentials).await
    }

    /// Register a new account and log in.
    pub async fn signin(&self, credentials: &Credentials) -> LensResult<AccessToken> {
        self.authenticate("signin", credentials).await
    }

    async fn authenticate(&self, action: &str, credentials: &Credentials) -> LensResult<AccessToken> {
        let url = self.endpoint(&["auth", action]);
        let request = self.client.post(url.clone()).json(credentials);
        let response = self.send(request, &url).await?;
        let token: AccessToken = decode(ok_or_status(response).await?, &url).await?;
        info!(email = %credentials.email, action, "Authenticated");
        Ok(token)
    }

    async fn send(&self, request: RequestBuilder, url: &Url) -> LensResult<Response> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        request
            .send()
            .await
            .map_err(|e| LensError::transport(url.as_str(), e.to_string()))
    }
}

#[async_trait]
impl AnalysisBackend for AnalysisClient {
    async fn submit(&self, submission: &Submission) -> LensResult<RepoHandle> {
        AnalysisClient::submit(self, submission).await
    }

    async fn fetch(&self, handle: &RepoHandle) -> LensResult<FetchOutcome> {
        AnalysisClient::fetch(self, handle).await
    }
}

async fn ok_or_status(response: Response) -> LensResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(LensError::Status {
        status: status.as_u16(),
        body,
    })
}

async fn decode<T: DeserializeOwned>(response: Response, url: &Url) -> LensResult<T> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| LensError::transport(url.as_str(), e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| LensError::decode(format!("{}: {}", url, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_client(backend_url: &str, prefix: &str) -> AnalysisClient {
        let config = LensConfig {
            backend_url: backend_url.to_string(),
            api_prefix: prefix.to_string(),
            ..LensConfig::default()
        };
        AnalysisClient::new(&config).unwrap()
    }

    #[test]
    fn test_endpoint_paths() {
        let client = make_client("http://localhost:8000/", "/api");
        assert_eq!(
            client.endpoint(&["repo", "submit_repo"]).as_str(),
            "http://localhost:8000/api/repo/submit_repo"
        );

        let client = make_client("http://localhost:8000", "");
        assert_eq!(
            client.endpoint(&["repo", "get_repo", "abc"]).as_str(),
            "http://localhost:8000/repo/get_repo/abc"
        );
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let client = make_client("http://localhost:8000", "/api");
        assert_eq!(
            client
                .endpoint(&["analysis", "get_suggestions", "a/b", "my method"])
                .as_str(),
            "http://localhost:8000/api/analysis/get_suggestions/a%2Fb/my%20method"
        );
    }

    #[test]
    fn test_invalid_backend_url() {
        let config = LensConfig {
            backend_url: "not a url".to_string(),
            ..LensConfig::default()
        };
        assert!(matches!(
            AnalysisClient::new(&config),
            Err(LensError::Config(_))
        ));
    }
}
