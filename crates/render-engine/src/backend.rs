//! Renderer backends.
//!
//! A backend only moves JSON between the orchestrator and a render service;
//! interpreting responses is left to [`crate::response`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use reelforge_common::config::RenderConfig;

use crate::request::{PollRequest, RenderRequest};

/// Longest response body excerpt kept in an error.
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Errors raised while talking to a render service.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RenderError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Renderer returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Invalid renderer response: {0}")]
    Parse(String),

    #[error("Renderer did not return a job id")]
    MissingJobId,

    #[error("Render timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("Backend setup failed: {0}")]
    Setup(String),
}

impl RenderError {
    /// Whether a poll that failed this way should simply be retried.
    ///
    /// Network failures, unparseable bodies, 5xx and 429 are transient;
    /// other HTTP statuses are treated as a rejection of the job.
    pub fn is_transient(&self) -> bool {
        match self {
            RenderError::Transport(_) | RenderError::Parse(_) => true,
            RenderError::Http { status, .. } => {
                *status >= 500 || *status == StatusCode::TOO_MANY_REQUESTS.as_u16()
            }
            _ => false,
        }
    }
}

pub type RenderResult<T> = Result<T, RenderError>;

/// A remote render service.
#[async_trait]
pub trait RenderBackend: Send + Sync {
    /// Submit a composition; returns the raw submission response.
    async fn submit(&self, request: &RenderRequest) -> RenderResult<Value>;

    /// Fetch the raw status of a job.
    async fn poll(&self, job_id: &str) -> RenderResult<Value>;

    /// Backend name for logs.
    fn name(&self) -> &str;
}

/// JSON-over-HTTP render service.
///
/// Jobs are submitted with `POST {endpoint}/render` and polled with
/// `POST {endpoint}/progress`.
pub struct HttpRenderBackend {
    client: reqwest::Client,
    endpoint: String,
}

impl std::fmt::Debug for HttpRenderBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRenderBackend")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl HttpRenderBackend {
    pub fn new(endpoint: impl Into<String>, request_timeout: Duration) -> RenderResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| RenderError::Setup(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &RenderConfig) -> RenderResult<Self> {
        Self::new(
            config.endpoint.clone(),
            Duration::from_secs(config.request_timeout_secs.max(1)),
        )
    }

    /// Point the backend at a different service.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn submit_url(&self) -> String {
        format!("{}/render", self.endpoint)
    }

    fn poll_url(&self) -> String {
        format!("{}/progress", self.endpoint)
    }

    async fn post_json<B: Serialize + Sync>(&self, url: &str, body: &B) -> RenderResult<Value> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| RenderError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| RenderError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(RenderError::Http {
                status: status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        serde_json::from_str(&text).map_err(|e| RenderError::Parse(e.to_string()))
    }
}

#[async_trait]
impl RenderBackend for HttpRenderBackend {
    async fn submit(&self, request: &RenderRequest) -> RenderResult<Value> {
        let url = self.submit_url();
        debug!(url = %url, composition = %request.id, "Submitting render");
        self.post_json(&url, request).await
    }

    async fn poll(&self, job_id: &str) -> RenderResult<Value> {
        let url = self.poll_url();
        debug!(url = %url, job_id, "Polling render");
        self.post_json(&url, &PollRequest::new(job_id)).await
    }

    fn name(&self) -> &str {
        "http"
    }
}
