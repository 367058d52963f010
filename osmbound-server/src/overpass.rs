//! HTTP access to the Overpass API

use std::future::Future;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Overpass request failed: {0}")]
    Transport(String),
    #[error("Overpass responded with status {0}")]
    Status(u16),
    #[error("Overpass response is not JSON: {0}")]
    Decode(String),
    #[error("Fetch pool is closed")]
    PoolClosed,
}

impl FetchError {
    /// Transport failures, rate limiting and server errors may succeed on a
    /// later attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status(status) => *status == 429 || *status >= 500,
            Self::Decode(_) | Self::PoolClosed => false,
        }
    }
}

/// Source of raw Overpass JSON for a query
pub trait ElementSource: Send + Sync + 'static {
    fn fetch(&self, query: &str) -> impl Future<Output = Result<Value, FetchError>> + Send;
}

/// Overpass interpreter client
#[derive(Debug, Clone)]
pub struct OverpassClient {
    http: reqwest::Client,
    endpoint: String,
}

impl OverpassClient {
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] if the HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("osmbound/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ElementSource for OverpassClient {
    async fn fetch(&self, query: &str) -> Result<Value, FetchError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "text/plain")
            .body(query.to_owned())
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))?;

        tracing::debug!(
            elements = body["elements"].as_array().map_or(0, Vec::len),
            "Received Overpass response"
        );
        Ok(body)
    }
}
