use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use super::types::{ChatRequest, ChatResponse, DocumentCount, HealthResponse};
use super::ApiError;
use crate::config::Config;

/// Backend API client.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Creates a client for the given base URL with a per-request timeout.
    ///
    /// # Errors
    /// Returns an error if the base URL is not a valid absolute URL or the
    /// HTTP client cannot be constructed.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Url::parse(base_url).with_context(|| format!("Invalid backend URL: {base_url}"))?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Creates a client from a loaded [`Config`].
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.base_url, config.request_timeout())
    }

    /// Sends one chat turn and returns the decoded reply payload.
    pub async fn chat(&self, message: &str, use_rag: bool) -> Result<ChatResponse, ApiError> {
        let request = ChatRequest {
            message: message.to_string(),
            use_rag,
        };
        self.post_json("/api/chat", &request).await
    }

    /// Fetches the backend health report.
    pub async fn health(&self) -> Result<HealthResponse, ApiError> {
        self.get_json("/api/health").await
    }

    /// Fetches the number of indexed document chunks.
    pub async fn document_count(&self) -> Result<u64, ApiError> {
        let payload: DocumentCount = self.get_json("/api/documents/count").await?;
        Ok(payload.count)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(%url, "GET");
        let response = self.http.get(&url).send().await.map_err(ApiError::from)?;
        decode(response).await
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(%url, "POST");
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(ApiError::from)?;
        decode(response).await
    }
}

/// Checks the status and decodes the JSON body.
///
/// Non-2xx responses become [`ApiErrorKind::HttpStatus`](super::ApiErrorKind)
/// with the body preserved for logging; undecodable bodies become `Parse`.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::http_status(status.as_u16(), &body));
    }
    let body = response.text().await.map_err(ApiError::from)?;
    serde_json::from_str(&body).map_err(|err| ApiError::parse(format!("invalid response body: {err}")))
}
