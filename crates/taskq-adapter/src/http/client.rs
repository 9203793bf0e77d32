/*
[INPUT]:  HTTP configuration (base URL, timeouts)
[OUTPUT]: Configured reqwest client ready for API calls
[POS]:    HTTP layer - core client implementation
[UPDATE]: When adding connection options or changing client behavior
*/

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::http::{Result, TaskqError};

/// Default backend location (Spring Boot default port)
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

/// HTTP client for the task-queue REST API
#[derive(Debug, Clone)]
pub struct TaskqClient {
    http_client: Client,
    base_url: Url,
}

impl TaskqClient {
    /// Create a new client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        // Endpoints are joined relative to the base, so keep a trailing slash
        // to preserve any path prefix (e.g. behind a reverse proxy).
        let mut raw_base = config.base_url.trim().to_string();
        if !raw_base.ends_with('/') {
            raw_base.push('/');
        }
        let base_url = Url::parse(&raw_base)?;
        if base_url.cannot_be_a_base() {
            return Err(TaskqError::Config(format!(
                "base URL cannot be a base: {}",
                config.base_url
            )));
        }

        Ok(Self {
            http_client,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build full URL for an API endpoint
    fn url(&self, endpoint: &str) -> Result<Url> {
        Ok(self.base_url.join(endpoint.trim_start_matches('/'))?)
    }

    /// Build request builder for an API endpoint
    pub(crate) fn request(&self, method: Method, endpoint: &str) -> Result<RequestBuilder> {
        let url = self.url(endpoint)?;
        Ok(self.http_client.request(method, url))
    }

    /// Build a request whose final path segments are percent-encoded values
    pub(crate) fn request_with_segments(
        &self,
        method: Method,
        endpoint: &str,
        segments: &[&str],
    ) -> Result<RequestBuilder> {
        let mut url = self.url(endpoint)?;
        url.path_segments_mut()
            .map_err(|_| TaskqError::Config(format!("base URL cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(self.http_client.request(method, url))
    }

    /// Send a request and decode a JSON body, mapping non-2xx to `Backend`.
    pub(crate) async fn send_json<T>(&self, builder: RequestBuilder) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = builder.send().await?;
        let status = response.status();
        let url = response.url().clone();
        let body = response.text().await?;

        if !status.is_success() {
            debug!(%url, status = status.as_u16(), "backend returned error status");
            return Err(TaskqError::backend_error(status, body));
        }

        debug!(%url, status = status.as_u16(), bytes = body.len(), "backend response");
        if body.trim().is_empty() {
            return Err(TaskqError::InvalidResponse(format!(
                "empty body with status {} from {url}",
                status.as_u16()
            )));
        }
        Ok(serde_json::from_str(&body)?)
    }
}
