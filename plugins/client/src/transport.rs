//! Network transport used by the save controller

use async_trait::async_trait;
use scribe_core::{Result, ScribeError};

/// Status and body of a completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Fail with a communication error unless the status is 2xx
    pub fn require_success(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ScribeError::communication(format!(
                "Server responded with status {}",
                self.status
            )))
        }
    }
}

/// Outbound HTTP requests. Timeouts are enforced by the caller.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `body` to `url` with the given content type
    async fn post(&self, url: &str, content_type: &str, body: String)
        -> Result<TransportResponse>;

    /// GET `url`
    async fn get(&self, url: &str) -> Result<TransportResponse>;
}

/// [`Transport`] backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("scribe/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                ScribeError::communication(format!("Failed to build HTTP client: {}", e))
            })?;
        Ok(Self { client })
    }

    async fn collect(response: reqwest::Response) -> Result<TransportResponse> {
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| ScribeError::communication(format!("Failed to read response: {}", e)))?;
        Ok(TransportResponse::new(status, body.to_vec()))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(
        &self,
        url: &str,
        content_type: &str,
        body: String,
    ) -> Result<TransportResponse> {
        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header(reqwest::header::ACCEPT, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| ScribeError::communication(format!("POST {} failed: {}", url, e)))?;

        Self::collect(response).await
    }

    async fn get(&self, url: &str) -> Result<TransportResponse> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ScribeError::communication(format!("GET {} failed: {}", url, e)))?;

        Self::collect(response).await
    }
}
