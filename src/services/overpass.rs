use crate::models::OverpassElement;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when querying Overpass
#[derive(Debug, Error)]
pub enum OverpassError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[source] reqwest::Error),

    #[error("Overpass request timed out")]
    Timeout,

    #[error("Overpass returned status {0}")]
    Status(u16),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for OverpassError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            OverpassError::Timeout
        } else {
            OverpassError::RequestError(err)
        }
    }
}

/// Executes Overpass QL and returns the raw elements
///
/// One call per search, never retried.
#[async_trait]
pub trait OverpassClient: Send + Sync {
    async fn execute(&self, query: &str) -> Result<Vec<OverpassElement>, OverpassError>;
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    elements: Vec<OverpassElement>,
}

/// Overpass API client over HTTP
pub struct HttpOverpassClient {
    url: String,
    client: Client,
}

impl HttpOverpassClient {
    /// Create a new Overpass client with a bounded request timeout
    pub fn new(url: String, timeout: Duration) -> Result<Self, OverpassError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("nearby-listings/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { url, client })
    }
}

#[async_trait]
impl OverpassClient for HttpOverpassClient {
    async fn execute(&self, query: &str) -> Result<Vec<OverpassElement>, OverpassError> {
        let body = format!("data={}", urlencoding::encode(query));

        tracing::debug!("Posting Overpass query ({} bytes) to {}", query.len(), self.url);

        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(OverpassError::Status(response.status().as_u16()));
        }

        let text = response.text().await?;
        let parsed: OverpassResponse = serde_json::from_str(&text)
            .map_err(|e| OverpassError::InvalidResponse(format!("Failed to parse elements: {}", e)))?;

        tracing::debug!("Overpass returned {} elements", parsed.elements.len());

        Ok(parsed.elements)
    }
}
