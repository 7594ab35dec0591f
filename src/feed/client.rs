//! Feed fetching.

use crate::config::FeedConfig;
use crate::error::{Error, Result, TransportError};
use crate::feed::request::LoadRequest;
use async_trait::async_trait;
use tracing::debug;

/// Source of raw feed bytes
///
/// The loader calls `fetch` from a worker task, never from the owner of the
/// presenter. One call is one attempt; implementations do not retry.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch the complete response body for `request`
    ///
    /// # Errors
    ///
    /// Any failure, including a non-success status, is a [`TransportError`].
    /// Partially received bodies are never returned.
    async fn fetch(&self, request: &LoadRequest) -> std::result::Result<Vec<u8>, TransportError>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// [`FeedSource`] backed by an HTTP GET
#[derive(Clone, Debug)]
pub struct HttpFeedClient {
    http_client: reqwest::Client,
}

impl HttpFeedClient {
    /// Create a client with the configured timeouts and user agent
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(config: &FeedConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.read_timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http_client })
    }

    fn classify(url: &str, error: reqwest::Error) -> TransportError {
        if error.is_timeout() {
            TransportError::Timeout {
                url: url.to_string(),
            }
        } else if error.is_connect() {
            TransportError::Connect {
                url: url.to_string(),
                message: error.to_string(),
            }
        } else {
            TransportError::Request {
                url: url.to_string(),
                message: error.to_string(),
            }
        }
    }
}

#[async_trait]
impl FeedSource for HttpFeedClient {
    async fn fetch(&self, request: &LoadRequest) -> std::result::Result<Vec<u8>, TransportError> {
        let url = request.as_str();
        debug!(url = %url, "Fetching earthquake feed");

        let response = self
            .http_client
            .get(request.url().clone())
            .send()
            .await
            .map_err(|e| Self::classify(url, e))?;

        // Check HTTP status before trying to read the response body
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout {
                    url: url.to_string(),
                }
            } else {
                TransportError::Body {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        debug!(url = %url, bytes = body.len(), "Fetched earthquake feed");
        Ok(body.to_vec())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
