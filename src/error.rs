//! Error types for quake-report
//!
//! This module provides the error taxonomy of the load pipeline:
//! - [`TransportError`] for everything that goes wrong while fetching the feed
//! - [`ParseError`] for documents that are not an earthquake feed at all
//! - [`Error`], the crate-wide error used by configuration and lifecycle APIs
//!
//! Transport and parse failures never escape a load: the loader turns them into
//! [`LoadResult::Unavailable`](crate::types::LoadResult::Unavailable). They are
//! still typed so that logs can tell the two apart.

use thiserror::Error;

/// Result type alias for quake-report operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for quake-report
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "feed.endpoint")
        key: Option<String>,
    },

    /// Fetching the feed failed
    ///
    /// The pipeline itself reports fetch failures as an unavailable
    /// [`LoadResult`](crate::types::LoadResult). This conversion is for callers
    /// that drive a [`FeedSource`](crate::feed::FeedSource) directly and
    /// propagate with `?`.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The feed document could not be parsed
    ///
    /// Like [`Error::Transport`], produced only by `?` in code that calls
    /// [`parse_feed`](crate::feed::parse_feed) directly.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The loader was reset and cannot start new loads
    #[error("loader has been reset and cannot be restarted")]
    LoaderReset,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for a configuration error tied to a specific key
    pub fn config(key: &str, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.to_string()),
        }
    }
}

/// Failures while retrieving the raw feed bytes
///
/// A fetch is all-or-nothing: whatever was received before the failure is discarded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Connect or read deadline exceeded
    #[error("timed out fetching {url}")]
    Timeout {
        /// The URL that was being fetched
        url: String,
    },

    /// Could not establish a connection
    #[error("connection failed for {url}: {message}")]
    Connect {
        /// The URL that was being fetched
        url: String,
        /// Underlying client error
        message: String,
    },

    /// Server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Status {
        /// HTTP status code
        status: u16,
        /// The URL that was being fetched
        url: String,
    },

    /// The response body could not be read completely
    #[error("failed to read response body from {url}: {message}")]
    Body {
        /// The URL that was being fetched
        url: String,
        /// Underlying client error
        message: String,
    },

    /// Any other request failure (client construction, redirects, ...)
    #[error("request to {url} failed: {message}")]
    Request {
        /// The URL that was being fetched
        url: String,
        /// Underlying client error
        message: String,
    },
}

impl TransportError {
    /// Short text suitable for an empty-state message
    pub fn user_message(&self) -> String {
        match self {
            TransportError::Timeout { .. } => {
                "The earthquake server took too long to respond.".to_string()
            }
            TransportError::Connect { .. } => {
                "Could not connect to the earthquake server.".to_string()
            }
            TransportError::Status { status, .. } => {
                format!("The earthquake server returned an error (HTTP {status}).")
            }
            TransportError::Body { .. } | TransportError::Request { .. } => {
                "Problem retrieving earthquake data.".to_string()
            }
        }
    }
}

/// Fatal feed document errors
///
/// Malformed individual features are not errors; the parser skips them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The bytes are not a JSON document
    #[error("feed is not valid JSON: {0}")]
    Malformed(String),

    /// The document has no top-level `features` array
    #[error("feed has no top-level features array")]
    MissingFeatures,
}

impl ParseError {
    /// Short text suitable for an empty-state message
    pub fn user_message(&self) -> String {
        "Problem reading earthquake data.".to_string()
    }
}
