//! Error types for feed and subscription sources.

use launch_sync_core::FetchError;
use thiserror::Error;

/// Everything that can go wrong while reading launches or addresses.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Network or transport-level HTTP error from reqwest.
    ///
    /// Includes connection failures, timeouts, and TLS errors.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The feed answered with a non-success status.
    #[error("Feed API error: {status} - {message}")]
    Api {
        /// The HTTP status code returned by the feed.
        status: u16,
        /// The response body, truncated.
        message: String,
    },

    /// Response body or file did not match the expected shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A launch carried an unparseable `net` timestamp.
    #[error("Invalid launch time for {id}: {value}")]
    InvalidTime { id: String, value: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid base URL or other setup issue.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience Result type alias for feed operations.
pub type FeedResult<T> = Result<T, FeedError>;

impl From<FeedError> for FetchError {
    fn from(e: FeedError) -> Self {
        FetchError::new(e.to_string())
    }
}
