//! Status feed error types
//!
//! Defines all errors that can occur while fetching and decoding feeds.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading a feed
#[derive(Error, Debug)]
pub enum StatusError {
    /// The HTTP request could not be completed
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The request did not complete within the configured timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    /// A local feed file could not be read
    #[error("Failed to read {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    /// The document is not the JSON shape we expect
    #[error("Malformed feed: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for StatusError {
    fn from(err: serde_json::Error) -> Self {
        StatusError::Malformed(err.to_string())
    }
}

/// Result type alias for feed operations
pub type StatusResult<T> = Result<T, StatusError>;
