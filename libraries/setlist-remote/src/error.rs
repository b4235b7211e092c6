//! Error types for the remote replica.

use thiserror::Error;

/// Errors that can occur when talking to the remote document store.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// HTTP client could not be built or a request could not be formed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Invalid base URL
    #[error("Invalid remote URL: {0}")]
    InvalidUrl(String),

    /// Transport failure or unusable pull response; callers degrade to cache
    #[error("Remote store unavailable: {0}")]
    Unavailable(String),

    /// Credential missing, expired or rejected
    #[error("Authentication required: {0}")]
    AuthRequired(String),

    /// Remote store rejected the write
    #[error("Remote store error ({status}): {message}")]
    ServerError { status: u16, message: String },
}

/// Result type for remote replica operations.
pub type Result<T> = std::result::Result<T, RemoteError>;
