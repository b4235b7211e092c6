/// Core error types for Setlist
use crate::types::PlaylistId;
use thiserror::Error;

/// Result type alias using `SetlistError`
pub type Result<T> = std::result::Result<T, SetlistError>;

/// Core error type for Setlist
#[derive(Error, Debug)]
pub enum SetlistError {
    /// Playlist name is empty after trimming
    #[error("Invalid playlist name: {0:?}")]
    InvalidName(String),

    /// Playlist does not exist in the current partition
    #[error("Playlist not found: {0}")]
    UnknownPlaylist(PlaylistId),

    /// Byte store errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl SetlistError {
    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create an invalid name error
    pub fn invalid_name(name: impl Into<String>) -> Self {
        Self::InvalidName(name.into())
    }
}
