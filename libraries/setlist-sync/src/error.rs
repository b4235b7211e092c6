use setlist_core::SetlistError;
use thiserror::Error;

/// Errors that can occur when driving sync cycles
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Sync already in progress")]
    AlreadySyncing,

    #[error("Local replica error: {0}")]
    Local(#[from] SetlistError),
}

pub type Result<T> = std::result::Result<T, SyncError>;
