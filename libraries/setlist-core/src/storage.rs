//! Byte store trait
//!
//! The on-device persistence primitive: opaque blobs addressed by string
//! keys. `setlist-storage` provides an in-memory and a `SQLite`
//! implementation; hosts may plug in their own.

use crate::error::Result;
use async_trait::async_trait;

/// Durable key/value storage of opaque byte blobs.
///
/// Writes must be durable when the returned future resolves.
#[async_trait]
pub trait ByteStore: Send + Sync {
    /// Read the blob stored under `key`
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any previous blob
    async fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Remove the blob under `key`; returns whether one existed
    async fn remove(&self, key: &str) -> Result<bool>;
}
