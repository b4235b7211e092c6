//! Setlist Remote Replica
//!
//! Client for the remote document store that holds one playlist document per
//! account partition.
//!
//! # Features
//!
//! - **Typed-field documents**: every value is tagged (`stringValue`,
//!   `integerValue`, `arrayValue`, `mapValue`) so the schema is
//!   self-describing at the field level
//! - **Lenient decoding**: missing or mistyped fields decode to zero values
//! - **Pull**: a missing document is an empty snapshot, not an error
//! - **Push**: full-document replace, bearer credential optional
//!
//! # Example
//!
//! ```ignore
//! use setlist_core::PartitionKey;
//! use setlist_remote::{RemoteConfig, RemoteReplica, RemoteStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let remote = RemoteReplica::new(RemoteConfig::new("https://docs.example.com/v1/documents"))?;
//!     let key = PartitionKey::for_subject("a@example.com");
//!
//!     let snapshot = remote.pull(&key, Some("token")).await?;
//!     println!("remote has {} playlists", snapshot.records.len());
//!
//!     remote.push(&key, &snapshot, Some("token")).await?;
//!     Ok(())
//! }
//! ```

mod client;
mod codec;
mod document;
mod error;
mod types;

pub use client::{RemoteReplica, RemoteStore};
pub use codec::{decode_snapshot, encode_snapshot, fields};
pub use document::{Document, FieldValue};
pub use error::{RemoteError, Result};
pub use types::RemoteConfig;
