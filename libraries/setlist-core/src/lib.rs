//! Setlist Core
//!
//! Platform-agnostic domain types, session context, and storage traits for
//! the Setlist offline-first playlist library.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `Playlist`, `PlaylistRecord`, `Snapshot`
//! - **Session**: `Session`, `Identity`, `SessionContext`, `PartitionKey`
//! - **Core Traits**: `ByteStore` (the on-device key/value primitive)
//! - **Error Handling**: Unified `SetlistError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use setlist_core::{PartitionKey, Playlist, Session, Track};
//!
//! let mut playlist = Playlist::new("Road Trip").unwrap();
//! let track = Track::new("t-1", "Roygbiv", "Boards of Canada");
//! assert!(playlist.push_track(track));
//!
//! let session = Session::signed_in("a@example.com", None);
//! assert_eq!(PartitionKey::for_session(&session).as_str(), "user:a@example.com");
//! ```

#![forbid(unsafe_code)]

pub mod clock;
pub mod error;
pub mod session;
pub mod storage;
pub mod types;

pub use error::{Result, SetlistError};
pub use session::{Identity, PartitionKey, Session, SessionContext};
pub use storage::ByteStore;
pub use types::{Playlist, PlaylistId, PlaylistRecord, Snapshot, Track, TrackKey};
