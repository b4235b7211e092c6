//! Setlist Sync
//!
//! Reconciles the on-device replica of a partition with its remote document.
//!
//! - [`merge`] is a pure function from two snapshots to one converged snapshot
//! - [`SyncCoordinator`] runs one pull-merge-import-push cycle per partition
//!   at a time and always reports a [`SyncStatus`]

mod coordinator;
mod error;
mod merge;
mod types;

// Public exports
pub use coordinator::SyncCoordinator;
pub use error::{Result, SyncError};
pub use merge::{merge, merge_at, merge_with_report, MergeReport};
pub use types::{SyncState, SyncStatus};
