//! Byte store key layout.
//!
//! ```text
//! setlist/playlists                       legacy, pre-partition dataset
//! setlist/v1/meta/legacy_migrated         one-time migration flag
//! setlist/v1/p/{partition}/dataset        live records + tombstones
//! setlist/v1/p/{partition}/remote_cache   last observed remote snapshot
//! setlist/v1/p/{partition}/last_status    last sync status
//! ```

use setlist_core::PartitionKey;

pub(crate) const LEGACY_DATASET: &str = "setlist/playlists";
pub(crate) const LEGACY_MIGRATED: &str = "setlist/v1/meta/legacy_migrated";

pub(crate) fn dataset(partition: &PartitionKey) -> String {
    format!("setlist/v1/p/{}/dataset", partition)
}

pub(crate) fn remote_cache(partition: &PartitionKey) -> String {
    format!("setlist/v1/p/{}/remote_cache", partition)
}

pub(crate) fn last_status(partition: &PartitionKey) -> String {
    format!("setlist/v1/p/{}/last_status", partition)
}
