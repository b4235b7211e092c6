//! Persisted form of one partition's dataset.

use crate::keys;
use serde::{Deserialize, Serialize};
use setlist_core::{ByteStore, PartitionKey, PlaylistId, PlaylistRecord, Result, Snapshot};
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// Live records and tombstones as stored under `…/dataset`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct StoredDataset {
    #[serde(default)]
    pub records: BTreeMap<PlaylistId, PlaylistRecord>,
    #[serde(default)]
    pub tombstones: BTreeSet<PlaylistId>,
}

impl StoredDataset {
    pub fn to_snapshot(&self, generated_at_ms: i64) -> Snapshot {
        Snapshot {
            records: self.records.clone(),
            tombstones: self.tombstones.clone(),
            generated_at_ms,
        }
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            records: snapshot.records,
            tombstones: snapshot.tombstones,
        }
    }
}

/// Load a partition's dataset.
///
/// Missing data is an empty dataset. Unreadable bytes reset the partition to
/// an empty dataset: the loss is logged and the reset is persisted so the
/// warning fires once.
pub(crate) async fn load(store: &dyn ByteStore, partition: &PartitionKey) -> Result<StoredDataset> {
    let key = keys::dataset(partition);
    let Some(bytes) = store.get(&key).await? else {
        return Ok(StoredDataset::default());
    };

    match serde_json::from_slice(&bytes) {
        Ok(dataset) => Ok(dataset),
        Err(e) => {
            warn!(
                partition = %partition,
                error = %e,
                bytes = bytes.len(),
                "Local playlist data is corrupt; resetting partition to empty"
            );
            let empty = StoredDataset::default();
            save(store, partition, &empty).await?;
            Ok(empty)
        }
    }
}

pub(crate) async fn save(
    store: &dyn ByteStore,
    partition: &PartitionKey,
    dataset: &StoredDataset,
) -> Result<()> {
    let bytes = serde_json::to_vec(dataset)?;
    store.set(&keys::dataset(partition), &bytes).await
}

/// Whether anything at all is stored for the partition's dataset.
pub(crate) async fn exists(store: &dyn ByteStore, partition: &PartitionKey) -> Result<bool> {
    Ok(store.get(&keys::dataset(partition)).await?.is_some())
}
