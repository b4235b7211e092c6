/// Point-in-time description of one partition's dataset
use crate::types::{Playlist, PlaylistId, PlaylistRecord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Live records plus deletion tombstones of one partition.
///
/// A tombstoned ID counts as deleted as of the snapshot's `generated_at_ms`.
/// Ordered collections keep iteration and encoding deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Live playlists keyed by ID
    #[serde(default)]
    pub records: BTreeMap<PlaylistId, PlaylistRecord>,

    /// Deleted playlist IDs
    #[serde(default)]
    pub tombstones: BTreeSet<PlaylistId>,

    /// When this snapshot was produced (Unix millis)
    #[serde(default)]
    pub generated_at_ms: i64,
}

impl Snapshot {
    /// An empty snapshot stamped with the given time
    pub fn empty(generated_at_ms: i64) -> Self {
        Self {
            generated_at_ms,
            ..Self::default()
        }
    }

    /// Builder: add a live record
    #[must_use]
    pub fn with_record(mut self, record: PlaylistRecord) -> Self {
        self.insert_record(record);
        self
    }

    /// Builder: tombstone an ID
    #[must_use]
    pub fn with_tombstone(mut self, id: impl Into<PlaylistId>) -> Self {
        self.tombstone(id.into());
        self
    }

    /// Insert or replace a live record
    pub fn insert_record(&mut self, record: PlaylistRecord) {
        self.records.insert(record.id().clone(), record);
    }

    /// Record a deletion
    pub fn tombstone(&mut self, id: PlaylistId) {
        self.tombstones.insert(id);
    }

    /// Whether the ID has ever been observed as deleted
    pub fn is_tombstoned(&self, id: &PlaylistId) -> bool {
        self.tombstones.contains(id)
    }

    /// Deletion time of `id` as seen by this snapshot, if tombstoned
    pub fn deleted_at(&self, id: &PlaylistId) -> Option<i64> {
        self.is_tombstoned(id).then_some(self.generated_at_ms)
    }

    /// Live playlists ordered by name, then ID
    pub fn playlists(&self) -> Vec<Playlist> {
        let mut playlists: Vec<Playlist> = self
            .records
            .values()
            .map(|record| record.playlist.clone())
            .collect();
        playlists.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        playlists
    }

    /// Whether there are neither records nor tombstones
    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.tombstones.is_empty()
    }
}
