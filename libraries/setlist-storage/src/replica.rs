//! The on-device replica of the playlist dataset.

use crate::dataset::{self, StoredDataset};
use crate::keys;
use crate::scope::AccountScope;
use serde::de::DeserializeOwned;
use serde::Serialize;
use setlist_core::clock::now_ms;
use setlist_core::{
    ByteStore, PartitionKey, Playlist, PlaylistId, PlaylistRecord, Result, SessionContext,
    SetlistError, Snapshot, Track,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Partition-scoped playlist storage.
///
/// Every operation resolves the partition from the session at call time.
/// Mutations persist through the byte store before returning and are
/// serialized with each other by a replica-local lock. That lock is never
/// held across network I/O, so local edits stay responsive during a sync.
pub struct LocalReplica {
    scope: AccountScope,
    store: Arc<dyn ByteStore>,
    write_lock: Mutex<()>,
}

impl LocalReplica {
    pub fn new(store: Arc<dyn ByteStore>, session: SessionContext) -> Self {
        Self {
            scope: AccountScope::new(store.clone(), session),
            store,
            write_lock: Mutex::new(()),
        }
    }

    pub fn scope(&self) -> &AccountScope {
        &self.scope
    }

    /// Partition of the current session, after the legacy migration has run
    pub async fn current_partition(&self) -> Result<PartitionKey> {
        self.scope.ensure_migrated().await?;
        Ok(self.scope.current_key().await)
    }

    // ========================================================================
    // Playlist CRUD
    // ========================================================================

    /// Live playlists ordered by name
    pub async fn list(&self) -> Result<Vec<Playlist>> {
        let partition = self.current_partition().await?;
        let dataset = dataset::load(self.store.as_ref(), &partition).await?;
        Ok(dataset.to_snapshot(0).playlists())
    }

    /// Look up one live playlist
    pub async fn get(&self, id: &PlaylistId) -> Result<Option<Playlist>> {
        let partition = self.current_partition().await?;
        let dataset = dataset::load(self.store.as_ref(), &partition).await?;
        Ok(dataset.records.get(id).map(|record| record.playlist.clone()))
    }

    /// Create an empty playlist with a fresh ID
    pub async fn create(&self, name: &str) -> Result<Playlist> {
        let playlist = Playlist::new(name)?;
        let created = playlist.clone();

        self.mutate(|dataset| {
            let record = PlaylistRecord::new(playlist, now_ms());
            dataset.records.insert(record.id().clone(), record);
            Ok(())
        })
        .await?;

        debug!(playlist = %created.id, name = %created.name, "Created playlist");
        Ok(created)
    }

    /// Rename a live playlist
    pub async fn rename(&self, id: &PlaylistId, name: &str) -> Result<Playlist> {
        self.mutate(|dataset| {
            let record = dataset
                .records
                .get_mut(id)
                .ok_or_else(|| SetlistError::UnknownPlaylist(id.clone()))?;
            record.playlist.rename(name)?;
            touch(record);
            Ok(record.playlist.clone())
        })
        .await
    }

    /// Delete a playlist and remember the deletion.
    ///
    /// Unknown IDs are tombstoned too. The deletion takes effect as of the
    /// next exported snapshot.
    pub async fn delete(&self, id: &PlaylistId) -> Result<()> {
        self.mutate(|dataset| {
            dataset.records.remove(id);
            dataset.tombstones.insert(id.clone());
            Ok(())
        })
        .await?;

        debug!(playlist = %id, "Deleted playlist");
        Ok(())
    }

    /// Append a track; `false` when the playlist is unknown or already has it
    pub async fn add_track(&self, playlist_id: &PlaylistId, track: Track) -> Result<bool> {
        self.mutate(|dataset| {
            let Some(record) = dataset.records.get_mut(playlist_id) else {
                return Ok(false);
            };
            if !record.playlist.push_track(track) {
                return Ok(false);
            }
            touch(record);
            Ok(true)
        })
        .await
    }

    /// Remove every track equal to `track`; no-op when none is present
    pub async fn remove_track(&self, playlist_id: &PlaylistId, track: &Track) -> Result<()> {
        self.mutate(|dataset| {
            let record = dataset
                .records
                .get_mut(playlist_id)
                .ok_or_else(|| SetlistError::UnknownPlaylist(playlist_id.clone()))?;
            if record.playlist.remove_track(track) {
                touch(record);
            }
            Ok(())
        })
        .await
    }

    // ========================================================================
    // Snapshots
    // ========================================================================

    /// Records and tombstones of the current partition, stamped now
    pub async fn export_snapshot(&self) -> Result<Snapshot> {
        let partition = self.current_partition().await?;
        self.export_snapshot_for(&partition).await
    }

    /// Replace the current partition's records and tombstones wholesale
    pub async fn import_snapshot(&self, snapshot: Snapshot) -> Result<()> {
        let partition = self.current_partition().await?;
        self.import_snapshot_for(&partition, snapshot).await
    }

    /// Export a specific partition
    pub async fn export_snapshot_for(&self, partition: &PartitionKey) -> Result<Snapshot> {
        self.scope.ensure_migrated().await?;
        let dataset = dataset::load(self.store.as_ref(), partition).await?;
        Ok(dataset.to_snapshot(now_ms()))
    }

    /// Import into a specific partition
    pub async fn import_snapshot_for(
        &self,
        partition: &PartitionKey,
        snapshot: Snapshot,
    ) -> Result<()> {
        self.scope.ensure_migrated().await?;
        let _guard = self.write_lock.lock().await;

        let records = snapshot.records.len();
        let tombstones = snapshot.tombstones.len();
        dataset::save(
            self.store.as_ref(),
            partition,
            &StoredDataset::from_snapshot(snapshot),
        )
        .await?;

        debug!(partition = %partition, records, tombstones, "Imported snapshot");
        Ok(())
    }

    // ========================================================================
    // Sync bookkeeping
    // ========================================================================

    /// Last remote snapshot observed (or pushed) for the partition
    pub async fn cached_remote(&self, partition: &PartitionKey) -> Result<Option<Snapshot>> {
        self.scope.ensure_migrated().await?;
        self.read_json(&keys::remote_cache(partition)).await
    }

    /// Remember `snapshot` as the partition's last known remote state
    pub async fn cache_remote(&self, partition: &PartitionKey, snapshot: &Snapshot) -> Result<()> {
        self.scope.ensure_migrated().await?;
        let bytes = serde_json::to_vec(snapshot)?;
        self.store.set(&keys::remote_cache(partition), &bytes).await
    }

    /// Last persisted sync status for the partition
    pub async fn last_sync_status<T: DeserializeOwned>(
        &self,
        partition: &PartitionKey,
    ) -> Result<Option<T>> {
        self.scope.ensure_migrated().await?;
        self.read_json(&keys::last_status(partition)).await
    }

    /// Persist the outcome of a sync cycle
    pub async fn record_sync_status<T: Serialize + Sync>(
        &self,
        partition: &PartitionKey,
        status: &T,
    ) -> Result<()> {
        self.scope.ensure_migrated().await?;
        let bytes = serde_json::to_vec(status)?;
        self.store.set(&keys::last_status(partition), &bytes).await
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Load, modify and persist the current partition under the write lock.
    async fn mutate<T>(
        &self,
        apply: impl FnOnce(&mut StoredDataset) -> Result<T>,
    ) -> Result<T> {
        let partition = self.current_partition().await?;
        let _guard = self.write_lock.lock().await;

        let mut dataset = dataset::load(self.store.as_ref(), &partition).await?;
        let output = apply(&mut dataset)?;
        dataset::save(self.store.as_ref(), &partition, &dataset).await?;

        Ok(output)
    }

    /// Cached values are advisory: unreadable bytes read as absent.
    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(bytes) = self.store.get(key).await? else {
            return Ok(None);
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(key = %key, error = %e, "Ignoring unreadable cached sync data");
                Ok(None)
            }
        }
    }
}

/// Stamp a local mutation. A record's version never moves backwards, even if
/// it was last written by a device whose clock runs ahead.
fn touch(record: &mut PlaylistRecord) {
    record.updated_at_ms = now_ms().max(record.updated_at_ms.saturating_add(1));
}
