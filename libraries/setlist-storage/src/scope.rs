//! Account partitioning and the one-time legacy migration.

use crate::dataset::{self, StoredDataset};
use crate::keys;
use serde::{Deserialize, Serialize};
use setlist_core::clock::now_ms;
use setlist_core::{
    ByteStore, PartitionKey, Playlist, PlaylistId, PlaylistRecord, Result, SessionContext, Track,
};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

const UNTITLED: &str = "Untitled playlist";

/// A playlist as stored before datasets were partitioned by account.
///
/// Legacy data carried no timestamps or tombstones and sometimes no ID.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyPlaylist {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tracks: Vec<Track>,
}

/// What `migrate_legacy_if_needed` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// The flag was already set
    AlreadyDone,
    /// No pre-partition data exists
    NoLegacyData,
    /// Legacy playlists were copied into the anonymous partition
    Migrated { playlists: usize },
    /// The anonymous partition already held data; nothing was overwritten
    AnonymousPartitionInUse,
    /// The legacy blob could not be parsed and was left alone
    Unreadable,
}

/// Resolves the partition of the current session.
pub struct AccountScope {
    session: SessionContext,
    store: Arc<dyn ByteStore>,
    migrated: OnceCell<()>,
}

impl AccountScope {
    pub fn new(store: Arc<dyn ByteStore>, session: SessionContext) -> Self {
        Self {
            session,
            store,
            migrated: OnceCell::new(),
        }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Partition key of the current session
    pub async fn current_key(&self) -> PartitionKey {
        self.session.partition_key().await
    }

    /// Run the legacy migration once per process.
    ///
    /// A failed attempt (store error) is retried on the next call.
    pub(crate) async fn ensure_migrated(&self) -> Result<()> {
        self.migrated
            .get_or_try_init(|| async {
                self.migrate_legacy_if_needed().await?;
                Ok::<(), setlist_core::SetlistError>(())
            })
            .await?;
        Ok(())
    }

    /// Copy the pre-partition dataset into the anonymous partition.
    ///
    /// Idempotent: guarded by a flag persisted next to the datasets.
    pub async fn migrate_legacy_if_needed(&self) -> Result<MigrationOutcome> {
        if self.store.get(keys::LEGACY_MIGRATED).await?.is_some() {
            return Ok(MigrationOutcome::AlreadyDone);
        }

        let outcome = match self.store.get(keys::LEGACY_DATASET).await? {
            None => MigrationOutcome::NoLegacyData,
            Some(bytes) => match serde_json::from_slice::<Vec<LegacyPlaylist>>(&bytes) {
                Ok(legacy) => self.copy_into_anonymous(legacy).await?,
                Err(e) => {
                    warn!(error = %e, "Legacy playlist data is unreadable; skipping migration");
                    MigrationOutcome::Unreadable
                }
            },
        };

        self.store.set(keys::LEGACY_MIGRATED, b"1").await?;
        debug!(?outcome, "Legacy migration finished");

        Ok(outcome)
    }

    async fn copy_into_anonymous(&self, legacy: Vec<LegacyPlaylist>) -> Result<MigrationOutcome> {
        let anonymous = PartitionKey::anonymous();
        if dataset::exists(self.store.as_ref(), &anonymous).await? {
            warn!("Anonymous partition already has data; legacy playlists not copied");
            return Ok(MigrationOutcome::AnonymousPartitionInUse);
        }

        let now = now_ms();
        let mut migrated = StoredDataset::default();
        for entry in legacy {
            let record = PlaylistRecord::new(upgrade(entry), now);
            migrated.records.insert(record.id().clone(), record);
        }

        let playlists = migrated.records.len();
        dataset::save(self.store.as_ref(), &anonymous, &migrated).await?;
        info!(playlists, "Migrated legacy playlists into the anonymous partition");

        Ok(MigrationOutcome::Migrated { playlists })
    }
}

fn upgrade(entry: LegacyPlaylist) -> Playlist {
    let id = if entry.id.trim().is_empty() {
        PlaylistId::generate()
    } else {
        PlaylistId::new(entry.id)
    };
    let name = match entry.name.trim() {
        "" => UNTITLED.to_string(),
        trimmed => trimmed.to_string(),
    };

    let mut playlist = Playlist::with_id(id, name, Vec::new());
    for track in entry.tracks {
        playlist.push_track(track);
    }
    playlist
}
