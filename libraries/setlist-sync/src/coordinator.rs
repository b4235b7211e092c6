use crate::error::{Result, SyncError};
use crate::merge::merge_with_report;
use crate::types::SyncStatus;
use setlist_core::clock::now_ms;
use setlist_core::{PartitionKey, SessionContext, Snapshot};
use setlist_remote::RemoteStore;
use setlist_storage::LocalReplica;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, error, info, warn};

/// Drives pull-merge-import-push cycles between the local replica and the
/// remote store.
///
/// At most one cycle runs per partition. Local CRUD is not blocked by a
/// running cycle; an edit that lands between export and import is replaced
/// by the imported result.
pub struct SyncCoordinator {
    session: SessionContext,
    local: Arc<LocalReplica>,
    remote: Arc<dyn RemoteStore>,
    cycles: Mutex<HashMap<PartitionKey, Arc<AsyncMutex<()>>>>,
}

impl SyncCoordinator {
    pub fn new(
        session: SessionContext,
        local: Arc<LocalReplica>,
        remote: Arc<dyn RemoteStore>,
    ) -> Self {
        Self {
            session,
            local,
            remote,
            cycles: Mutex::new(HashMap::new()),
        }
    }

    /// Run one sync cycle for the current session, waiting for any cycle
    /// already running on the same partition.
    pub async fn sync_now(&self) -> SyncStatus {
        let (partition, token) = match self.eligible_partition().await {
            Ok(eligible) => eligible,
            Err(status) => return status,
        };

        let lock = self.cycle_lock(&partition);
        let status = {
            let _cycle = lock.lock().await;
            self.run_cycle(&partition, token.as_deref()).await
        };
        self.release_cycle_lock(&partition, lock);
        status
    }

    /// Like [`sync_now`](Self::sync_now), but fails with
    /// [`SyncError::AlreadySyncing`] instead of waiting.
    pub async fn try_sync_now(&self) -> Result<SyncStatus> {
        let (partition, token) = match self.eligible_partition().await {
            Ok(eligible) => eligible,
            Err(status) => return Ok(status),
        };

        let lock = self.cycle_lock(&partition);
        let status = match lock.try_lock() {
            Ok(_cycle) => Ok(self.run_cycle(&partition, token.as_deref()).await),
            Err(_) => Err(SyncError::AlreadySyncing),
        };
        self.release_cycle_lock(&partition, lock);
        status
    }

    /// Status persisted by the last completed cycle of the current partition
    pub async fn last_status(&self) -> Result<Option<SyncStatus>> {
        let partition = self.local.current_partition().await?;
        Ok(self.local.last_sync_status(&partition).await?)
    }

    /// The partition to sync and its credential, or the status to report
    /// without doing any I/O.
    async fn eligible_partition(
        &self,
    ) -> std::result::Result<(PartitionKey, Option<String>), SyncStatus> {
        let session = self.session.snapshot().await;
        if !session.sync_enabled {
            debug!("Sync disabled");
            return Err(SyncStatus::offline("disabled"));
        }
        if !session.is_signed_in() {
            debug!("No identity; staying offline");
            return Err(SyncStatus::offline("guest"));
        }

        let token = session.bearer_token().map(str::to_string);
        Ok((PartitionKey::for_session(&session), token))
    }

    fn cycle_lock(&self, partition: &PartitionKey) -> Arc<AsyncMutex<()>> {
        let mut cycles = self.cycles.lock().unwrap_or_else(PoisonError::into_inner);
        cycles.entry(partition.clone()).or_default().clone()
    }

    /// Drop the caller's handle, forgetting the lock once nobody else holds it
    fn release_cycle_lock(&self, partition: &PartitionKey, lock: Arc<AsyncMutex<()>>) {
        let mut cycles = self.cycles.lock().unwrap_or_else(PoisonError::into_inner);
        drop(lock);
        if cycles
            .get(partition)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            cycles.remove(partition);
        }
    }

    async fn run_cycle(&self, partition: &PartitionKey, token: Option<&str>) -> SyncStatus {
        let started = now_ms();
        info!(partition = %partition, "Starting sync");

        let status = match self.reconcile(partition, token).await {
            Ok(status) => status,
            Err(e) => {
                error!(partition = %partition, error = %e, "Sync failed");
                SyncStatus::error(e.to_string())
            }
        };

        if let Err(e) = self.local.record_sync_status(partition, &status).await {
            warn!(partition = %partition, error = %e, "Failed to persist sync status");
        }

        info!(
            partition = %partition,
            status = %status,
            elapsed_ms = now_ms() - started,
            "Sync finished"
        );
        status
    }

    async fn reconcile(
        &self,
        partition: &PartitionKey,
        token: Option<&str>,
    ) -> setlist_core::Result<SyncStatus> {
        // Phase 1: Export local state
        let local = self.local.export_snapshot_for(partition).await?;
        debug!(
            playlists = local.records.len(),
            tombstones = local.tombstones.len(),
            "Exported local snapshot"
        );

        // Phase 2: Pull remote state, degrading to the last known copy
        let remote = match self.remote.pull(partition, token).await {
            Ok(remote) => remote,
            Err(e) => {
                warn!(partition = %partition, error = %e, "Remote unavailable; using cached copy");
                self.local
                    .cached_remote(partition)
                    .await?
                    .unwrap_or_else(|| Snapshot::empty(0))
            }
        };

        // Phase 3: Merge
        let (merged, report) = merge_with_report(&local, &remote, now_ms());
        debug!(
            kept = report.kept,
            excluded = report.excluded,
            remote_won = report.remote_won,
            tombstones = merged.tombstones.len(),
            "Merged snapshots"
        );

        // Phase 4: Apply locally
        self.local
            .import_snapshot_for(partition, merged.clone())
            .await?;

        // Phase 5: Push, remembering the merged state either way
        let pushed = self.remote.push(partition, &merged, token).await;
        self.local.cache_remote(partition, &merged).await?;

        let playlists = merged.records.len();
        Ok(match pushed {
            Ok(()) => SyncStatus::resolved(format!("synced {playlists} playlists")),
            Err(e) => {
                warn!(partition = %partition, error = %e, "Push failed; merged state kept locally");
                SyncStatus::resolved(format!(
                    "synced {playlists} playlists locally; push failed: {e}"
                ))
            }
        })
    }
}
