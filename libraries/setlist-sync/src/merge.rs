//! Snapshot reconciliation.
//!
//! Playlists are resolved whole: the record with the later `updated_at_ms`
//! wins, the remote record wins ties, and a record is dropped when the
//! playlist's deletion time is at or after its last update. A tombstone is
//! dated by the `generated_at_ms` of the snapshot carrying it; when both
//! sides carry one, the later date counts. Tombstones are only ever unioned.

use setlist_core::clock::now_ms;
use setlist_core::{PlaylistId, PlaylistRecord, Snapshot};
use std::collections::BTreeMap;

/// Counts describing how a merge resolved its inputs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Records in the output
    pub kept: usize,
    /// Candidates dropped because their deletion is at least as recent
    pub excluded: usize,
    /// IDs where the remote record replaced an existing local one
    pub remote_won: usize,
}

/// Merge two snapshots, stamping the result with the current time.
pub fn merge(local: &Snapshot, remote: &Snapshot) -> Snapshot {
    merge_at(local, remote, now_ms())
}

/// Merge two snapshots, stamping the result with `now_ms`.
pub fn merge_at(local: &Snapshot, remote: &Snapshot, now_ms: i64) -> Snapshot {
    merge_with_report(local, remote, now_ms).0
}

/// [`merge_at`], also reporting how each playlist was resolved.
pub fn merge_with_report(
    local: &Snapshot,
    remote: &Snapshot,
    now_ms: i64,
) -> (Snapshot, MergeReport) {
    let mut report = MergeReport::default();

    let tombstones = local.tombstones.union(&remote.tombstones).cloned().collect();

    let mut candidates: BTreeMap<&PlaylistId, &PlaylistRecord> = local.records.iter().collect();
    for (id, theirs) in &remote.records {
        let remote_is_newer = candidates
            .get(id)
            .map(|ours| theirs.updated_at_ms >= ours.updated_at_ms);
        match remote_is_newer {
            Some(false) => {}
            Some(true) => {
                report.remote_won += 1;
                candidates.insert(id, theirs);
            }
            None => {
                candidates.insert(id, theirs);
            }
        }
    }

    let mut records = BTreeMap::new();
    for (id, record) in candidates {
        match deletion_time(local, remote, id) {
            Some(deleted_at) if deleted_at >= record.updated_at_ms => report.excluded += 1,
            _ => {
                records.insert(id.clone(), record.clone());
            }
        }
    }
    report.kept = records.len();

    let merged = Snapshot {
        records,
        tombstones,
        generated_at_ms: now_ms,
    };
    (merged, report)
}

/// Latest deletion of `id` seen by either input
fn deletion_time(local: &Snapshot, remote: &Snapshot, id: &PlaylistId) -> Option<i64> {
    local.deleted_at(id).max(remote.deleted_at(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use setlist_core::{Playlist, Track};

    fn track(id: &str) -> Track {
        Track::new(id, id.to_uppercase(), "Artist")
    }

    fn record(id: &str, updated: i64, tracks: &[&str]) -> PlaylistRecord {
        PlaylistRecord::new(
            Playlist::with_id(
                PlaylistId::new(id),
                format!("Playlist {id}"),
                tracks.iter().map(|t| track(t)).collect(),
            ),
            updated,
        )
    }

    fn ids(snapshot: &Snapshot) -> Vec<&str> {
        snapshot.records.keys().map(PlaylistId::as_str).collect()
    }

    #[test]
    fn remote_wins_ties() {
        let local = Snapshot::empty(1).with_record(record("P1", 100, &["a"]));
        let remote = Snapshot::empty(1).with_record(record("P1", 100, &["a", "b"]));

        let (merged, report) = merge_with_report(&local, &remote, 999);

        assert_eq!(
            merged.records[&PlaylistId::new("P1")].playlist.tracks,
            vec![track("a"), track("b")]
        );
        assert_eq!(report.remote_won, 1);
    }

    #[test]
    fn later_write_wins() {
        let local = Snapshot::empty(1).with_record(record("P1", 100, &["a"]));
        let remote = Snapshot::empty(1).with_record(record("P1", 200, &["a", "b"]));
        assert_eq!(
            merge_at(&local, &remote, 999).records[&PlaylistId::new("P1")]
                .playlist
                .tracks
                .len(),
            2
        );

        // And the other way round
        let merged = merge_at(&remote, &local, 999);
        assert_eq!(merged.records[&PlaylistId::new("P1")].updated_at_ms, 200);
    }

    #[test]
    fn deletion_beats_older_edit() {
        let local = Snapshot::empty(300).with_tombstone("P2");
        let remote = Snapshot::empty(260).with_record(record("P2", 250, &["a"]));

        let (merged, report) = merge_with_report(&local, &remote, 999);

        assert!(merged.records.is_empty());
        assert!(merged.is_tombstoned(&PlaylistId::new("P2")));
        assert_eq!(report.excluded, 1);
    }

    #[test]
    fn edit_after_deletion_resurrects() {
        let local = Snapshot::empty(100).with_tombstone("P3");
        let remote = Snapshot::empty(600).with_record(record("P3", 500, &["a"]));

        let merged = merge_at(&local, &remote, 999);

        assert_eq!(ids(&merged), vec!["P3"]);
        // Still remembered as once deleted
        assert!(merged.is_tombstoned(&PlaylistId::new("P3")));
    }

    #[test]
    fn deletion_is_dated_by_its_snapshot() {
        // Deleted locally before the remote edit, but the local snapshot was
        // taken after it: the deletion still wins
        let local = Snapshot::empty(460).with_tombstone("P");
        let remote = Snapshot::empty(470).with_record(record("P", 410, &["a"]));

        let (merged, report) = merge_with_report(&local, &remote, 999);

        assert!(merged.records.is_empty());
        assert_eq!(report.excluded, 1);
    }

    #[test]
    fn deletion_at_same_instant_as_update_wins() {
        let local = Snapshot::empty(400).with_tombstone("P");
        let remote = Snapshot::empty(500).with_record(record("P", 400, &[]));
        assert!(merge_at(&local, &remote, 999).records.is_empty());
    }

    #[test]
    fn later_of_two_deletions_counts() {
        let local = Snapshot::empty(100)
            .with_record(record("P", 150, &[]))
            .with_tombstone("P");
        let remote = Snapshot::empty(200).with_tombstone("P");
        assert!(merge_at(&local, &remote, 999).records.is_empty());

        // Neither deletion reaches the edit
        let local = Snapshot::empty(100)
            .with_record(record("P", 250, &[]))
            .with_tombstone("P");
        assert_eq!(ids(&merge_at(&local, &remote, 999)), vec!["P"]);
    }

    #[test]
    fn local_tombstone_applies_to_local_record() {
        let local = Snapshot::empty(10)
            .with_record(record("P", 5, &[]))
            .with_tombstone("P");
        assert!(merge_at(&local, &Snapshot::empty(0), 11).records.is_empty());
    }

    #[test]
    fn tombstones_are_unioned() {
        let local = Snapshot::empty(0).with_tombstone("a").with_tombstone("b");
        let remote = Snapshot::empty(0).with_tombstone("b").with_tombstone("c");

        let merged = merge_at(&local, &remote, 1);

        let tombstoned: Vec<&str> = merged.tombstones.iter().map(PlaylistId::as_str).collect();
        assert_eq!(tombstoned, vec!["a", "b", "c"]);
    }

    #[test]
    fn disjoint_records_are_combined() {
        let local = Snapshot::empty(1).with_record(record("L", 1, &["x"]));
        let remote = Snapshot::empty(1).with_record(record("R", 1, &["y"]));

        let (merged, report) = merge_with_report(&local, &remote, 2);

        assert_eq!(ids(&merged), vec!["L", "R"]);
        assert_eq!(
            report,
            MergeReport {
                kept: 2,
                excluded: 0,
                remote_won: 0,
            }
        );
    }

    #[test]
    fn output_is_stamped_with_merge_time() {
        let merged = merge_at(&Snapshot::empty(5), &Snapshot::empty(9), 1234);
        assert_eq!(merged.generated_at_ms, 1234);
        assert!(merge(&Snapshot::empty(5), &Snapshot::empty(9)).generated_at_ms > 1234);
    }

    #[test]
    fn merging_a_snapshot_with_itself_is_identity() {
        let snapshot = Snapshot::empty(300)
            .with_record(record("A", 100, &["a", "b"]))
            .with_record(record("B", 400, &[]))
            .with_tombstone("B")
            .with_tombstone("C");

        let merged = merge_at(&snapshot, &snapshot, 1);

        assert_eq!(merged.records, snapshot.records);
        assert_eq!(merged.tombstones, snapshot.tombstones);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use setlist_core::{Playlist, Track};

    fn arb_record(id: String) -> impl Strategy<Value = PlaylistRecord> {
        (0i64..1_000, proptest::collection::vec("[a-c]", 0..4)).prop_map(move |(at, tracks)| {
            let tracks = tracks
                .iter()
                .map(|t| Track::new(t.as_str(), t.as_str(), ""))
                .collect();
            PlaylistRecord::new(
                Playlist::with_id(PlaylistId::new(id.as_str()), "p", tracks),
                at,
            )
        })
    }

    fn arb_snapshot() -> impl Strategy<Value = Snapshot> {
        let records = proptest::collection::btree_map("[p-t]", Just(()), 0..5).prop_flat_map(
            |ids| {
                ids.into_keys()
                    .map(arb_record)
                    .collect::<Vec<_>>()
            },
        );
        let tombstones = proptest::collection::btree_set("[p-z]", 0..5);

        (records, tombstones, 0i64..1_000).prop_map(|(records, tombstones, generated)| {
            let mut snapshot = Snapshot::empty(generated);
            for record in records {
                snapshot.insert_record(record);
            }
            for id in tombstones {
                snapshot.tombstone(PlaylistId::new(id));
            }
            snapshot
        })
    }

    /// Live records are never shadowed by their own tombstone
    fn well_formed(snapshot: Snapshot) -> Snapshot {
        merge_at(&snapshot, &Snapshot::empty(0), snapshot.generated_at_ms)
    }

    proptest! {
        #[test]
        fn prop_idempotent(snapshot in arb_snapshot().prop_map(well_formed)) {
            let merged = merge_at(&snapshot, &snapshot, 0);
            prop_assert_eq!(merged.records, snapshot.records);
            prop_assert_eq!(merged.tombstones, snapshot.tombstones);
        }

        #[test]
        fn prop_tombstones_never_shrink(local in arb_snapshot(), remote in arb_snapshot()) {
            let merged = merge_at(&local, &remote, 0);
            prop_assert!(merged.tombstones.is_superset(&local.tombstones));
            prop_assert!(merged.tombstones.is_superset(&remote.tombstones));
        }

        #[test]
        fn prop_kept_records_outlive_deletions(local in arb_snapshot(), remote in arb_snapshot()) {
            let merged = merge_at(&local, &remote, 0);
            for (id, record) in &merged.records {
                if let Some(deleted_at) = deletion_time(&local, &remote, id) {
                    prop_assert!(deleted_at < record.updated_at_ms);
                }
            }
        }

        #[test]
        fn prop_dropped_records_were_deleted(local in arb_snapshot(), remote in arb_snapshot()) {
            let merged = merge_at(&local, &remote, 0);
            for id in local.records.keys().chain(remote.records.keys()) {
                if !merged.records.contains_key(id) {
                    prop_assert!(deletion_time(&local, &remote, id).is_some());
                }
            }
        }

        #[test]
        fn prop_deterministic(local in arb_snapshot(), remote in arb_snapshot()) {
            prop_assert_eq!(merge_at(&local, &remote, 7), merge_at(&local, &remote, 7));
        }
    }
}
