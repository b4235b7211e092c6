//! Integration tests for the SQLite byte store
//!
//! Uses real database files so that persistence across pool reopen is
//! observable.


use setlist_core::{ByteStore, Session, SessionContext};
use setlist_storage::LocalReplica;
use std::sync::Arc;
use test_helpers::*;

#[tokio::test]
async fn test_set_and_get_blob() {
    let db = TestDb::new().await;

    db.store.set("k", b"value").await.unwrap();

    let value = db.store.get("k").await.unwrap();
    assert_eq!(value.as_deref(), Some(&b"value"[..]));
}

#[tokio::test]
async fn test_get_missing_key() {
    let db = TestDb::new().await;

    assert!(db.store.get("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_set_overwrites_existing_value() {
    let db = TestDb::new().await;

    db.store.set("k", b"one").await.unwrap();
    db.store.set("k", b"two").await.unwrap();

    assert_eq!(db.store.get("k").await.unwrap().as_deref(), Some(&b"two"[..]));
}

#[tokio::test]
async fn test_remove() {
    let db = TestDb::new().await;
    db.store.set("k", b"v").await.unwrap();

    assert!(db.store.remove("k").await.unwrap());
    assert!(!db.store.remove("k").await.unwrap());
    assert!(db.store.get("k").await.unwrap().is_none());
}

#[tokio::test]
async fn test_replica_survives_reopen() {
    let db = TestDb::new().await;
    let session = SessionContext::new(Session::signed_in("a@example.com", None));

    let playlist = {
        let replica = LocalReplica::new(Arc::new(db.store.clone()), session.clone());
        let playlist = replica.create("Durable").await.unwrap();
        replica.add_track(&playlist.id, track("a")).await.unwrap();
        playlist
    };

    let reopened = LocalReplica::new(Arc::new(db.reopen().await), session);
    let stored = reopened.get(&playlist.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Durable");
    assert_eq!(stored.tracks, vec![track("a")]);
}
