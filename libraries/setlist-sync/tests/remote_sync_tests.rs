//! End-to-end sync cycles against a mock document store.

use setlist_core::{PartitionKey, PlaylistId, Session, SessionContext};
use setlist_remote::{decode_snapshot, Document, RemoteConfig, RemoteReplica};
use setlist_storage::{LocalReplica, MemoryByteStore};
use setlist_sync::{SyncCoordinator, SyncState};
use std::sync::Arc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DOC_PATH: &str = "/playlists/user:dana@example.com";

async fn setup(server: &MockServer) -> (Arc<LocalReplica>, SyncCoordinator) {
    let session = SessionContext::new(Session::signed_in(
        "dana@example.com",
        Some("dana-token".to_string()),
    ));
    let local = Arc::new(LocalReplica::new(
        Arc::new(MemoryByteStore::new()),
        session.clone(),
    ));
    let remote = Arc::new(RemoteReplica::new(RemoteConfig::new(server.uri())).unwrap());
    let sync = SyncCoordinator::new(session, local.clone(), remote);
    (local, sync)
}

fn remote_document() -> serde_json::Value {
    serde_json::json!({
        "fields": {
            "accountKey": {"stringValue": "user:dana@example.com"},
            "generatedAtMs": {"integerValue": "1000"},
            "playlists": {"arrayValue": {"values": [
                {"mapValue": {"fields": {
                    "id": {"stringValue": "from-web"},
                    "name": {"stringValue": "Made on the web"},
                    "updatedAtMs": {"integerValue": "900"},
                    "songs": {"arrayValue": {"values": []}}
                }}}
            ]}},
            "deletedPlaylistIds": {"arrayValue": {"values": [
                {"stringValue": "old"}
            ]}}
        }
    })
}

async fn pushed_snapshot(server: &MockServer) -> setlist_core::Snapshot {
    let requests = server.received_requests().await.unwrap();
    let patch = requests
        .iter()
        .find(|r| r.method.to_string() == "PATCH")
        .expect("no PATCH request");
    let body: serde_json::Value = serde_json::from_slice(&patch.body).unwrap();
    decode_snapshot(&Document::from_json(&body))
}

#[tokio::test]
async fn test_cycle_merges_both_sides() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(DOC_PATH))
        .and(header("authorization", "Bearer dana-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(remote_document()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(DOC_PATH))
        .and(header("authorization", "Bearer dana-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let (local, sync) = setup(&server).await;
    let mine = local.create("Made on the phone").await.unwrap();

    let status = sync.sync_now().await;

    assert_eq!(status.state, SyncState::ConflictResolved);
    assert_eq!(status.detail, "synced 2 playlists");

    let names: Vec<String> = local
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["Made on the phone", "Made on the web"]);

    let pushed = pushed_snapshot(&server).await;
    assert!(pushed.records.contains_key(&mine.id));
    assert!(pushed.records.contains_key(&PlaylistId::new("from-web")));
    assert!(pushed.is_tombstoned(&PlaylistId::new("old")));
}

#[tokio::test]
async fn test_missing_document_is_created() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(DOC_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(DOC_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let (local, sync) = setup(&server).await;
    local.create("First").await.unwrap();

    let status = sync.sync_now().await;

    assert_eq!(status.detail, "synced 1 playlists");
    let requests = server.received_requests().await.unwrap();
    let patch = requests
        .iter()
        .find(|r| r.method.to_string() == "PATCH")
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&patch.body).unwrap();
    assert_eq!(
        body["fields"]["accountKey"]["stringValue"],
        "user:dana@example.com"
    );
}

#[tokio::test]
async fn test_server_error_on_pull_still_pushes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(DOC_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(DOC_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let (local, sync) = setup(&server).await;
    let playlist = local.create("Offline edit").await.unwrap();

    let status = sync.sync_now().await;

    assert_eq!(status.state, SyncState::ConflictResolved);
    assert!(pushed_snapshot(&server)
        .await
        .records
        .contains_key(&playlist.id));
}

#[tokio::test]
async fn test_rejected_push_reports_auth_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(DOC_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(remote_document()))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(DOC_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("UNAUTHENTICATED"))
        .mount(&server)
        .await;

    let (local, sync) = setup(&server).await;

    let status = sync.sync_now().await;

    assert_eq!(status.state, SyncState::ConflictResolved);
    assert!(status.detail.starts_with("synced 1 playlists locally; push failed:"));
    assert!(status.detail.contains("Authentication required"));

    // The merge is applied locally and remembered as the last known remote
    assert!(local
        .get(&PlaylistId::new("from-web"))
        .await
        .unwrap()
        .is_some());
    let key = PartitionKey::for_subject("dana@example.com");
    assert!(local.cached_remote(&key).await.unwrap().is_some());
}
