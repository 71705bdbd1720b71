//! Integration tests for the change feed and conflict resolution.

mod helpers;

use bytes::Bytes;
use chrono::Duration;

use boxlite_core::error::ErrorKind;
use boxlite_entity::sync::{ConflictStatus, VersionDescriptor, VersionTag};
use boxlite_service::resolve;

use helpers::{TestApp, user};

#[tokio::test]
async fn test_change_feed_tracks_updates() {
    let app = TestApp::new();
    let first = app.upload("u1", "one.txt", "1").await;
    app.clock.advance(Duration::minutes(1));
    let checkpoint = app.clock_millis();
    app.clock.advance(Duration::minutes(1));
    let second = app.upload("u1", "two.txt", "2").await;
    app.upload("u2", "other.txt", "x").await;

    let changed = app
        .services
        .sync
        .get_updated_files(&user("u1"), checkpoint)
        .await
        .unwrap();
    assert_eq!(changed.len(), 1);
    assert_eq!(changed[0].file_id, second.file_id);

    app.clock.advance(Duration::minutes(1));
    app.services
        .files
        .replace_content(&first.file_id, &user("u1"), Bytes::from("1b"))
        .await
        .unwrap();

    let changed = app
        .services
        .sync
        .get_updated_files(&user("u1"), checkpoint)
        .await
        .unwrap();
    let ids: Vec<_> = changed.iter().map(|r| r.file_id.clone()).collect();
    assert_eq!(ids, vec![first.file_id, second.file_id]);
}

#[tokio::test]
async fn test_change_feed_rejects_negative_timestamp() {
    let app = TestApp::new();
    let err = app
        .services
        .sync
        .get_updated_files(&user("u1"), -5)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidArgument);
}

#[tokio::test]
async fn test_remote_edit_wins_over_stale_server_copy() {
    let app = TestApp::new();
    let record = app.upload("u1", "doc.txt", "v1").await;
    app.services
        .files
        .replace_content(&record.file_id, &user("u1"), Bytes::from("v2"))
        .await
        .unwrap();

    let remote = VersionDescriptor {
        file_id: record.file_id.clone(),
        version: Some(VersionTag::Number(3)),
        modified_at: Some(app.clock_now() + Duration::seconds(10)),
        content_marker: Some("sha256:abc".to_string()),
    };

    let resolved = app
        .services
        .sync
        .check(&record.file_id, &remote)
        .await
        .unwrap();
    assert_eq!(resolved.conflict_status, Some(ConflictStatus::ResolvedKeepRemote));
    assert_eq!(resolved.conflicting_version, Some(VersionTag::Number(2)));
    assert_eq!(resolved.descriptor.content_marker.as_deref(), Some("sha256:abc"));
}

#[test]
fn test_resolve_from_wire_json() {
    let local: VersionDescriptor = serde_json::from_str(
        r#"{"file_id":"f1","version":2,"modified_at":"2024-01-01T00:00:00Z"}"#,
    )
    .unwrap();
    let remote: VersionDescriptor = serde_json::from_str(
        r#"{"file_id":"f1","version":3,"modified_at":"2024-01-02T00:00:00Z"}"#,
    )
    .unwrap();

    let resolved = resolve(&local, &remote).unwrap();
    let json = serde_json::to_value(&resolved).unwrap();
    assert_eq!(json["version"], 3);
    assert_eq!(json["conflict_status"], "resolved_keep_remote");
    assert_eq!(json["conflicting_version"], 2);

    let unversioned: VersionDescriptor = serde_json::from_str(r#"{"file_id":"f1"}"#).unwrap();
    let err = resolve(&local, &unversioned).unwrap_err();
    assert_eq!(err.kind, ErrorKind::MissingField);
}
