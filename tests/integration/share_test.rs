//! Integration tests for share links and shared access.

mod helpers;

use std::sync::Arc;

use bytes::Bytes;
use chrono::Duration;

use boxlite_core::error::ErrorKind;
use boxlite_core::types::id::FileId;
use boxlite_entity::share::SharePermission;

use helpers::{TestApp, user};

#[tokio::test]
async fn test_link_validates_until_expiry() {
    let app = TestApp::new();
    let shares = &app.services.shares;

    let share = shares
        .create_link(&user("u1"), &FileId::from("f1"), SharePermission::Read, Some(7))
        .unwrap();

    let validated = shares.validate(&share.token).unwrap();
    assert_eq!(validated.file_id, FileId::from("f1"));
    assert_eq!(validated.access_count, 1);

    app.clock.advance(Duration::days(7) + Duration::seconds(1));
    let err = shares.validate(&share.token).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Expired);
    assert!(!shares.get(&share.token).unwrap().is_valid);

    let err = shares.validate(&share.token).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Expired | ErrorKind::Revoked));
}

#[tokio::test]
async fn test_revoked_link_never_validates() {
    let app = TestApp::new();
    let shares = &app.services.shares;
    let share = shares
        .create_link(&user("u1"), &FileId::from("f1"), SharePermission::Write, None)
        .unwrap();

    let err = shares.revoke(&share.token, &user("mallory")).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);
    assert!(shares.validate(&share.token).is_ok());

    shares.revoke(&share.token, &user("u1")).unwrap();
    for _ in 0..3 {
        let err = shares.validate(&share.token).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Revoked);
    }
    assert!(shares.list_active(&user("u1")).is_empty());
}

#[tokio::test]
async fn test_open_shared_file_flow() {
    let app = TestApp::new();
    let record = app.upload("u1", "photo.jpg", "jpeg bytes").await;
    let share = app
        .services
        .shares
        .create_link(&user("u1"), &record.file_id, SharePermission::Read, Some(1))
        .unwrap();

    let opened = app.services.access.open_shared(&share.token).await.unwrap();
    assert_eq!(opened.data, Bytes::from("jpeg bytes"));
    assert_eq!(opened.file.original_name, "photo.jpg");

    app.clock.advance(Duration::days(2));
    let err = app
        .services
        .access
        .open_shared(&share.token)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Expired);
}

#[tokio::test]
async fn test_link_to_missing_file_is_invalidated_on_use() {
    let app = TestApp::new();
    let share = app
        .services
        .shares
        .create_link(
            &user("u1"),
            &FileId::from("never-uploaded"),
            SharePermission::Read,
            Some(7),
        )
        .unwrap();

    let err = app
        .services
        .access
        .open_shared(&share.token)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert!(!app.services.shares.get(&share.token).unwrap().is_valid);
}

#[tokio::test]
async fn test_serialized_share_and_file_hide_internals() {
    let app = TestApp::new();
    let record = app.upload("u1", "a.txt", "a").await;
    let share = app
        .services
        .shares
        .create_link(&user("u1"), &record.file_id, SharePermission::NoAccess, Some(3))
        .unwrap();

    let file_json = serde_json::to_value(&record).unwrap();
    assert!(file_json.get("storage_reference").is_none());
    assert_eq!(file_json["version"], 1);

    let share_json = serde_json::to_value(&share).unwrap();
    assert_eq!(share_json["permission_level"], "none");
    assert_eq!(share_json["is_valid"], true);
}

#[tokio::test]
async fn test_concurrent_validation_after_expiry_flips_once() {
    let app = TestApp::new();
    let shares = Arc::clone(&app.services.shares);
    let share = shares
        .create_link(&user("u1"), &FileId::from("f1"), SharePermission::Read, Some(1))
        .unwrap();
    app.clock.advance(Duration::days(3));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let shares = Arc::clone(&shares);
            let token = share.token.clone();
            tokio::spawn(async move { shares.validate(&token) })
        })
        .collect();
    for handle in handles {
        let err = handle.await.unwrap().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Expired);
    }

    let stored = shares.get(&share.token).unwrap();
    assert!(!stored.is_valid);
    assert_eq!(stored.access_count, 0);
}
