//! Integration tests for the file store.

mod helpers;

use bytes::Bytes;
use chrono::Duration;

use boxlite_core::error::ErrorKind;
use boxlite_core::traits::storage::ContentStore;
use boxlite_core::types::id::FolderId;

use helpers::{TestApp, user};

#[tokio::test]
async fn test_upload_delete_lifecycle() {
    let app = TestApp::new();
    let record = app.upload("u1", "hello.txt", "hello").await;
    assert_eq!(record.size_bytes, 5);
    assert_eq!(record.version, 1);

    let err = app
        .services
        .files
        .delete(&record.file_id, &user("u2"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);

    app.services
        .files
        .delete(&record.file_id, &user("u1"))
        .await
        .unwrap();

    let err = app.services.files.fetch(&record.file_id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert!(app.content.is_empty());
}

#[tokio::test]
async fn test_round_trip_preserves_bytes_and_owner() {
    let app = TestApp::new();
    let body = "line one\nline two\n";
    let record = app.upload("alice", "notes.md", body).await;

    let (fetched, data) = app.services.files.fetch(&record.file_id).await.unwrap();
    assert_eq!(data, Bytes::from(body));
    assert_eq!(fetched.owner_id, user("alice"));
    assert_eq!(fetched.original_name, "notes.md");
}

#[tokio::test]
async fn test_list_never_leaks_other_owners() {
    let app = TestApp::new();
    for i in 0..5 {
        app.upload("u1", &format!("a{i}.txt"), "a").await;
        app.upload("u2", &format!("b{i}.txt"), "b").await;
        app.clock.advance(Duration::seconds(1));
    }

    let mine = app.services.files.list(&user("u1"), None).await.unwrap();
    assert_eq!(mine.len(), 5);
    assert!(mine.iter().all(|r| r.owner_id == user("u1")));
    assert!(mine.windows(2).all(|w| w[0].updated_at >= w[1].updated_at));
}

#[tokio::test]
async fn test_move_then_list_by_folder() {
    let app = TestApp::new();
    let record = app.upload("u1", "report.pdf", "%PDF").await;
    let reports = FolderId::from("reports");

    app.services
        .files
        .move_file(&record.file_id, &user("u1"), Some(reports.clone()))
        .await
        .unwrap();

    assert!(app.services.files.list(&user("u1"), None).await.unwrap().is_empty());
    let listed = app
        .services
        .files
        .list(&user("u1"), Some(&reports))
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn test_upload_policy_applies() {
    let mut config = boxlite_core::config::AppConfig::default();
    config.storage.max_upload_size_bytes = 8;
    config.storage.allowed_extensions = vec![".txt".to_string()];
    let app = TestApp::with_config(config);

    let files = &app.services.files;
    let err = files
        .store(&user("u1"), Bytes::from("123456789"), "big.txt", None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidArgument);

    let err = files
        .store(&user("u1"), Bytes::from("x"), "run.sh", None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidArgument);

    files
        .store(&user("u1"), Bytes::from("x"), "ok.TXT", None)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_local_store_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let (services, _clock) = helpers::local_app(dir.path()).await;
    let owner = user("u1");

    let record = services
        .files
        .store(&owner, Bytes::from("on disk"), "disk.txt", None)
        .await
        .unwrap();
    let (_, data) = services.files.fetch(&record.file_id).await.unwrap();
    assert_eq!(data, Bytes::from("on disk"));

    let updated = services
        .files
        .replace_content(&record.file_id, &owner, Bytes::from("rewritten"))
        .await
        .unwrap();
    assert_eq!(updated.version, 2);
    let (_, data) = services.files.fetch(&record.file_id).await.unwrap();
    assert_eq!(data, Bytes::from("rewritten"));

    assert_eq!(services.files.reclaim_orphans().await.unwrap(), 0);
    services.files.delete(&record.file_id, &owner).await.unwrap();
    assert!(services.storage.provider().list_references().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_concurrent_uploads_on_distinct_ids() {
    let app = TestApp::new();
    let files = app.services.files.clone();

    let handles: Vec<_> = (0..32)
        .map(|i| {
            let files = files.clone();
            tokio::spawn(async move {
                files
                    .store(&user("u1"), Bytes::from(format!("body {i}")), "f.txt", None)
                    .await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(app.services.metadata.len(), 32);
    assert_eq!(app.content.len(), 32);
    assert_eq!(files.reclaim_orphans().await.unwrap(), 0);
}
