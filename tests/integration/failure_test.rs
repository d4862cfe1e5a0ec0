//! Backend and metadata failures leave records in their last consistent state.

use std::time::Duration;

use bytes::Bytes;

use teamhub_core::error::ErrorKind;

use crate::helpers::{TestEngine, text};

#[tokio::test]
async fn test_store_write_failure_removes_partial_object() {
    let t = TestEngine::new();
    t.provider.fail_writes(true);

    let err = t.engine.store(text("a.txt", "x")).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Storage);
    assert!(t.engine.list().await.unwrap().is_empty());
    assert!(t.objects.is_empty());
}

#[tokio::test]
async fn test_store_metadata_failure_removes_object() {
    let t = TestEngine::new();
    t.store.fail_creates(true);

    let err = t.engine.store(text("a.txt", "x")).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Metadata);
    assert!(t.objects.is_empty());
}

#[tokio::test]
async fn test_replace_write_failure_changes_nothing() {
    let t = TestEngine::new();
    let record = t.engine.store(text("a.txt", "keep")).await.unwrap();
    t.provider.fail_writes(true);

    let err = t
        .engine
        .replace(record.id, text("a.txt", "lost"))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Storage);
    let current = t.engine.get(record.id).await.unwrap();
    assert_eq!(current.revision, record.revision);
    assert!(current.versions().is_empty());
    assert_eq!(t.read(record.id).await.unwrap(), Bytes::from("keep"));
    assert_eq!(t.objects.len(), 1);
}

#[tokio::test]
async fn test_replace_archive_failure_discards_new_object() {
    let t = TestEngine::new();
    let record = t.engine.store(text("a.txt", "keep")).await.unwrap();
    t.provider.fail_copies(true);

    let err = t
        .engine
        .replace(record.id, text("a.txt", "lost"))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Storage);
    assert!(t.engine.get(record.id).await.unwrap().versions().is_empty());
    assert_eq!(t.read(record.id).await.unwrap(), Bytes::from("keep"));
    assert_eq!(t.objects.len(), 1);
}

#[tokio::test]
async fn test_replace_metadata_failure_rolls_back_archive() {
    let t = TestEngine::new();
    let record = t.engine.store(text("a.txt", "keep")).await.unwrap();
    t.store.fail_updates(true);

    let err = t
        .engine
        .replace(record.id, text("a.txt", "lost"))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Metadata);
    let current = t.engine.get(record.id).await.unwrap();
    assert_eq!(current.storage_path, record.storage_path);
    assert!(current.versions().is_empty());
    assert_eq!(t.read(record.id).await.unwrap(), Bytes::from("keep"));
    assert!(t.archived_objects(record.id).is_empty());
    assert_eq!(t.objects.len(), 1);

    // Once the store recovers the chain starts at 1.
    t.store.fail_updates(false);
    let updated = t.engine.replace(record.id, text("a.txt", "new")).await.unwrap();
    assert_eq!(updated.latest_version().unwrap().version_number, 1);
}

#[tokio::test]
async fn test_replace_cancelled_during_record_update_keeps_active_content() {
    let t = TestEngine::new();
    let record = t.engine.store(text("a.txt", "keep")).await.unwrap();
    t.store.hang_updates(true);

    let outcome = tokio::time::timeout(
        Duration::from_millis(100),
        t.engine.replace(record.id, text("b.txt", "lost")),
    )
    .await;
    assert!(outcome.is_err());

    let current = t.engine.get(record.id).await.unwrap();
    assert_eq!(current.storage_path, record.storage_path);
    assert_eq!(current.revision, record.revision);
    assert!(current.versions().is_empty());
    assert_eq!(t.read(record.id).await.unwrap(), Bytes::from("keep"));

    t.store.hang_updates(false);
    let updated = t.engine.replace(record.id, text("b.txt", "new")).await.unwrap();
    assert_eq!(updated.latest_version().unwrap().version_number, 1);
    assert_eq!(t.read_version(record.id, 1).await.unwrap(), Bytes::from("keep"));
    assert_eq!(t.read(record.id).await.unwrap(), Bytes::from("new"));
}

#[tokio::test]
async fn test_delete_metadata_failure_keeps_file() {
    let t = TestEngine::new();
    let record = t.engine.store(text("a.txt", "keep")).await.unwrap();
    t.store.fail_deletes(true);

    let err = t.engine.delete(record.id).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Metadata);
    let current = t.engine.get(record.id).await.unwrap();
    assert_eq!(current.storage_path, record.storage_path);
    assert_eq!(t.read(record.id).await.unwrap(), Bytes::from("keep"));
}

#[tokio::test]
async fn test_restore_metadata_failure_keeps_active_content() {
    let t = TestEngine::new();
    let record = t.engine.store(text("a.txt", "v1")).await.unwrap();
    let current = t
        .engine
        .replace(record.id, text("bb.txt", "version 2"))
        .await
        .unwrap();
    t.store.fail_updates(true);

    let err = t.engine.restore_version(record.id, 1).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Metadata);
    let after = t.engine.get(record.id).await.unwrap();
    assert_eq!(after.filename, "bb.txt");
    assert_eq!(after.size_bytes, 9);
    assert_eq!(after.revision, current.revision);
    assert_eq!(t.read(record.id).await.unwrap(), Bytes::from("version 2"));
    // Active object plus the one archive; the staging copy is gone.
    assert_eq!(t.objects.len(), 2);
}

#[tokio::test]
async fn test_restore_rename_failure_writes_previous_record_back() {
    let t = TestEngine::new();
    let record = t.engine.store(text("a.txt", "v1")).await.unwrap();
    t.engine
        .replace(record.id, text("bb.txt", "version 2"))
        .await
        .unwrap();
    t.provider.fail_renames(true);

    let err = t.engine.restore_version(record.id, 1).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Storage);
    let after = t.engine.get(record.id).await.unwrap();
    assert_eq!(after.filename, "bb.txt");
    assert_eq!(after.size_bytes, 9);
    assert_eq!(t.read(record.id).await.unwrap(), Bytes::from("version 2"));
    assert_eq!(t.objects.len(), 2);
}
