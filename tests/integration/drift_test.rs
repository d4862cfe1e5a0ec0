//! Metadata pointing at objects the backend no longer has.

use bytes::Bytes;

use teamhub_core::error::ErrorKind;
use teamhub_core::events::{DriftOperation, FileEvent};
use teamhub_core::traits::storage::StorageProvider;

use crate::helpers::{TestEngine, drain, text};

#[tokio::test]
async fn test_replace_with_missing_active_object_continues() {
    let t = TestEngine::new();
    let record = t.engine.store(text("a.txt", "v1")).await.unwrap();
    let mut rx = t.engine.subscribe();
    t.objects.delete(&record.storage_path).await.unwrap();

    let updated = t
        .engine
        .replace(record.id, text("a.txt", "v2"))
        .await
        .unwrap();

    assert_eq!(updated.versions().len(), 1);
    assert_eq!(t.read(record.id).await.unwrap(), Bytes::from("v2"));

    let events = drain(&mut rx);
    assert!(events.iter().any(|e| matches!(
        e,
        FileEvent::DriftDetected { operation: DriftOperation::Archive, path, .. }
            if *path == record.storage_path
    )));
    assert!(
        events
            .iter()
            .any(|e| matches!(e, FileEvent::Replaced { archived_version: 1, .. }))
    );

    // The skipped archive has no content behind it.
    let err = t.read_version(record.id, 1).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_delete_with_missing_active_object_removes_record() {
    let t = TestEngine::new();
    let record = t.engine.store(text("a.txt", "v1")).await.unwrap();
    let mut rx = t.engine.subscribe();
    t.objects.delete(&record.storage_path).await.unwrap();

    t.engine.delete(record.id).await.unwrap();

    let err = t.engine.get(record.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    let events = drain(&mut rx);
    assert!(matches!(
        events.first(),
        Some(FileEvent::DriftDetected {
            operation: DriftOperation::Delete,
            ..
        })
    ));
}

#[tokio::test]
async fn test_download_with_missing_active_object_is_not_found() {
    let t = TestEngine::new();
    let record = t.engine.store(text("a.txt", "v1")).await.unwrap();
    t.objects.delete(&record.storage_path).await.unwrap();

    let err = t.engine.download(record.id).await.err().unwrap();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_restore_with_missing_archive_is_not_found() {
    let t = TestEngine::new();
    let record = t.engine.store(text("a.txt", "v1")).await.unwrap();
    let updated = t.engine.replace(record.id, text("a.txt", "v2")).await.unwrap();
    let archive = updated.version(1).unwrap().storage_path.clone();
    t.objects.delete(&archive).await.unwrap();

    let err = t.engine.restore_version(record.id, 1).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(t.read(record.id).await.unwrap(), Bytes::from("v2"));
}
