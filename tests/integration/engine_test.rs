//! Integration tests for the engine operations.

use bytes::Bytes;

use teamhub_core::error::ErrorKind;
use teamhub_core::types::FileId;

use crate::helpers::{TestEngine, text};

#[tokio::test]
async fn test_store_download_round_trip() {
    let t = TestEngine::new();
    let record = t.engine.store(text("a.txt", "alpha")).await.unwrap();

    assert_eq!(record.filename, "a.txt");
    assert_eq!(record.mime_type, "text/plain");
    assert_eq!(record.size_bytes, 5);
    assert!(record.versions().is_empty());
    assert_eq!(t.read(record.id).await.unwrap(), Bytes::from("alpha"));
}

#[tokio::test]
async fn test_replace_archives_previous_bytes() {
    let t = TestEngine::new();
    let record = t.engine.store(text("a.txt", "first")).await.unwrap();

    let updated = t
        .engine
        .replace(record.id, text("a.txt", "second"))
        .await
        .unwrap();

    assert_eq!(t.read(record.id).await.unwrap(), Bytes::from("second"));
    assert_eq!(updated.versions().len(), 1);
    let latest = updated.latest_version().unwrap();
    assert_eq!(latest.size_bytes, 5);
    assert_eq!(
        t.read_version(record.id, latest.version_number).await.unwrap(),
        Bytes::from("first")
    );
}

#[tokio::test]
async fn test_same_filename_versions_get_distinct_archive_paths() {
    let t = TestEngine::new();
    let record = t.engine.store(text("same.txt", "0")).await.unwrap();
    for body in ["1", "2", "3"] {
        t.engine
            .replace(record.id, text("same.txt", body))
            .await
            .unwrap();
    }

    let versions = t.engine.list_versions(record.id).await.unwrap();
    let numbers: Vec<u32> = versions.iter().map(|v| v.version_number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    assert_eq!(t.archived_objects(record.id).len(), 3);
    for (entry, expected) in versions.iter().zip(["0", "1", "2"]) {
        assert_eq!(
            t.read_version(record.id, entry.version_number).await.unwrap(),
            Bytes::from(expected)
        );
    }
}

#[tokio::test]
async fn test_delete_then_download_is_not_found() {
    let t = TestEngine::new();
    let record = t.engine.store(text("a.txt", "gone soon")).await.unwrap();

    let deleted = t.engine.delete(record.id).await.unwrap();
    assert_eq!(deleted.id, record.id);

    let err = t.read(record.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    let err = t.engine.get(record.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert!(t.objects.is_empty());
}

#[tokio::test]
async fn test_restore_makes_download_return_version_bytes() {
    let t = TestEngine::new();
    let record = t.engine.store(text("a.txt", "v1")).await.unwrap();
    t.engine.replace(record.id, text("b.txt", "v2!")).await.unwrap();
    t.engine.replace(record.id, text("c.txt", "v3!!")).await.unwrap();

    let restored = t.engine.restore_version(record.id, 1).await.unwrap();

    assert_eq!(t.read(record.id).await.unwrap(), Bytes::from("v1"));
    assert_eq!(restored.filename, "a.txt");
    assert_eq!(restored.size_bytes, 2);
    assert_eq!(restored.versions().len(), 2);

    // The archive is kept, so the same version restores again.
    t.engine.restore_version(record.id, 2).await.unwrap();
    t.engine.restore_version(record.id, 1).await.unwrap();
    assert_eq!(t.read(record.id).await.unwrap(), Bytes::from("v1"));
    assert_eq!(
        t.read_version(record.id, 1).await.unwrap(),
        Bytes::from("v1")
    );
}

#[tokio::test]
async fn test_restore_keeps_active_path() {
    let t = TestEngine::new();
    let record = t.engine.store(text("a.txt", "v1")).await.unwrap();
    let replaced = t.engine.replace(record.id, text("a.txt", "v2")).await.unwrap();

    let restored = t.engine.restore_version(record.id, 1).await.unwrap();
    assert_eq!(restored.storage_path, replaced.storage_path);
    // Staging copies never outlive the restore.
    assert_eq!(t.objects.paths_with_prefix(&format!("files/{}/", record.id)).len(), 1);
}

#[tokio::test]
async fn test_restore_invalid_version_changes_nothing() {
    let t = TestEngine::new();
    let record = t.engine.store(text("a.txt", "v1")).await.unwrap();
    let replaced = t.engine.replace(record.id, text("a.txt", "v2")).await.unwrap();

    for bad in [0, 2, 99] {
        let err = t.engine.restore_version(record.id, bad).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    let current = t.engine.get(record.id).await.unwrap();
    assert_eq!(current.revision, replaced.revision);
    assert_eq!(current.storage_path, replaced.storage_path);
    assert_eq!(current.versions(), replaced.versions());
    assert_eq!(t.read(record.id).await.unwrap(), Bytes::from("v2"));
}

#[tokio::test]
async fn test_unknown_file_is_not_found_everywhere() {
    let t = TestEngine::new();
    let id = FileId::new();

    let kinds = [
        t.engine.replace(id, text("a.txt", "x")).await.unwrap_err().kind,
        t.engine.delete(id).await.unwrap_err().kind,
        t.engine.list_versions(id).await.unwrap_err().kind,
        t.engine.restore_version(id, 1).await.unwrap_err().kind,
        t.engine.download(id).await.err().unwrap().kind,
    ];
    assert!(kinds.iter().all(|k| *k == ErrorKind::NotFound));
}

#[tokio::test]
async fn test_list_returns_live_records() {
    let t = TestEngine::new();
    let a = t.engine.store(text("a.txt", "a")).await.unwrap();
    let b = t.engine.store(text("b.txt", "b")).await.unwrap();
    t.engine.delete(a.id).await.unwrap();

    let ids: Vec<FileId> = t.engine.list().await.unwrap().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![b.id]);
}
