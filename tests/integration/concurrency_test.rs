//! Concurrent operations on the same and on different files.

use std::collections::HashSet;
use std::sync::Arc;

use crate::helpers::{TestEngine, text};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_replaces_number_versions_densely() {
    let t = TestEngine::new();
    let record = t.engine.store(text("doc.txt", "base")).await.unwrap();
    let id = record.id;

    let mut handles = Vec::new();
    for i in 0..16 {
        let engine = Arc::clone(&t.engine);
        handles.push(tokio::spawn(async move {
            engine
                .replace(id, text("doc.txt", &format!("body {i}")))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let versions = t.engine.list_versions(record.id).await.unwrap();
    let numbers: Vec<u32> = versions.iter().map(|v| v.version_number).collect();
    assert_eq!(numbers, (1..=16).collect::<Vec<_>>());

    let paths: HashSet<&str> = versions.iter().map(|v| v.storage_path.as_str()).collect();
    assert_eq!(paths.len(), 16);
    assert_eq!(t.archived_objects(record.id).len(), 16);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_different_files_progress_independently() {
    let t = TestEngine::new();
    let mut ids = Vec::new();
    for i in 0..8 {
        let record = t
            .engine
            .store(text(&format!("f{i}.txt"), "0"))
            .await
            .unwrap();
        ids.push(record.id);
    }

    let mut handles = Vec::new();
    for id in ids.iter().copied() {
        let engine = Arc::clone(&t.engine);
        handles.push(tokio::spawn(async move {
            for n in 1..=3 {
                engine
                    .replace(id, text("f.txt", &n.to_string()))
                    .await
                    .unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    for id in ids {
        assert_eq!(t.engine.list_versions(id).await.unwrap().len(), 3);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_replace_and_restore_interleave_safely() {
    let t = TestEngine::new();
    let record = t.engine.store(text("doc.txt", "v0")).await.unwrap();
    let id = record.id;
    t.engine.replace(id, text("doc.txt", "v1")).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..8 {
        let engine = Arc::clone(&t.engine);
        handles.push(tokio::spawn(async move {
            if i % 2 == 0 {
                engine
                    .replace(id, text("doc.txt", "next"))
                    .await
                    .map(|_| ())
            } else {
                engine.restore_version(id, 1).await.map(|_| ())
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let numbers: Vec<u32> = t
        .engine
        .list_versions(record.id)
        .await
        .unwrap()
        .iter()
        .map(|v| v.version_number)
        .collect();
    assert_eq!(numbers, (1..=5).collect::<Vec<_>>());
}
