//! In-memory storage provider.
//!
//! A non-persistent object store using DashMap for concurrent access.
//! Used for tests, development, and embedded deployments.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;

use teamhub_core::error::AppError;
use teamhub_core::result::AppResult;
use teamhub_core::traits::storage::{ByteStream, StorageProvider};

use crate::validation::normalize_key;

/// In-memory object storage provider.
///
/// `Clone` shares the same underlying map, so a test can keep a handle
/// and inspect or tamper with objects behind the engine's back.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorageProvider {
    objects: Arc<DashMap<String, Bytes>>,
}

impl MemoryStorageProvider {
    /// Creates a new empty in-memory provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of objects in the store.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Paths of all stored objects under `prefix`, sorted.
    pub fn paths_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut paths: Vec<String> = self
            .objects
            .iter()
            .filter(|entry| entry.key().starts_with(prefix))
            .map(|entry| entry.key().clone())
            .collect();
        paths.sort();
        paths
    }

    fn get(&self, key: &str) -> AppResult<Bytes> {
        self.objects
            .get(key)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::not_found(format!("File not found: {key}")))
    }
}

#[async_trait]
impl StorageProvider for MemoryStorageProvider {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn exists(&self, path: &str) -> AppResult<bool> {
        let key = normalize_key(path)?;
        Ok(self.objects.contains_key(&key))
    }

    async fn read(&self, path: &str) -> AppResult<ByteStream> {
        let data = self.read_bytes(path).await?;
        Ok(Box::pin(futures::stream::once(async move {
            Ok::<_, std::io::Error>(data)
        })))
    }

    async fn read_bytes(&self, path: &str) -> AppResult<Bytes> {
        let key = normalize_key(path)?;
        self.get(&key)
    }

    async fn write(&self, path: &str, data: Bytes) -> AppResult<()> {
        let key = normalize_key(path)?;
        self.objects.insert(key, data);
        Ok(())
    }

    async fn copy(&self, from: &str, to: &str) -> AppResult<()> {
        let from_key = normalize_key(from)?;
        let to_key = normalize_key(to)?;
        let data = self.get(&from_key)?;
        self.objects.insert(to_key, data);
        Ok(())
    }

    async fn rename(&self, from: &str, to: &str) -> AppResult<()> {
        let from_key = normalize_key(from)?;
        let to_key = normalize_key(to)?;
        let (_, data) = self
            .objects
            .remove(&from_key)
            .ok_or_else(|| AppError::not_found(format!("File not found: {from_key}")))?;
        self.objects.insert(to_key, data);
        Ok(())
    }

    async fn delete(&self, path: &str) -> AppResult<bool> {
        let key = normalize_key(path)?;
        Ok(self.objects.remove(&key).is_some())
    }

    async fn create_dir(&self, path: &str) -> AppResult<()> {
        // Directories are implicit in a flat key space.
        normalize_key(path)?;
        Ok(())
    }
}
