//! In-memory document store using DashMap.

use std::fmt;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use teamhub_core::error::AppError;
use teamhub_core::result::AppResult;
use teamhub_core::traits::document::{Document, DocumentStore};

/// Non-persistent document store.
///
/// Revision checks run under the map's shard lock, so a compare-and-swap
/// never interleaves with another write to the same document.
pub struct MemoryDocumentStore<D: Document> {
    docs: DashMap<String, D>,
}

impl<D: Document> MemoryDocumentStore<D> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            docs: DashMap::new(),
        }
    }
}

impl<D: Document> Default for MemoryDocumentStore<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Document> fmt::Debug for MemoryDocumentStore<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryDocumentStore")
            .field("collection", &D::COLLECTION)
            .field("documents", &self.docs.len())
            .finish()
    }
}

#[async_trait]
impl<D: Document> DocumentStore<D> for MemoryDocumentStore<D> {
    fn store_type(&self) -> &str {
        "memory"
    }

    async fn create(&self, doc: &D) -> AppResult<D> {
        let key = doc.id().to_string();
        match self.docs.entry(key) {
            Entry::Occupied(entry) => Err(AppError::conflict(format!(
                "Document {}/{} already exists",
                D::COLLECTION,
                entry.key()
            ))),
            Entry::Vacant(entry) => {
                let mut created = doc.clone();
                created.set_revision(1);
                entry.insert(created.clone());
                Ok(created)
            }
        }
    }

    async fn find_by_id(&self, id: &D::Id) -> AppResult<Option<D>> {
        Ok(self
            .docs
            .get(&id.to_string())
            .map(|entry| entry.value().clone()))
    }

    async fn update(&self, doc: &D) -> AppResult<D> {
        let key = doc.id().to_string();
        let mut entry = self.docs.get_mut(&key).ok_or_else(|| {
            AppError::not_found(format!("Document {}/{key} not found", D::COLLECTION))
        })?;

        let stored = entry.value().revision();
        if stored != doc.revision() {
            return Err(AppError::conflict(format!(
                "Stale revision for {}/{key}: stored {stored}, given {}",
                D::COLLECTION,
                doc.revision()
            )));
        }

        let mut next = doc.clone();
        next.set_revision(stored + 1);
        *entry.value_mut() = next.clone();
        Ok(next)
    }

    async fn delete(&self, id: &D::Id) -> AppResult<bool> {
        Ok(self.docs.remove(&id.to_string()).is_some())
    }

    async fn list(&self) -> AppResult<Vec<D>> {
        Ok(self.docs.iter().map(|entry| entry.value().clone()).collect())
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.docs.len() as u64)
    }
}
