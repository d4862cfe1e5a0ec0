//! Metadata manager: file records in the document store.

use std::sync::Arc;

use tracing::debug;

use teamhub_core::error::AppError;
use teamhub_core::result::AppResult;
use teamhub_core::traits::document::DocumentStore;
use teamhub_core::types::FileId;
use teamhub_entity::file::{ActiveContent, FileRecord};

/// Create, find, update, and delete [`FileRecord`]s.
///
/// The version chain is embedded in the record, so every write here
/// persists the active fields and the chain together.
#[derive(Debug, Clone)]
pub struct MetadataManager {
    store: Arc<dyn DocumentStore<FileRecord>>,
}

impl MetadataManager {
    /// Creates a new metadata manager.
    pub fn new(store: Arc<dyn DocumentStore<FileRecord>>) -> Self {
        Self { store }
    }

    /// Persist a new record.
    pub async fn create(&self, record: &FileRecord) -> AppResult<FileRecord> {
        let created = self.store.create(record).await?;
        debug!(file_id = %created.id, "File record created");
        Ok(created)
    }

    /// Load a record, failing with `NotFound` if it does not exist.
    pub async fn find(&self, id: FileId) -> AppResult<FileRecord> {
        self.store
            .find_by_id(&id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {id} not found")))
    }

    /// Point `record` at new active content and persist it.
    ///
    /// Anything else changed on `record` in memory, such as a freshly
    /// appended version, is written in the same update.
    pub async fn update_active(
        &self,
        record: &FileRecord,
        active: ActiveContent,
    ) -> AppResult<FileRecord> {
        let mut next = record.clone();
        next.set_active(active);
        let saved = self.store.update(&next).await?;
        debug!(
            file_id = %saved.id,
            revision = saved.revision,
            versions = saved.versions().len(),
            "File record updated"
        );
        Ok(saved)
    }

    /// Remove a record. Returns `false` if it was already gone.
    pub async fn delete(&self, id: FileId) -> AppResult<bool> {
        self.store.delete(&id).await
    }

    /// Every stored record, oldest first.
    pub async fn list(&self) -> AppResult<Vec<FileRecord>> {
        let mut records = self.store.list().await?;
        records.sort_by_key(|r| r.created_at);
        Ok(records)
    }
}
