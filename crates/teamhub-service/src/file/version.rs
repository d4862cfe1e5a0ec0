//! Version chain manager: moves content between the active and archive roots.

use std::sync::Arc;

use tracing::{debug, warn};

use teamhub_core::events::{DriftOperation, EventBus, FileEvent};
use teamhub_core::result::AppResult;
use teamhub_core::traits::storage::StorageProvider;
use teamhub_core::types::FileId;
use teamhub_entity::file::{FileRecord, VersionEntry};
use teamhub_storage::StorageLayout;

/// Archives active content and maintains a record's version list.
#[derive(Debug, Clone)]
pub struct VersionChain {
    provider: Arc<dyn StorageProvider>,
    layout: Arc<StorageLayout>,
    events: EventBus,
}

impl VersionChain {
    /// Creates a new version chain manager.
    pub fn new(
        provider: Arc<dyn StorageProvider>,
        layout: Arc<StorageLayout>,
        events: EventBus,
    ) -> Self {
        Self {
            provider,
            layout,
            events,
        }
    }

    /// Archive the record's active content as its next version.
    ///
    /// The active object is copied to a fresh archive path and the new entry
    /// is appended to `record` in memory; the caller persists it and then
    /// retires the old active object. When the active object is already
    /// missing, the copy is skipped with a drift warning and the entry is
    /// still appended.
    pub async fn archive_current(&self, record: &mut FileRecord) -> AppResult<VersionEntry> {
        let active = record.active_content();
        let archive_path = self
            .layout
            .resolve_archive_path(record, &active.filename)
            .await?;
        let entry = VersionEntry::archive_of(record.next_version_number(), &active, archive_path);

        if self.provider.exists(&active.storage_path).await? {
            match self
                .provider
                .copy(&active.storage_path, &entry.storage_path)
                .await
            {
                Ok(()) => {}
                // Vanished between the check and the copy.
                Err(e) if e.is_not_found() => {
                    self.drift(record.id, &active.storage_path, DriftOperation::Archive)
                }
                Err(e) => return Err(e),
            }
        } else {
            self.drift(record.id, &active.storage_path, DriftOperation::Archive);
        }

        record.append_version(entry.clone())?;
        debug!(
            file_id = %record.id,
            version = entry.version_number,
            path = %entry.storage_path,
            "Active content archived"
        );
        Ok(entry)
    }

    /// The record's versions in ascending version-number order.
    pub fn list_versions(&self, record: &FileRecord) -> Vec<VersionEntry> {
        record.versions().to_vec()
    }

    /// Remove the archive copy made for `entry`.
    ///
    /// Undoes [`archive_current`](Self::archive_current) when a later step
    /// fails. Nothing to remove (a skipped archive) is not an error.
    pub async fn discard_archive(&self, entry: &VersionEntry) -> AppResult<()> {
        self.provider.delete(&entry.storage_path).await.map(|_| ())
    }

    /// Remove the object a record pointed at before its archive was committed.
    pub async fn retire_active(&self, file_id: FileId, path: &str) {
        if let Err(e) = self.provider.delete(path).await {
            warn!(
                file_id = %file_id,
                path,
                error = %e,
                "Failed to remove superseded active object"
            );
        }
    }

    /// Remove every archived object of `record`. Returns how many were removed.
    ///
    /// Failures are logged and skipped.
    pub async fn purge(&self, record: &FileRecord) -> usize {
        let mut removed = 0;
        for entry in record.versions() {
            match self.provider.delete(&entry.storage_path).await {
                Ok(true) => removed += 1,
                Ok(false) => self.drift(record.id, &entry.storage_path, DriftOperation::Purge),
                Err(e) => warn!(
                    file_id = %record.id,
                    version = entry.version_number,
                    error = %e,
                    "Failed to purge archived version"
                ),
            }
        }
        removed
    }

    /// Report metadata pointing at an object the backend does not have.
    pub(crate) fn drift(&self, file_id: FileId, path: &str, operation: DriftOperation) {
        warn!(
            file_id = %file_id,
            path,
            operation = ?operation,
            "Stored object missing; continuing without it"
        );
        self.events.publish(FileEvent::DriftDetected {
            file_id,
            path: path.to_string(),
            operation,
        });
    }
}
