//! File storage engine: the store, replace, delete, and restore operations.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use teamhub_core::config::StorageConfig;
use teamhub_core::error::AppError;
use teamhub_core::events::{DomainEvent, DriftOperation, EventBus, FileEvent};
use teamhub_core::result::AppResult;
use teamhub_core::sync::KeyedMutex;
use teamhub_core::traits::document::DocumentStore;
use teamhub_core::traits::storage::StorageProvider;
use teamhub_core::types::FileId;
use teamhub_entity::file::{ActiveContent, FileRecord, NewFile, VersionEntry};
use teamhub_storage::StorageLayout;

use super::download::FileDownload;
use super::metadata::MetadataManager;
use super::version::VersionChain;

/// Stores files and keeps their version chains.
///
/// Mutating operations on one file id are serialized by a per-id lock;
/// different ids never wait on each other.
#[derive(Debug)]
pub struct FileStorageEngine {
    /// Backend holding the objects.
    provider: Arc<dyn StorageProvider>,
    /// Path resolver for active and archived objects.
    layout: Arc<StorageLayout>,
    /// File record persistence.
    metadata: MetadataManager,
    /// Archive copies and version lists.
    versions: VersionChain,
    /// Per-file mutation locks.
    locks: KeyedMutex<FileId>,
    /// Domain event bus.
    events: EventBus,
    /// Whether delete also removes archived versions.
    cascade_delete_versions: bool,
}

impl FileStorageEngine {
    /// Creates a new engine over `provider` and `store`.
    pub fn new(
        provider: Arc<dyn StorageProvider>,
        store: Arc<dyn DocumentStore<FileRecord>>,
        config: &StorageConfig,
    ) -> AppResult<Self> {
        let layout = Arc::new(StorageLayout::new(Arc::clone(&provider), config)?);
        let events = EventBus::default();
        let versions =
            VersionChain::new(Arc::clone(&provider), Arc::clone(&layout), events.clone());

        Ok(Self {
            provider,
            layout,
            metadata: MetadataManager::new(store),
            versions,
            locks: KeyedMutex::new(),
            events,
            cascade_delete_versions: config.cascade_delete_versions,
        })
    }

    /// Subscribe to file events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.events.subscribe()
    }

    /// Store new content as a fresh file with an empty version chain.
    pub async fn store(&self, upload: NewFile) -> AppResult<FileRecord> {
        let id = FileId::new();
        let path = self.layout.resolve_active_path(id, &upload.filename).await?;
        if let Err(e) = self.provider.write(&path, upload.content).await {
            self.discard(&path).await;
            return Err(e);
        }

        let record = FileRecord::new(
            id,
            ActiveContent {
                filename: upload.filename,
                storage_path: path.clone(),
                mime_type: upload.mime_type,
                size_bytes: upload.size_bytes,
                upload_date: Utc::now(),
            },
        );
        let record = match self.metadata.create(&record).await {
            Ok(record) => record,
            Err(e) => {
                self.discard(&path).await;
                return Err(e);
            }
        };

        info!(
            file_id = %record.id,
            filename = %record.filename,
            size = record.size_bytes,
            "File stored"
        );
        self.events.publish(FileEvent::Stored {
            file_id: record.id,
            filename: record.filename.clone(),
            size_bytes: record.size_bytes,
        });
        Ok(record)
    }

    /// Replace a file's active content, archiving the current content first.
    ///
    /// The new object is written and the current one copied to the archive
    /// before the record changes. The superseded active object is removed
    /// only after the record points at the new one, so a failed or
    /// cancelled call leaves the record pointing at content that exists.
    pub async fn replace(&self, id: FileId, upload: NewFile) -> AppResult<FileRecord> {
        let _guard = self.locks.lock(id).await;
        let mut record = self.metadata.find(id).await?;
        let previous_path = record.storage_path.clone();

        let new_path = self.layout.resolve_active_path(id, &upload.filename).await?;
        if let Err(e) = self.provider.write(&new_path, upload.content).await {
            self.discard(&new_path).await;
            return Err(e);
        }

        let entry = match self.versions.archive_current(&mut record).await {
            Ok(entry) => entry,
            Err(e) => {
                self.discard(&new_path).await;
                return Err(e);
            }
        };

        let active = ActiveContent {
            filename: upload.filename,
            storage_path: new_path.clone(),
            mime_type: upload.mime_type,
            size_bytes: upload.size_bytes,
            upload_date: Utc::now(),
        };
        let updated = match self.metadata.update_active(&record, active).await {
            Ok(updated) => updated,
            Err(e) => {
                self.roll_back_archive(id, &entry).await;
                self.discard(&new_path).await;
                return Err(e);
            }
        };
        self.versions.retire_active(id, &previous_path).await;

        info!(
            file_id = %id,
            version = entry.version_number,
            filename = %updated.filename,
            size = updated.size_bytes,
            "File replaced"
        );
        self.events.publish(FileEvent::Replaced {
            file_id: id,
            archived_version: entry.version_number,
            filename: updated.filename.clone(),
            size_bytes: updated.size_bytes,
        });
        Ok(updated)
    }

    /// Delete a file's record and then its active object.
    ///
    /// Archived versions stay on the backend unless cascading deletes are
    /// configured. Returns the record as it was before deletion.
    pub async fn delete(&self, id: FileId) -> AppResult<FileRecord> {
        let _guard = self.locks.lock(id).await;
        let record = self.metadata.find(id).await?;

        self.metadata.delete(id).await?;
        match self.provider.delete(&record.storage_path).await {
            Ok(true) => {}
            Ok(false) => self
                .versions
                .drift(id, &record.storage_path, DriftOperation::Delete),
            Err(e) => warn!(
                file_id = %id,
                path = %record.storage_path,
                error = %e,
                "Record deleted but active object could not be removed"
            ),
        }

        let archived = record.versions().len();
        let purged = if self.cascade_delete_versions {
            self.versions.purge(&record).await
        } else {
            0
        };
        let orphaned = archived.saturating_sub(purged);

        info!(
            file_id = %id,
            versions = archived,
            purged,
            orphaned,
            "File deleted"
        );
        self.events.publish(FileEvent::Deleted {
            file_id: id,
            filename: record.filename.clone(),
            orphaned_versions: orphaned,
        });
        Ok(record)
    }

    /// A file's versions in ascending version-number order.
    pub async fn list_versions(&self, id: FileId) -> AppResult<Vec<VersionEntry>> {
        let record = self.metadata.find(id).await?;
        Ok(self.versions.list_versions(&record))
    }

    /// Put version `version_number`'s content back on the active path.
    ///
    /// The content being overwritten is not archived and the version list
    /// is unchanged. The archived object is copied, so the version stays
    /// restorable. The active metadata takes the version's filename, MIME
    /// type, and size.
    ///
    /// The copy is staged and the record updated before the staged object
    /// replaces the active one. A failed swap writes the previous active
    /// metadata back.
    pub async fn restore_version(&self, id: FileId, version_number: u32) -> AppResult<FileRecord> {
        let _guard = self.locks.lock(id).await;
        let record = self.metadata.find(id).await?;
        let entry = record.version(version_number).cloned().ok_or_else(|| {
            AppError::not_found(format!("Version {version_number} of file {id} not found"))
        })?;

        let staging = self.layout.staging_path(&record.storage_path);
        self.provider.copy(&entry.storage_path, &staging).await?;

        let previous = record.active_content();
        let active = ActiveContent {
            filename: entry.filename.clone(),
            storage_path: record.storage_path.clone(),
            mime_type: entry.mime_type.clone(),
            size_bytes: entry.size_bytes,
            upload_date: Utc::now(),
        };
        let updated = match self.metadata.update_active(&record, active).await {
            Ok(updated) => updated,
            Err(e) => {
                self.discard(&staging).await;
                return Err(e);
            }
        };

        if let Err(e) = self.provider.rename(&staging, &record.storage_path).await {
            self.discard(&staging).await;
            if let Err(undo) = self.metadata.update_active(&updated, previous).await {
                error!(
                    file_id = %id,
                    version = version_number,
                    error = %undo,
                    "Restore failed and the previous record could not be written back"
                );
            }
            return Err(e);
        }

        info!(file_id = %id, version = version_number, "Version restored");
        self.events.publish(FileEvent::Restored {
            file_id: id,
            version_number,
        });
        Ok(updated)
    }

    /// Open the active content of a file for reading.
    ///
    /// The per-id lock is held only while the stream is opened.
    pub async fn download(&self, id: FileId) -> AppResult<FileDownload> {
        let _guard = self.locks.lock(id).await;
        let record = self.metadata.find(id).await?;
        let stream = self.provider.read(&record.storage_path).await.map_err(|e| {
            if e.is_not_found() {
                AppError::not_found(format!("Content of file {id} is missing"))
            } else {
                e
            }
        })?;

        Ok(FileDownload {
            filename: record.filename,
            mime_type: record.mime_type,
            size_bytes: record.size_bytes,
            stream,
        })
    }

    /// Open an archived version of a file for reading.
    pub async fn download_version(
        &self,
        id: FileId,
        version_number: u32,
    ) -> AppResult<FileDownload> {
        let _guard = self.locks.lock(id).await;
        let record = self.metadata.find(id).await?;
        let entry = record.version(version_number).ok_or_else(|| {
            AppError::not_found(format!("Version {version_number} of file {id} not found"))
        })?;
        let stream = self.provider.read(&entry.storage_path).await.map_err(|e| {
            if e.is_not_found() {
                AppError::not_found(format!(
                    "Content of version {version_number} of file {id} is missing"
                ))
            } else {
                e
            }
        })?;

        Ok(FileDownload {
            filename: entry.filename.clone(),
            mime_type: entry.mime_type.clone(),
            size_bytes: entry.size_bytes,
            stream,
        })
    }

    /// The current record of a file.
    pub async fn get(&self, id: FileId) -> AppResult<FileRecord> {
        self.metadata.find(id).await
    }

    /// Every live file record.
    pub async fn list(&self) -> AppResult<Vec<FileRecord>> {
        self.metadata.list().await
    }

    async fn roll_back_archive(&self, id: FileId, entry: &VersionEntry) {
        if let Err(e) = self.versions.discard_archive(entry).await {
            error!(
                file_id = %id,
                version = entry.version_number,
                error = %e,
                "Failed to remove archive copy"
            );
        }
    }

    /// Best-effort removal of an object nothing points at.
    async fn discard(&self, path: &str) {
        if let Err(e) = self.provider.delete(path).await {
            warn!(path, error = %e, "Failed to remove unreferenced object");
        }
    }
}
