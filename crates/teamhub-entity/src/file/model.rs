//! File record entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use teamhub_core::traits::Document;
use teamhub_core::types::FileId;

use super::version::{VersionEntry, VersionOrderError};

/// The content fields describing what is currently active for a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveContent {
    /// Display file name (including extension).
    pub filename: String,
    /// Path of the active object within the storage provider.
    pub storage_path: String,
    /// MIME type of the content.
    pub mime_type: String,
    /// Content size in bytes.
    pub size_bytes: u64,
    /// When this content became active.
    pub upload_date: DateTime<Utc>,
}

/// One logical file: its active content plus the chain of archived versions.
///
/// The version list is embedded in the same document and is append-only;
/// it can only grow through [`FileRecord::append_version`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    /// Unique file identifier.
    pub id: FileId,
    /// Display file name (including extension).
    pub filename: String,
    /// Path of the active object within the storage provider.
    pub storage_path: String,
    /// MIME type of the active content.
    pub mime_type: String,
    /// Active content size in bytes.
    pub size_bytes: u64,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
    /// When the active content became active.
    pub upload_date: DateTime<Utc>,
    /// Optimistic concurrency revision, bumped by the document store.
    #[serde(default)]
    pub revision: u64,
    /// Archived snapshots in version-number order.
    #[serde(default)]
    versions: Vec<VersionEntry>,
}

impl FileRecord {
    /// Build a fresh record with an empty version chain.
    pub fn new(id: FileId, active: ActiveContent) -> Self {
        let now = Utc::now();
        Self {
            id,
            filename: active.filename,
            storage_path: active.storage_path,
            mime_type: active.mime_type,
            size_bytes: active.size_bytes,
            created_at: now,
            updated_at: now,
            upload_date: active.upload_date,
            revision: 0,
            versions: Vec::new(),
        }
    }

    /// Snapshot of the active content fields.
    pub fn active_content(&self) -> ActiveContent {
        ActiveContent {
            filename: self.filename.clone(),
            storage_path: self.storage_path.clone(),
            mime_type: self.mime_type.clone(),
            size_bytes: self.size_bytes,
            upload_date: self.upload_date,
        }
    }

    /// Overwrite the active content fields and touch `updated_at`.
    pub fn set_active(&mut self, active: ActiveContent) {
        self.filename = active.filename;
        self.storage_path = active.storage_path;
        self.mime_type = active.mime_type;
        self.size_bytes = active.size_bytes;
        self.upload_date = active.upload_date;
        self.updated_at = Utc::now();
    }

    /// All archived versions, ascending by version number.
    pub fn versions(&self) -> &[VersionEntry] {
        &self.versions
    }

    /// Look up a version by number.
    pub fn version(&self, version_number: u32) -> Option<&VersionEntry> {
        // Numbers are dense and 1-based.
        let index = usize::try_from(version_number).ok()?.checked_sub(1)?;
        self.versions
            .get(index)
            .filter(|v| v.version_number == version_number)
    }

    /// The most recently archived version, if any.
    pub fn latest_version(&self) -> Option<&VersionEntry> {
        self.versions.last()
    }

    /// The number the next archived version must carry.
    pub fn next_version_number(&self) -> u32 {
        self.versions.len() as u32 + 1
    }

    /// Append an archived version.
    ///
    /// Rejects any entry whose number is not exactly the next one.
    pub fn append_version(&mut self, entry: VersionEntry) -> Result<(), VersionOrderError> {
        let expected = self.next_version_number();
        if entry.version_number != expected {
            return Err(VersionOrderError {
                expected,
                actual: entry.version_number,
            });
        }
        self.versions.push(entry);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Get the file extension (lowercase), if any.
    pub fn extension(&self) -> Option<String> {
        self.filename
            .rsplit('.')
            .next()
            .filter(|ext| *ext != self.filename)
            .map(|ext| ext.to_lowercase())
    }
}

impl Document for FileRecord {
    type Id = FileId;

    const COLLECTION: &'static str = "files";

    fn id(&self) -> FileId {
        self.id
    }

    fn revision(&self) -> u64 {
        self.revision
    }

    fn set_revision(&mut self, revision: u64) {
        self.revision = revision;
    }
}
