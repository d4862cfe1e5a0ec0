//! File version entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use teamhub_core::error::AppError;

use super::model::ActiveContent;

/// An immutable snapshot of content that used to be active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionEntry {
    /// Sequential version number, starting at 1.
    pub version_number: u32,
    /// File name at the time of archiving.
    pub filename: String,
    /// Path to this version's content in the archive.
    pub storage_path: String,
    /// MIME type of the archived content.
    pub mime_type: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// When this content originally became active.
    pub upload_date: DateTime<Utc>,
    /// When the snapshot was archived.
    pub archived_at: DateTime<Utc>,
}

impl VersionEntry {
    /// Capture `active` as version `version_number`, stored at `archive_path`.
    pub fn archive_of(version_number: u32, active: &ActiveContent, archive_path: String) -> Self {
        Self {
            version_number,
            filename: active.filename.clone(),
            storage_path: archive_path,
            mime_type: active.mime_type.clone(),
            size_bytes: active.size_bytes,
            upload_date: active.upload_date,
            archived_at: Utc::now(),
        }
    }
}

/// An append that would break the dense, increasing version sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("version chain out of order: expected version {expected}, got {actual}")]
pub struct VersionOrderError {
    /// The number the chain expected next.
    pub expected: u32,
    /// The number that was offered.
    pub actual: u32,
}

impl From<VersionOrderError> for AppError {
    fn from(err: VersionOrderError) -> Self {
        AppError::conflict(err.to_string())
    }
}
