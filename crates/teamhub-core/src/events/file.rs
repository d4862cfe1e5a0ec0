//! File-related domain events.

use serde::{Deserialize, Serialize};

use crate::types::FileId;

/// The operation that ran into metadata/disk drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftOperation {
    /// Archiving the active object before a replace.
    Archive,
    /// Removing the active object on delete.
    Delete,
    /// Removing archived objects on a cascading delete.
    Purge,
}

/// Events related to file operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FileEvent {
    /// A new file was stored.
    Stored {
        /// The file ID.
        file_id: FileId,
        /// The file name.
        filename: String,
        /// The file size in bytes.
        size_bytes: u64,
    },
    /// The active content was replaced and the previous content archived.
    Replaced {
        /// The file ID.
        file_id: FileId,
        /// The version number assigned to the archived content.
        archived_version: u32,
        /// The new file name.
        filename: String,
        /// The new file size in bytes.
        size_bytes: u64,
    },
    /// An archived version was restored as the active content.
    Restored {
        /// The file ID.
        file_id: FileId,
        /// The restored version number.
        version_number: u32,
    },
    /// A file was deleted.
    Deleted {
        /// The file ID.
        file_id: FileId,
        /// The file name (for display after deletion).
        filename: String,
        /// Archived objects left behind on the backend.
        orphaned_versions: usize,
    },
    /// Metadata expected an object the backend does not have.
    DriftDetected {
        /// The file ID.
        file_id: FileId,
        /// The path the metadata points at.
        path: String,
        /// What the engine was doing when it noticed.
        operation: DriftOperation,
    },
}
