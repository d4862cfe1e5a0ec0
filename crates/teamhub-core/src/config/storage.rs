//! Storage provider and layout configuration.

use serde::{Deserialize, Serialize};

/// File storage configuration.
///
/// The active root and the archive root are relative to the backend root
/// (`data_root` for the local provider). The archive root may live inside
/// the active root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage provider to use: `"local"` or `"memory"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Root directory of the local provider.
    #[serde(default = "default_data_root")]
    pub data_root: String,
    /// Location of currently active file content.
    #[serde(default = "default_active_root")]
    pub active_root: String,
    /// Location of archived version snapshots.
    #[serde(default = "default_archive_root")]
    pub archive_root: String,
    /// Remove archived version objects when their file is deleted.
    #[serde(default)]
    pub cascade_delete_versions: bool,
    /// Maximum accepted upload size in bytes (default 5 MiB).
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
    /// MIME types accepted by the upload receiver.
    #[serde(default = "default_allowed_mime_types")]
    pub allowed_mime_types: Vec<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            data_root: default_data_root(),
            active_root: default_active_root(),
            archive_root: default_archive_root(),
            cascade_delete_versions: false,
            max_upload_size_bytes: default_max_upload(),
            allowed_mime_types: default_allowed_mime_types(),
        }
    }
}

fn default_provider() -> String {
    "local".to_string()
}

fn default_data_root() -> String {
    "./data".to_string()
}

fn default_active_root() -> String {
    "files".to_string()
}

fn default_archive_root() -> String {
    "files/versions".to_string()
}

fn default_max_upload() -> u64 {
    5_242_880 // 5 MiB
}

fn default_allowed_mime_types() -> Vec<String> {
    ["image/jpeg", "image/png", "application/pdf", "text/plain"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
