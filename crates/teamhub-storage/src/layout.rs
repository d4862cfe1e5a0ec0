//! Object layout: where active and archived content lives.
//!
//! Active objects live under `{active_root}/{file_id}/` and archived
//! snapshots under `{archive_root}/{file_id}/`. Every generated name embeds
//! a nanosecond timestamp and a process-wide sequence number, so two
//! uploads or versions sharing a filename never land on the same path.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use tokio::sync::OnceCell;
use tracing::debug;

use teamhub_core::config::StorageConfig;
use teamhub_core::error::AppError;
use teamhub_core::result::AppResult;
use teamhub_core::traits::storage::StorageProvider;
use teamhub_core::types::FileId;
use teamhub_entity::file::FileRecord;

use crate::validation::normalize_key;

/// Computes object paths and prepares the root locations.
#[derive(Debug)]
pub struct StorageLayout {
    provider: Arc<dyn StorageProvider>,
    active_root: String,
    archive_root: String,
    sequence: AtomicU64,
    prepared: OnceCell<()>,
}

impl StorageLayout {
    /// Build a layout from the configured roots.
    pub fn new(provider: Arc<dyn StorageProvider>, config: &StorageConfig) -> AppResult<Self> {
        let active_root = normalize_key(&config.active_root)?;
        let archive_root = normalize_key(&config.archive_root)?;
        if active_root == archive_root {
            return Err(AppError::configuration(
                "Active root and archive root must differ",
            ));
        }

        Ok(Self {
            provider,
            active_root,
            archive_root,
            sequence: AtomicU64::new(0),
            prepared: OnceCell::new(),
        })
    }

    /// The normalized active root.
    pub fn active_root(&self) -> &str {
        &self.active_root
    }

    /// The normalized archive root.
    pub fn archive_root(&self) -> &str {
        &self.archive_root
    }

    /// Make sure both root locations exist.
    ///
    /// Runs the backend calls once per layout; later calls return at once.
    pub async fn prepare(&self) -> AppResult<()> {
        self.prepared
            .get_or_try_init(|| async {
                self.provider.create_dir(&self.active_root).await?;
                self.provider.create_dir(&self.archive_root).await?;
                debug!(
                    active_root = %self.active_root,
                    archive_root = %self.archive_root,
                    "Storage layout prepared"
                );
                Ok::<(), AppError>(())
            })
            .await?;
        Ok(())
    }

    /// Canonical location for newly activated content of `file_id`.
    pub async fn resolve_active_path(&self, file_id: FileId, filename: &str) -> AppResult<String> {
        self.prepare().await?;
        Ok(format!(
            "{}/{}/{}-{}",
            self.active_root,
            file_id,
            self.unique_suffix(),
            sanitize_filename(filename)
        ))
    }

    /// Unique archive location for the next version of `record`.
    pub async fn resolve_archive_path(
        &self,
        record: &FileRecord,
        candidate_filename: &str,
    ) -> AppResult<String> {
        self.prepare().await?;
        Ok(format!(
            "{}/v{}-{}-{}",
            self.archive_dir(record.id),
            record.next_version_number(),
            self.unique_suffix(),
            sanitize_filename(candidate_filename)
        ))
    }

    /// Directory holding every archived object of `file_id`.
    pub fn archive_dir(&self, file_id: FileId) -> String {
        format!("{}/{}", self.archive_root, file_id)
    }

    /// Scratch sibling of `path`, used to stage content before an atomic rename.
    pub fn staging_path(&self, path: &str) -> String {
        format!("{path}.staging-{}", self.unique_suffix())
    }

    fn unique_suffix(&self) -> String {
        let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!("{nanos}-{seq}")
    }
}

/// Reduce a user-supplied filename to a single safe path component.
///
/// Keeps only the last component, replaces anything but alphanumerics,
/// `.`, `-` and `_` with `_`, and strips leading dots.
pub fn sanitize_filename(name: &str) -> String {
    let last = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = last
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}
