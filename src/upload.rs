//! Upload receiver: validates local files before they reach the engine.

use std::path::Path;

use bytes::Bytes;

use teamhub_core::config::StorageConfig;
use teamhub_core::error::{AppError, ErrorKind};
use teamhub_core::result::AppResult;
use teamhub_entity::file::NewFile;

/// Size and MIME type limits applied to every upload.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    max_size_bytes: u64,
    allowed_mime_types: Vec<String>,
}

impl UploadPolicy {
    /// Build the policy from storage configuration.
    pub fn from_config(config: &StorageConfig) -> Self {
        Self {
            max_size_bytes: config.max_upload_size_bytes,
            allowed_mime_types: config
                .allowed_mime_types
                .iter()
                .map(|m| m.to_ascii_lowercase())
                .collect(),
        }
    }

    /// Check content against the policy and build a [`NewFile`].
    ///
    /// The MIME type is inferred from `filename` unless one is given.
    pub fn accept(
        &self,
        filename: &str,
        mime_type: Option<&str>,
        content: Bytes,
    ) -> AppResult<NewFile> {
        if filename.trim().is_empty() {
            return Err(AppError::validation("Filename must not be empty"));
        }

        let mime_type = match mime_type {
            Some(m) => m.trim().to_ascii_lowercase(),
            None => mime_guess::from_path(filename)
                .first_or_octet_stream()
                .essence_str()
                .to_string(),
        };
        if !self.allowed_mime_types.iter().any(|m| *m == mime_type) {
            return Err(AppError::validation(format!(
                "MIME type {mime_type} is not allowed"
            )));
        }

        let size = content.len() as u64;
        if size > self.max_size_bytes {
            return Err(AppError::validation(format!(
                "File is {size} bytes, larger than the {} byte limit",
                self.max_size_bytes
            )));
        }

        Ok(NewFile::new(filename, mime_type, content))
    }

    /// Read a local file and validate it.
    ///
    /// `name` overrides the filename taken from `path`. Oversized files are
    /// rejected before their content is loaded.
    pub async fn read(
        &self,
        path: &Path,
        name: Option<&str>,
        mime_type: Option<&str>,
    ) -> AppResult<NewFile> {
        let filename = match name {
            Some(n) => n.to_string(),
            None => path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("upload")
                .to_string(),
        };

        let read_error = |e: std::io::Error| {
            let kind = if e.kind() == std::io::ErrorKind::NotFound {
                ErrorKind::NotFound
            } else {
                ErrorKind::Storage
            };
            AppError::with_source(kind, format!("Failed to read {}", path.display()), e)
        };

        let size = tokio::fs::metadata(path).await.map_err(read_error)?.len();
        if size > self.max_size_bytes {
            return Err(AppError::validation(format!(
                "File is {size} bytes, larger than the {} byte limit",
                self.max_size_bytes
            )));
        }

        let content = tokio::fs::read(path).await.map_err(read_error)?;

        self.accept(&filename, mime_type, Bytes::from(content))
    }
}
