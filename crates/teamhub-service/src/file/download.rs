//! Download handle returned by the engine.

use std::fmt;

use bytes::{Bytes, BytesMut};
use futures::TryStreamExt;

use teamhub_core::error::{AppError, ErrorKind};
use teamhub_core::result::AppResult;
use teamhub_core::traits::storage::ByteStream;

/// An open content stream plus the metadata a client needs to serve it.
pub struct FileDownload {
    /// Suggested filename.
    pub filename: String,
    /// MIME type for the content.
    pub mime_type: String,
    /// Size recorded in the metadata.
    pub size_bytes: u64,
    /// The content.
    pub stream: ByteStream,
}

impl FileDownload {
    /// Drain the stream into memory.
    pub async fn into_bytes(self) -> AppResult<Bytes> {
        let buf = self
            .stream
            .try_fold(BytesMut::new(), |mut buf, chunk| async move {
                buf.extend_from_slice(&chunk);
                Ok(buf)
            })
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to read content", e))?;
        Ok(buf.freeze())
    }
}

impl fmt::Debug for FileDownload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileDownload")
            .field("filename", &self.filename)
            .field("mime_type", &self.mime_type)
            .field("size_bytes", &self.size_bytes)
            .finish_non_exhaustive()
    }
}
