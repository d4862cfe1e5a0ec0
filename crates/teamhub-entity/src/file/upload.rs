//! Validated upload handed to the storage engine.

use bytes::Bytes;

/// Content plus descriptive fields for a store or replace.
///
/// The upload receiver has already validated the MIME type and size;
/// the engine stores what it is given.
#[derive(Debug, Clone)]
pub struct NewFile {
    /// Display file name.
    pub filename: String,
    /// MIME type.
    pub mime_type: String,
    /// Declared content size in bytes.
    pub size_bytes: u64,
    /// The file content.
    pub content: Bytes,
}

impl NewFile {
    /// Build an upload whose size is taken from the content.
    pub fn new(
        filename: impl Into<String>,
        mime_type: impl Into<String>,
        content: impl Into<Bytes>,
    ) -> Self {
        let content = content.into();
        Self {
            filename: filename.into(),
            mime_type: mime_type.into(),
            size_bytes: content.len() as u64,
            content,
        }
    }
}
