//! Storage provider trait for pluggable file storage backends.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::result::AppResult;

/// A byte stream type used for reading file contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Trait for file storage backends.
///
/// Paths are relative, `/`-separated strings. Implementations exist for the
/// local filesystem and for memory in `teamhub-storage`; object stores can
/// be plugged in behind the same trait.
#[async_trait]
pub trait StorageProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local", "memory").
    fn provider_type(&self) -> &str;

    /// Check whether the provider is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Check whether an object exists at the given path.
    async fn exists(&self, path: &str) -> AppResult<bool>;

    /// Open an object for streaming reads.
    ///
    /// Fails with `NotFound` when no object exists at `path`.
    async fn read(&self, path: &str) -> AppResult<ByteStream>;

    /// Read an object into memory.
    async fn read_bytes(&self, path: &str) -> AppResult<Bytes>;

    /// Write bytes to the given path, replacing any existing object.
    async fn write(&self, path: &str, data: Bytes) -> AppResult<()>;

    /// Copy an object within this provider.
    async fn copy(&self, from: &str, to: &str) -> AppResult<()>;

    /// Move (rename) an object within this provider, replacing the target.
    ///
    /// Atomic where the backend supports it. Fails with `NotFound` when the
    /// source is missing.
    async fn rename(&self, from: &str, to: &str) -> AppResult<()>;

    /// Remove an object. Returns `false` if nothing existed at `path`.
    async fn delete(&self, path: &str) -> AppResult<bool>;

    /// Create a directory (and any missing parents). Idempotent.
    async fn create_dir(&self, path: &str) -> AppResult<()>;
}
