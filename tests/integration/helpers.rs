//! Shared test helpers for integration tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bytes::Bytes;

use teamhub_core::config::StorageConfig;
use teamhub_core::error::AppError;
use teamhub_core::events::{DomainEvent, FileEvent};
use teamhub_core::result::AppResult;
use teamhub_core::traits::document::DocumentStore;
use teamhub_core::traits::storage::{ByteStream, StorageProvider};
use teamhub_core::types::FileId;
use teamhub_database::MemoryDocumentStore;
use teamhub_entity::file::{FileRecord, NewFile};
use teamhub_service::FileStorageEngine;
use teamhub_storage::MemoryStorageProvider;

/// Engine over in-memory backends, with handles for tampering and fault injection.
pub struct TestEngine {
    pub engine: Arc<FileStorageEngine>,
    pub objects: MemoryStorageProvider,
    pub provider: Arc<FlakyProvider>,
    pub store: Arc<FlakyStore>,
}

impl TestEngine {
    pub fn new() -> Self {
        Self::with_config(&StorageConfig::default())
    }

    pub fn with_config(config: &StorageConfig) -> Self {
        let objects = MemoryStorageProvider::new();
        let provider = Arc::new(FlakyProvider::new(objects.clone()));
        let store = Arc::new(FlakyStore::default());
        let engine = FileStorageEngine::new(
            Arc::clone(&provider) as Arc<dyn StorageProvider>,
            Arc::clone(&store) as Arc<dyn DocumentStore<FileRecord>>,
            config,
        )
        .expect("engine");

        Self {
            engine: Arc::new(engine),
            objects,
            provider,
            store,
        }
    }

    /// Download a file's active content fully.
    pub async fn read(&self, id: FileId) -> AppResult<Bytes> {
        self.engine.download(id).await?.into_bytes().await
    }

    /// Download an archived version fully.
    pub async fn read_version(&self, id: FileId, version: u32) -> AppResult<Bytes> {
        self.engine
            .download_version(id, version)
            .await?
            .into_bytes()
            .await
    }

    /// Paths of all objects under the file's archive directory.
    pub fn archived_objects(&self, id: FileId) -> Vec<String> {
        self.objects.paths_with_prefix(&format!("files/versions/{id}/"))
    }
}

/// A text upload.
pub fn text(name: &str, body: &str) -> NewFile {
    NewFile::new(name, "text/plain", body.to_string())
}

/// A PDF upload of `size` bytes, all set to `fill`.
pub fn pdf(name: &str, size: usize, fill: u8) -> NewFile {
    NewFile::new(name, "application/pdf", vec![fill; size])
}

/// Drain every event currently queued on `rx`.
pub fn drain(rx: &mut tokio::sync::broadcast::Receiver<DomainEvent>) -> Vec<FileEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event.payload);
    }
    events
}

/// Memory provider with switchable write, copy, and rename failures.
///
/// A failing write leaves the first half of the data behind, like an
/// interrupted write on disk.
#[derive(Debug)]
pub struct FlakyProvider {
    inner: MemoryStorageProvider,
    fail_writes: AtomicBool,
    fail_copies: AtomicBool,
    fail_renames: AtomicBool,
}

impl FlakyProvider {
    pub fn new(inner: MemoryStorageProvider) -> Self {
        Self {
            inner,
            fail_writes: AtomicBool::new(false),
            fail_copies: AtomicBool::new(false),
            fail_renames: AtomicBool::new(false),
        }
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_copies(&self, fail: bool) {
        self.fail_copies.store(fail, Ordering::SeqCst);
    }

    pub fn fail_renames(&self, fail: bool) {
        self.fail_renames.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl StorageProvider for FlakyProvider {
    fn provider_type(&self) -> &str {
        "flaky"
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }

    async fn exists(&self, path: &str) -> AppResult<bool> {
        self.inner.exists(path).await
    }

    async fn read(&self, path: &str) -> AppResult<ByteStream> {
        self.inner.read(path).await
    }

    async fn read_bytes(&self, path: &str) -> AppResult<Bytes> {
        self.inner.read_bytes(path).await
    }

    async fn write(&self, path: &str, data: Bytes) -> AppResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            let partial = data.slice(..data.len() / 2);
            self.inner.write(path, partial).await?;
            return Err(AppError::storage(format!("Injected write failure: {path}")));
        }
        self.inner.write(path, data).await
    }

    async fn copy(&self, from: &str, to: &str) -> AppResult<()> {
        if self.fail_copies.load(Ordering::SeqCst) {
            return Err(AppError::storage(format!("Injected copy failure: {from}")));
        }
        self.inner.copy(from, to).await
    }

    async fn rename(&self, from: &str, to: &str) -> AppResult<()> {
        if self.fail_renames.load(Ordering::SeqCst) {
            return Err(AppError::storage(format!("Injected rename failure: {from}")));
        }
        self.inner.rename(from, to).await
    }

    async fn delete(&self, path: &str) -> AppResult<bool> {
        self.inner.delete(path).await
    }

    async fn create_dir(&self, path: &str) -> AppResult<()> {
        self.inner.create_dir(path).await
    }
}

/// Memory document store with switchable create, update, and delete failures.
///
/// `hang_updates` makes updates wait forever, for cancelling callers mid-call.
#[derive(Debug, Default)]
pub struct FlakyStore {
    inner: MemoryDocumentStore<FileRecord>,
    fail_creates: AtomicBool,
    fail_updates: AtomicBool,
    hang_updates: AtomicBool,
    fail_deletes: AtomicBool,
}

impl FlakyStore {
    pub fn fail_creates(&self, fail: bool) {
        self.fail_creates.store(fail, Ordering::SeqCst);
    }

    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    pub fn hang_updates(&self, hang: bool) {
        self.hang_updates.store(hang, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentStore<FileRecord> for FlakyStore {
    fn store_type(&self) -> &str {
        "flaky"
    }

    async fn create(&self, doc: &FileRecord) -> AppResult<FileRecord> {
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(AppError::metadata("Injected create failure"));
        }
        self.inner.create(doc).await
    }

    async fn find_by_id(&self, id: &FileId) -> AppResult<Option<FileRecord>> {
        self.inner.find_by_id(id).await
    }

    async fn update(&self, doc: &FileRecord) -> AppResult<FileRecord> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(AppError::metadata("Injected update failure"));
        }
        if self.hang_updates.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        self.inner.update(doc).await
    }

    async fn delete(&self, id: &FileId) -> AppResult<bool> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(AppError::metadata("Injected delete failure"));
        }
        self.inner.delete(id).await
    }

    async fn list(&self) -> AppResult<Vec<FileRecord>> {
        self.inner.list().await
    }

    async fn count(&self) -> AppResult<u64> {
        self.inner.count().await
    }
}
