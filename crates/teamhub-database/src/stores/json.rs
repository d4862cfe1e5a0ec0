//! Directory-backed JSON document store.
//!
//! Each document is a file at `{root}/{collection}/{id}.json`. Writes go to
//! a temporary sibling first and are renamed into place, so readers see
//! either the old or the new document and never a torn one.

use std::fmt;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

use teamhub_core::error::{AppError, ErrorKind};
use teamhub_core::result::AppResult;
use teamhub_core::sync::KeyedMutex;
use teamhub_core::traits::document::{Document, DocumentStore};

const EXTENSION: &str = "json";

/// Document store persisting one JSON file per document.
pub struct JsonDocumentStore<D: Document> {
    dir: PathBuf,
    locks: KeyedMutex<String>,
    _marker: PhantomData<fn() -> D>,
}

impl<D: Document> JsonDocumentStore<D> {
    /// Open (creating if needed) the collection directory under `root`.
    pub async fn open(root: impl AsRef<Path>) -> AppResult<Self> {
        let dir = root.as_ref().join(D::COLLECTION);
        fs::create_dir_all(&dir).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Metadata,
                format!("Failed to create document directory: {}", dir.display()),
                e,
            )
        })?;

        Ok(Self {
            dir,
            locks: KeyedMutex::new(),
            _marker: PhantomData,
        })
    }

    fn doc_path(&self, key: &str) -> AppResult<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(AppError::validation(format!("Invalid document id: {key}")));
        }
        Ok(self.dir.join(format!("{key}.{EXTENSION}")))
    }

    async fn read_doc(&self, path: &Path) -> AppResult<Option<D>> {
        let raw = match fs::read(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AppError::with_source(
                    ErrorKind::Metadata,
                    format!("Failed to read document: {}", path.display()),
                    e,
                ));
            }
        };
        let doc = serde_json::from_slice(&raw).map_err(|e| {
            AppError::with_source(
                ErrorKind::Metadata,
                format!("Corrupt document: {}", path.display()),
                e,
            )
        })?;
        Ok(Some(doc))
    }

    async fn write_doc(&self, path: &Path, doc: &D) -> AppResult<()> {
        let body = serde_json::to_vec_pretty(doc)?;
        let tmp = path.with_extension(format!("{EXTENSION}.tmp-{}", Uuid::new_v4().simple()));

        let result = async {
            let mut file = fs::File::create(&tmp).await?;
            file.write_all(&body).await?;
            file.sync_all().await?;
            fs::rename(&tmp, path).await
        }
        .await;

        if let Err(e) = result {
            let _ = fs::remove_file(&tmp).await;
            return Err(AppError::with_source(
                ErrorKind::Metadata,
                format!("Failed to write document: {}", path.display()),
                e,
            ));
        }
        Ok(())
    }
}

impl<D: Document> fmt::Debug for JsonDocumentStore<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonDocumentStore")
            .field("dir", &self.dir)
            .finish()
    }
}

#[async_trait]
impl<D: Document> DocumentStore<D> for JsonDocumentStore<D> {
    fn store_type(&self) -> &str {
        "json"
    }

    async fn create(&self, doc: &D) -> AppResult<D> {
        let key = doc.id().to_string();
        let path = self.doc_path(&key)?;
        let _guard = self.locks.lock(key.clone()).await;

        let exists = fs::try_exists(&path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Metadata,
                format!("Failed to check document: {}", path.display()),
                e,
            )
        })?;
        if exists {
            return Err(AppError::conflict(format!(
                "Document {}/{key} already exists",
                D::COLLECTION
            )));
        }

        let mut created = doc.clone();
        created.set_revision(1);
        self.write_doc(&path, &created).await?;

        debug!(collection = D::COLLECTION, id = %key, "Document created");
        Ok(created)
    }

    async fn find_by_id(&self, id: &D::Id) -> AppResult<Option<D>> {
        let path = self.doc_path(&id.to_string())?;
        self.read_doc(&path).await
    }

    async fn update(&self, doc: &D) -> AppResult<D> {
        let key = doc.id().to_string();
        let path = self.doc_path(&key)?;
        let _guard = self.locks.lock(key.clone()).await;

        let stored = self.read_doc(&path).await?.ok_or_else(|| {
            AppError::not_found(format!("Document {}/{key} not found", D::COLLECTION))
        })?;
        if stored.revision() != doc.revision() {
            return Err(AppError::conflict(format!(
                "Stale revision for {}/{key}: stored {}, given {}",
                D::COLLECTION,
                stored.revision(),
                doc.revision()
            )));
        }

        let mut next = doc.clone();
        next.set_revision(stored.revision() + 1);
        self.write_doc(&path, &next).await?;

        debug!(collection = D::COLLECTION, id = %key, revision = next.revision(), "Document updated");
        Ok(next)
    }

    async fn delete(&self, id: &D::Id) -> AppResult<bool> {
        let key = id.to_string();
        let path = self.doc_path(&key)?;
        let _guard = self.locks.lock(key).await;

        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Metadata,
                format!("Failed to delete document: {}", path.display()),
                e,
            )),
        }
    }

    async fn list(&self) -> AppResult<Vec<D>> {
        let mut dir = fs::read_dir(&self.dir).await.map_err(|e| {
            AppError::with_source(ErrorKind::Metadata, "Failed to list documents", e)
        })?;

        let mut docs = Vec::new();
        while let Some(entry) = dir.next_entry().await.map_err(|e| {
            AppError::with_source(ErrorKind::Metadata, "Failed to read directory entry", e)
        })? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            match self.read_doc(&path).await {
                Ok(Some(doc)) => docs.push(doc),
                // Deleted between listing and reading.
                Ok(None) => {}
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable document"),
            }
        }
        Ok(docs)
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.list().await?.len() as u64)
    }
}
