//! Store selection from configuration.

use std::sync::Arc;

use tracing::info;

use teamhub_core::config::DatabaseConfig;
use teamhub_core::error::AppError;
use teamhub_core::result::AppResult;
use teamhub_core::traits::document::{Document, DocumentStore};

use crate::stores::{JsonDocumentStore, MemoryDocumentStore};

/// Open the document store named by `config.provider`.
pub async fn open_store<D>(config: &DatabaseConfig) -> AppResult<Arc<dyn DocumentStore<D>>>
where
    D: Document + Unpin,
{
    let store: Arc<dyn DocumentStore<D>> = match config.provider.as_str() {
        "memory" => Arc::new(MemoryDocumentStore::new()),
        "json" => Arc::new(JsonDocumentStore::open(&config.path).await?),
        #[cfg(feature = "postgres")]
        "postgres" => Arc::new(crate::stores::PgDocumentStore::connect(config).await?),
        other => {
            return Err(AppError::configuration(format!(
                "Unknown database provider: {other}"
            )));
        }
    };

    info!(
        provider = store.store_type(),
        collection = D::COLLECTION,
        "Document store opened"
    );
    Ok(store)
}
