//! PostgreSQL document store.
//!
//! All collections share one `documents` table keyed by
//! `(collection, id)`, with the document body in a JSONB column.

use std::fmt;
use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use tracing::info;

use teamhub_core::config::DatabaseConfig;
use teamhub_core::error::{AppError, ErrorKind};
use teamhub_core::result::AppResult;
use teamhub_core::traits::document::{Document, DocumentStore};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS documents (\
     collection TEXT NOT NULL, \
     id TEXT NOT NULL, \
     revision BIGINT NOT NULL, \
     body JSONB NOT NULL, \
     PRIMARY KEY (collection, id))";

fn db_error(message: &str, e: sqlx::Error) -> AppError {
    AppError::with_source(ErrorKind::Metadata, message.to_string(), e)
}

/// Document store over a PostgreSQL pool.
pub struct PgDocumentStore<D: Document> {
    pool: PgPool,
    _marker: PhantomData<fn() -> D>,
}

impl<D: Document + Unpin> PgDocumentStore<D> {
    /// Connect using the configured URL and create the table if needed.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| AppError::configuration("database.url is required for postgres"))?;

        info!(
            max_connections = config.max_connections,
            collection = D::COLLECTION,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .connect(url)
            .await
            .map_err(|e| db_error("Failed to connect to database", e))?;

        let store = Self::from_pool(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            pool,
            _marker: PhantomData,
        }
    }

    /// Create the documents table if it does not exist.
    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to create documents table", e))?;
        Ok(())
    }

    fn to_revision(revision: u64) -> i64 {
        i64::try_from(revision).unwrap_or(i64::MAX)
    }
}

impl<D: Document> fmt::Debug for PgDocumentStore<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgDocumentStore")
            .field("collection", &D::COLLECTION)
            .finish()
    }
}

#[async_trait]
impl<D: Document + Unpin> DocumentStore<D> for PgDocumentStore<D> {
    fn store_type(&self) -> &str {
        "postgres"
    }

    async fn create(&self, doc: &D) -> AppResult<D> {
        let mut created = doc.clone();
        created.set_revision(1);

        let result = sqlx::query(
            "INSERT INTO documents (collection, id, revision, body) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (collection, id) DO NOTHING",
        )
        .bind(D::COLLECTION)
        .bind(doc.id().to_string())
        .bind(1_i64)
        .bind(Json(&created))
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to insert document", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::conflict(format!(
                "Document {}/{} already exists",
                D::COLLECTION,
                doc.id()
            )));
        }
        Ok(created)
    }

    async fn find_by_id(&self, id: &D::Id) -> AppResult<Option<D>> {
        let body = sqlx::query_scalar::<_, Json<D>>(
            "SELECT body FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(D::COLLECTION)
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find document", e))?;
        Ok(body.map(|Json(doc)| doc))
    }

    async fn update(&self, doc: &D) -> AppResult<D> {
        let mut next = doc.clone();
        next.set_revision(doc.revision() + 1);

        let result = sqlx::query(
            "UPDATE documents SET revision = $3, body = $4 \
             WHERE collection = $1 AND id = $2 AND revision = $5",
        )
        .bind(D::COLLECTION)
        .bind(doc.id().to_string())
        .bind(Self::to_revision(next.revision()))
        .bind(Json(&next))
        .bind(Self::to_revision(doc.revision()))
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to update document", e))?;

        if result.rows_affected() == 0 {
            let exists: bool = sqlx::query_scalar(
                "SELECT EXISTS (SELECT 1 FROM documents WHERE collection = $1 AND id = $2)",
            )
            .bind(D::COLLECTION)
            .bind(doc.id().to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("Failed to check document", e))?;

            return Err(if exists {
                AppError::conflict(format!(
                    "Stale revision {} for {}/{}",
                    doc.revision(),
                    D::COLLECTION,
                    doc.id()
                ))
            } else {
                AppError::not_found(format!("Document {}/{} not found", D::COLLECTION, doc.id()))
            });
        }
        Ok(next)
    }

    async fn delete(&self, id: &D::Id) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(D::COLLECTION)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to delete document", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn list(&self) -> AppResult<Vec<D>> {
        let rows = sqlx::query_scalar::<_, Json<D>>(
            "SELECT body FROM documents WHERE collection = $1 ORDER BY id",
        )
        .bind(D::COLLECTION)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list documents", e))?;
        Ok(rows.into_iter().map(|Json(doc)| doc).collect())
    }

    async fn count(&self) -> AppResult<u64> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE collection = $1")
                .bind(D::COLLECTION)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| db_error("Failed to count documents", e))?;
        Ok(total.max(0) as u64)
    }
}
