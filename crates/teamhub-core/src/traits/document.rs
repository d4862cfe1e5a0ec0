//! Document store trait for metadata persistence.

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::result::AppResult;

/// A document persisted as a whole, embedded children included.
///
/// Every document carries a revision counter used for optimistic
/// concurrency: stores only accept an update whose revision matches the
/// stored one, and bump it on success.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Identifier type, rendered with `Display` as the storage key.
    type Id: fmt::Display + Clone + Send + Sync + 'static;

    /// Name of the collection holding documents of this type.
    const COLLECTION: &'static str;

    /// The document identifier.
    fn id(&self) -> Self::Id;

    /// The current revision.
    fn revision(&self) -> u64;

    /// Overwrite the revision (stores only).
    fn set_revision(&mut self, revision: u64);
}

/// Generic document store.
///
/// `update` is a compare-and-swap on [`Document::revision`]: it fails with
/// `Conflict` when the stored revision differs and with `NotFound` when the
/// document is gone.
#[async_trait]
pub trait DocumentStore<D: Document>: Send + Sync + fmt::Debug + 'static {
    /// Return the store type name (e.g., "memory", "json").
    fn store_type(&self) -> &str;

    /// Insert a new document. Fails with `Conflict` if the id is taken.
    async fn create(&self, doc: &D) -> AppResult<D>;

    /// Find a document by id.
    async fn find_by_id(&self, id: &D::Id) -> AppResult<Option<D>>;

    /// Replace a document, returning it with its new revision.
    async fn update(&self, doc: &D) -> AppResult<D>;

    /// Delete a document. Returns `true` if it existed.
    async fn delete(&self, id: &D::Id) -> AppResult<bool>;

    /// List every document in the collection.
    async fn list(&self) -> AppResult<Vec<D>>;

    /// Count documents in the collection.
    async fn count(&self) -> AppResult<u64>;
}
