//! # teamhub-database
//!
//! Document store implementations behind the
//! [`DocumentStore`](teamhub_core::traits::DocumentStore) trait: in-memory,
//! one-JSON-file-per-document, and PostgreSQL JSONB (feature `postgres`).

pub mod connection;
pub mod stores;

pub use connection::open_store;
pub use stores::{JsonDocumentStore, MemoryDocumentStore};
#[cfg(feature = "postgres")]
pub use stores::PgDocumentStore;
