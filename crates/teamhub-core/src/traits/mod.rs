//! Core traits defined in `teamhub-core` and implemented by other crates.

pub mod document;
pub mod storage;

pub use document::{Document, DocumentStore};
pub use storage::{ByteStream, StorageProvider};
