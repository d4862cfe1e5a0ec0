//! # teamhub-service
//!
//! The file storage engine. It combines a storage provider, the object
//! layout, and the metadata store into the store/replace/delete/restore
//! operations, and keeps each file's version chain consistent with the
//! objects on the backend.
//!
//! Dependencies are injected at construction time as `Arc` trait objects.

pub mod file;

pub use file::{FileDownload, FileStorageEngine, MetadataManager, VersionChain};
