//! File services: metadata, version chain, and the engine tying them together.

pub mod download;
pub mod engine;
pub mod metadata;
pub mod version;

pub use download::FileDownload;
pub use engine::FileStorageEngine;
pub use metadata::MetadataManager;
pub use version::VersionChain;
