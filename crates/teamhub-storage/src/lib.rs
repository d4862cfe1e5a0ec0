//! # teamhub-storage
//!
//! Storage provider implementations for TeamHub (local filesystem and
//! in-memory) plus the layout manager that decides where active and
//! archived objects live.

pub mod layout;
pub mod providers;
pub mod validation;

pub use layout::StorageLayout;
#[cfg(feature = "local")]
pub use providers::LocalStorageProvider;
pub use providers::MemoryStorageProvider;
