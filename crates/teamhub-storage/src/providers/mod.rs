//! Storage provider implementations.

#[cfg(feature = "local")]
pub mod local;
pub mod memory;

#[cfg(feature = "local")]
pub use local::LocalStorageProvider;
pub use memory::MemoryStorageProvider;
