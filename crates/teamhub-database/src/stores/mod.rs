//! Document store implementations.

pub mod json;
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use json::JsonDocumentStore;
pub use memory::MemoryDocumentStore;
#[cfg(feature = "postgres")]
pub use postgres::PgDocumentStore;
