//! # teamhub-core
//!
//! Core crate for TeamHub file storage. Contains the storage and document
//! store traits, configuration schemas, typed identifiers, domain events,
//! the keyed mutex, and the unified error system.
//!
//! This crate has **no** internal dependencies on other TeamHub crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod sync;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
