//! File domain entities.

pub mod model;
pub mod upload;
pub mod version;

pub use model::{ActiveContent, FileRecord};
pub use upload::NewFile;
pub use version::{VersionEntry, VersionOrderError};
