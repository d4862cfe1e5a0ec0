//! Path validation for storage providers.
//!
//! Every object path handed to a provider is relative and normalized;
//! anything that could escape the provider root is rejected.

use std::path::{Component, Path, PathBuf};

use teamhub_core::error::AppError;
use teamhub_core::result::AppResult;

/// Validate and normalize an object path.
///
/// Rejects empty paths, absolute paths, and paths with `..`, root, or
/// prefix components. `.` components are dropped.
pub fn validate_path(path: &str) -> AppResult<PathBuf> {
    if path.is_empty() {
        return Err(AppError::validation("Object path cannot be empty"));
    }

    let raw = Path::new(path);
    if raw.is_absolute() || path.starts_with('/') {
        return Err(AppError::validation(format!(
            "Object path cannot be absolute: {path}"
        )));
    }

    let mut normalized = PathBuf::new();
    for component in raw.components() {
        match component {
            Component::Normal(name) => normalized.push(name),
            Component::CurDir => {}
            Component::ParentDir => {
                return Err(AppError::validation(format!(
                    "Object path cannot contain '..': {path}"
                )));
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(AppError::validation(format!(
                    "Object path cannot contain root or prefix: {path}"
                )));
            }
        }
    }

    if normalized.as_os_str().is_empty() {
        return Err(AppError::validation(format!(
            "Object path normalized to empty path: {path}"
        )));
    }

    Ok(normalized)
}

/// Validate a path and return its normalized `/`-separated key form.
pub fn normalize_key(path: &str) -> AppResult<String> {
    let normalized = validate_path(path)?;
    Ok(normalized.to_string_lossy().replace('\\', "/"))
}
