//! Root path normalization

use crate::error::StorageError;
use std::path::{Path, PathBuf};

/// Normalize a configured root into an absolute path.
///
/// Uses dunce for cross-platform canonicalization, so `..`, `.` and a
/// symlinked root are resolved. Fails when the root does not exist.
pub fn normalize_root(path: &Path) -> Result<PathBuf, StorageError> {
    dunce::canonicalize(path).map_err(|e| {
        StorageError::InvalidPath(format!("Failed to canonicalize {}: {}", path.display(), e))
    })
}

/// Resolve a possibly relative path against a base directory without
/// touching the filesystem.
pub fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
