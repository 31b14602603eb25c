//! JSON persistence for baselines
//!
//! On-disk shape, compatible with `checksums.json` files written by earlier
//! tooling (where `permissions` may be absent):
//!
//! ```json
//! {
//!   "checksums":   { "/etc/passwd": "<64 hex chars>" },
//!   "permissions": { "/etc/passwd": "0o644" }
//! }
//! ```
//!
//! When `permissions` is absent, a sibling `permissions_ref.json` of the form
//! `{"permissions": {...}}` is merged in if present.

use crate::baseline::{Baseline, BaselineStore, FingerprintEntry};
use crate::error::StorageError;
use crate::types::{ContentDigest, PermissionMode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Permission references written beside `checksums.json` by older tooling
const LEGACY_PERMISSIONS_FILE: &str = "permissions_ref.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct BaselineDocument {
    checksums: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    permissions: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct LegacyPermissionsDocument {
    #[serde(default)]
    permissions: BTreeMap<String, String>,
}

impl BaselineDocument {
    fn from_baseline(baseline: &Baseline) -> Result<Self, StorageError> {
        let mut checksums = BTreeMap::new();
        let mut permissions = BTreeMap::new();
        for entry in baseline.entries() {
            let key = entry
                .path
                .to_str()
                .ok_or_else(|| {
                    StorageError::InvalidPath(format!(
                        "{} is not valid UTF-8 and cannot be stored",
                        entry.path.display()
                    ))
                })?
                .to_string();
            if let Some(digest) = &entry.content_digest {
                checksums.insert(key.clone(), digest.to_hex());
            }
            if let Some(mode) = &entry.permission_mode {
                permissions.insert(key, mode.to_string());
            }
        }
        Ok(Self {
            checksums,
            permissions: Some(permissions),
        })
    }

    fn into_baseline(self, source: &Path) -> Result<Baseline, StorageError> {
        let corrupt = |reason: String| StorageError::BaselineCorrupt {
            path: source.to_path_buf(),
            reason,
        };

        let mut entries: BTreeMap<String, FingerprintEntry> = BTreeMap::new();
        for (path, hex) in self.checksums {
            let digest = ContentDigest::from_hex(&hex).map_err(corrupt)?;
            entries.insert(
                path.clone(),
                FingerprintEntry {
                    path: PathBuf::from(path),
                    content_digest: Some(digest),
                    permission_mode: None,
                },
            );
        }
        for (path, mode) in self.permissions.unwrap_or_default() {
            let mode: PermissionMode = mode.parse().map_err(corrupt)?;
            entries
                .entry(path.clone())
                .or_insert_with(|| FingerprintEntry {
                    path: PathBuf::from(path),
                    content_digest: None,
                    permission_mode: None,
                })
                .permission_mode = Some(mode);
        }

        Ok(entries.into_values().collect())
    }
}

/// Baseline store backed by a single JSON document
#[derive(Debug, Clone)]
pub struct JsonBaselineStore {
    path: PathBuf,
}

impl JsonBaselineStore {
    /// Create a store persisting to `path`
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling file that older tooling kept permission references in
    fn legacy_permissions_path(&self) -> PathBuf {
        self.path.with_file_name(LEGACY_PERMISSIONS_FILE)
    }

    fn load_legacy_permissions(&self) -> Result<Option<BTreeMap<String, String>>, StorageError> {
        let path = self.legacy_permissions_path();
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.transient(&path, e)),
        };
        let doc: LegacyPermissionsDocument =
            serde_json::from_slice(&bytes).map_err(|e| StorageError::BaselineCorrupt {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        debug!(path = %path.display(), entries = doc.permissions.len(), "Merged legacy permission references");
        Ok(Some(doc.permissions))
    }

    fn transient(&self, path: &Path, source: std::io::Error) -> StorageError {
        StorageError::Transient {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl BaselineStore for JsonBaselineStore {
    /// Write to a uniquely named temp file beside the target, fsync, then
    /// rename over the target so readers only ever see a complete document.
    fn persist(&self, baseline: &Baseline) -> Result<(), StorageError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| self.transient(&dir, e))?;

        let doc = BaselineDocument::from_baseline(baseline)?;
        let content = serde_json::to_vec_pretty(&doc).map_err(|e| StorageError::BaselineCorrupt {
            path: self.path.clone(),
            reason: format!("Failed to serialize baseline: {}", e),
        })?;

        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut temp_file = tempfile::Builder::new()
            .prefix(&format!(".{}.", file_name))
            .suffix(".tmp")
            .tempfile_in(&dir)
            .map_err(|e| self.transient(&dir, e))?;
        temp_file
            .write_all(&content)
            .and_then(|_| temp_file.as_file().sync_all())
            .map_err(|e| self.transient(temp_file.path(), e))?;

        // Dropping the temp file on any error above removes it.
        temp_file
            .persist(&self.path)
            .map_err(|e| self.transient(&self.path, e.error))?;

        debug!(path = %self.path.display(), entries = baseline.len(), "Baseline persisted");
        Ok(())
    }

    fn load(&self) -> Result<Baseline, StorageError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::BaselineNotFound(self.path.clone()));
            }
            Err(e) => return Err(self.transient(&self.path, e)),
        };

        let mut doc: BaselineDocument =
            serde_json::from_slice(&bytes).map_err(|e| StorageError::BaselineCorrupt {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        if doc.permissions.is_none() {
            doc.permissions = self.load_legacy_permissions()?;
        }

        doc.into_baseline(&self.path)
    }
}
