//! Baseline
//!
//! The trusted reference snapshot: for every protected path, the content
//! digest and permission mode measured when the baseline was built.

pub mod persistence;

pub use persistence::JsonBaselineStore;

use crate::error::StorageError;
use crate::scan::{self, Walker};
use crate::types::{ContentDigest, PermissionMode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Trusted state of one path at baseline time
///
/// Either field may be absent: a file that could be stat'ed but not read
/// still gets its mode recorded, and vice versa.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintEntry {
    pub path: PathBuf,
    pub content_digest: Option<ContentDigest>,
    pub permission_mode: Option<PermissionMode>,
}

impl FingerprintEntry {
    /// Measure a single path. Returns `None` when neither attribute could be
    /// obtained.
    pub fn measure(path: &Path) -> Option<Self> {
        let content_digest = match scan::content_digest(path) {
            Ok(digest) => Some(digest),
            Err(e) => {
                warn!(path = %e.path().display(), error = %e, "Could not digest file, omitting checksum");
                None
            }
        };
        let permission_mode = match scan::permission_mode(path) {
            Ok(mode) => Some(mode),
            Err(e) => {
                warn!(path = %e.path().display(), error = %e, "Could not stat file, omitting permissions");
                None
            }
        };

        if content_digest.is_none() && permission_mode.is_none() {
            return None;
        }

        Some(Self {
            path: path.to_path_buf(),
            content_digest,
            permission_mode,
        })
    }
}

/// Full reference state, keyed and iterated by path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Baseline {
    entries: BTreeMap<PathBuf, FingerprintEntry>,
}

/// Entry counts for logs and CLI output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BaselineSummary {
    pub entries: usize,
    pub checksums: usize,
    pub permissions: usize,
}

impl Baseline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fresh baseline over the expansion of `roots`.
    ///
    /// Per-path failures are logged and never abort the build. An empty root
    /// list yields an empty baseline.
    pub fn build(roots: &[PathBuf]) -> Self {
        Self::build_with(&Walker::new(roots.to_vec()))
    }

    /// Build with a preconfigured walker
    pub fn build_with(walker: &Walker) -> Self {
        let mut baseline = Baseline::new();
        for path in walker.expand() {
            // Baseline keys are JSON strings; a lossy key would never match again.
            if path.to_str().is_none() {
                warn!(path = %path.display(), "Skipping path that is not valid UTF-8");
                continue;
            }
            match FingerprintEntry::measure(&path) {
                Some(entry) => baseline.insert(entry),
                None => debug!(path = %path.display(), "Path left out of baseline"),
            }
        }

        let summary = baseline.summary();
        info!(
            entries = summary.entries,
            checksums = summary.checksums,
            permissions = summary.permissions,
            "Baseline built"
        );
        baseline
    }

    pub fn insert(&mut self, entry: FingerprintEntry) {
        self.entries.insert(entry.path.clone(), entry);
    }

    pub fn get(&self, path: &Path) -> Option<&FingerprintEntry> {
        self.entries.get(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key order
    pub fn entries(&self) -> impl Iterator<Item = &FingerprintEntry> {
        self.entries.values()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.entries.keys().map(PathBuf::as_path)
    }

    pub fn summary(&self) -> BaselineSummary {
        BaselineSummary {
            entries: self.entries.len(),
            checksums: self
                .entries
                .values()
                .filter(|e| e.content_digest.is_some())
                .count(),
            permissions: self
                .entries
                .values()
                .filter(|e| e.permission_mode.is_some())
                .count(),
        }
    }
}

impl FromIterator<FingerprintEntry> for Baseline {
    fn from_iter<I: IntoIterator<Item = FingerprintEntry>>(iter: I) -> Self {
        let mut baseline = Baseline::new();
        for entry in iter {
            baseline.insert(entry);
        }
        baseline
    }
}

/// Baseline store interface
pub trait BaselineStore: Send + Sync {
    /// Write the baseline durably, replacing any previous one atomically
    fn persist(&self, baseline: &Baseline) -> Result<(), StorageError>;

    /// Read the most recently persisted baseline
    fn load(&self) -> Result<Baseline, StorageError>;
}
