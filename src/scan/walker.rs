//! Path expansion: configured roots to a flat set of regular files

use crate::scan::path::normalize_root;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Expands configured roots into the concrete files to protect
pub struct Walker {
    roots: Vec<PathBuf>,
}

impl Walker {
    /// Create a walker over the given roots
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// Expand every root.
    ///
    /// Regular-file roots are kept as is; directory roots contribute every
    /// regular file beneath them. Symlinks below a directory and special
    /// files are skipped. Roots that do not exist are logged and skipped.
    /// The result is deduplicated and sorted.
    pub fn expand(&self) -> Vec<PathBuf> {
        let mut files = BTreeSet::new();

        for root in &self.roots {
            let root = match normalize_root(root) {
                Ok(root) => root,
                Err(e) => {
                    warn!(root = %root.display(), error = %e, "Skipping configured path");
                    continue;
                }
            };

            let metadata = match std::fs::metadata(&root) {
                Ok(metadata) => metadata,
                Err(e) => {
                    warn!(root = %root.display(), error = %e, "Skipping configured path");
                    continue;
                }
            };

            if metadata.is_file() {
                files.insert(root);
            } else if metadata.is_dir() {
                self.walk_directory(&root, &mut files);
            } else {
                debug!(root = %root.display(), "Skipping special file");
            }
        }

        files.into_iter().collect()
    }

    fn walk_directory(&self, root: &PathBuf, files: &mut BTreeSet<PathBuf>) {
        let walker = WalkDir::new(root).follow_links(false).sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(root = %root.display(), error = %e, "Failed to walk directory entry");
                    continue;
                }
            };

            if entry.file_type().is_file() {
                files.insert(entry.into_path());
            } else if entry.path_is_symlink() {
                debug!(path = %entry.path().display(), "Skipping symlink");
            }
        }
    }
}

/// Convenience wrapper: expand roots with default settings
pub fn expand_paths(roots: &[PathBuf]) -> Vec<PathBuf> {
    Walker::new(roots.to_vec()).expand()
}
