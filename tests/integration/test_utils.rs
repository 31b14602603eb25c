//! Shared test utilities for integration tests

use shield::baseline::{Baseline, BaselineStore, JsonBaselineStore};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// A watched directory plus a baseline store location, both under one temp dir
pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("watched")).unwrap();
        Self { dir }
    }

    pub fn watched(&self) -> PathBuf {
        self.dir.path().join("watched")
    }

    /// Write a file under the watched directory and return its canonical path
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.watched().join(name);
        std::fs::write(&path, content).unwrap();
        dunce_path(&path)
    }

    pub fn store(&self) -> JsonBaselineStore {
        JsonBaselineStore::new(self.dir.path().join("checksums.json"))
    }

    /// Build and persist a baseline over the watched directory
    pub fn baseline(&self) -> Baseline {
        let baseline = Baseline::build(&[self.watched()]);
        self.store().persist(&baseline).unwrap();
        baseline
    }
}

/// Canonical form of a path, matching the keys the path expander produces
pub fn dunce_path(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap()
}

/// Poll `condition` until it holds or `timeout` elapses
pub async fn wait_until<F: FnMut() -> bool>(timeout: Duration, mut condition: F) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
