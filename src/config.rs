//! Configuration System
//!
//! Layered configuration: built-in defaults, the user-level config file, the
//! workspace config files, then `SHIELD__*` environment variables. The key
//! set at the top level (`paths`, `poll_interval_seconds`) matches legacy
//! `monitor_config.json` files, which load unchanged through
//! `ConfigLoader::load_from_file`.

use crate::logging::LoggingConfig;
use crate::scan::path::resolve_against;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Default seconds between the end of one reconciliation and the next
pub const DEFAULT_POLL_INTERVAL_SECONDS: u64 = 10;

/// Default number of files digested concurrently per tick
pub const DEFAULT_MAX_CONCURRENT_DIGESTS: usize = 4;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShieldConfig {
    /// Files or directories to protect
    #[serde(default)]
    pub paths: Vec<PathBuf>,

    /// Seconds between reconciliation ticks
    #[serde(default = "default_poll_interval_seconds")]
    pub poll_interval_seconds: u64,

    /// Upper bound on concurrent per-file digests
    #[serde(default = "default_max_concurrent_digests")]
    pub max_concurrent_digests: usize,

    /// Storage paths
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_poll_interval_seconds() -> u64 {
    DEFAULT_POLL_INTERVAL_SECONDS
}

fn default_max_concurrent_digests() -> usize {
    DEFAULT_MAX_CONCURRENT_DIGESTS
}

impl Default for ShieldConfig {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            poll_interval_seconds: default_poll_interval_seconds(),
            max_concurrent_digests: default_max_concurrent_digests(),
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Baseline document location, relative paths resolve against the workspace
    #[serde(default = "default_baseline_path")]
    pub baseline_path: PathBuf,
}

fn default_baseline_path() -> PathBuf {
    PathBuf::from("checksums.json")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            baseline_path: default_baseline_path(),
        }
    }
}

impl StorageConfig {
    /// Absolute baseline path for the given workspace
    pub fn resolve_baseline_path(&self, workspace_root: &Path) -> PathBuf {
        resolve_against(workspace_root, &self.baseline_path)
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Monitor(String),
    Storage(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Monitor(msg) => write!(f, "Monitor: {}", msg),
            ValidationError::Storage(msg) => write!(f, "Storage: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl ShieldConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.poll_interval_seconds == 0 {
            errors.push(ValidationError::Monitor(
                "poll_interval_seconds must be a positive integer".to_string(),
            ));
        }
        if self.max_concurrent_digests == 0 {
            errors.push(ValidationError::Monitor(
                "max_concurrent_digests must be at least 1".to_string(),
            ));
        }
        if let Some(empty) = self.paths.iter().position(|p| p.as_os_str().is_empty()) {
            errors.push(ValidationError::Monitor(format!(
                "paths[{}] is empty",
                empty
            )));
        }
        if self.storage.baseline_path.as_os_str().is_empty() {
            errors.push(ValidationError::Storage(
                "baseline_path cannot be empty".to_string(),
            ));
        }
        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Derive the immutable per-run monitor configuration.
    ///
    /// Relative roots resolve against `workspace_root`.
    pub fn monitor_config(&self, workspace_root: &Path) -> MonitorConfig {
        MonitorConfig {
            paths: self
                .paths
                .iter()
                .map(|p| resolve_against(workspace_root, p))
                .collect(),
            poll_interval: Duration::from_secs(self.poll_interval_seconds),
            max_concurrent_digests: self.max_concurrent_digests,
        }
    }
}

/// What one monitor run watches and how often. Immutable for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Ordered root paths (files or directories)
    pub paths: Vec<PathBuf>,
    /// Wait between the end of one tick and the start of the next
    pub poll_interval: Duration,
    /// Upper bound on concurrent per-file digests
    pub max_concurrent_digests: usize,
}

impl MonitorConfig {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            paths,
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECONDS),
            max_concurrent_digests: DEFAULT_MAX_CONCURRENT_DIGESTS,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}
