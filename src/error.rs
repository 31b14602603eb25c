//! Error types for the Shield integrity monitor.

use std::path::PathBuf;
use thiserror::Error;

/// Per-path measurement errors
///
/// These never abort a baseline build or a reconciliation tick; they become
/// log entries or `unreadable` alerts.
#[derive(Debug, Error)]
pub enum DigestError {
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    #[error("Not a regular file: {0}")]
    NotRegularFile(PathBuf),

    #[error("Path unreadable: {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DigestError {
    pub(crate) fn from_io(path: &std::path::Path, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            DigestError::NotFound(path.to_path_buf())
        } else {
            DigestError::Unreadable {
                path: path.to_path_buf(),
                source: err,
            }
        }
    }

    /// The path this error concerns
    pub fn path(&self) -> &std::path::Path {
        match self {
            DigestError::NotFound(path)
            | DigestError::NotRegularFile(path)
            | DigestError::Unreadable { path, .. } => path,
        }
    }
}

/// Baseline store errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Baseline not found at {0}. Run `shield baseline` to create one.")]
    BaselineNotFound(PathBuf),

    #[error("Baseline at {path} is corrupt: {reason}")]
    BaselineCorrupt { path: PathBuf, reason: String },

    #[error("Baseline I/O error on {path}: {source}")]
    Transient {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

impl StorageError {
    /// Whether the next tick is expected to succeed without operator action
    pub fn is_transient(&self) -> bool {
        matches!(self, StorageError::Transient { .. })
    }
}

/// Top-level monitor errors
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Logging error: {0}")]
    LoggingError(String),

    #[error("Worker task failed: {0}")]
    TaskFailed(String),

    #[error("Output error: {0}")]
    OutputError(String),
}

impl From<config::ConfigError> for MonitorError {
    fn from(err: config::ConfigError) -> Self {
        MonitorError::ConfigError(err.to_string())
    }
}

impl From<tokio::task::JoinError> for MonitorError {
    fn from(err: tokio::task::JoinError) -> Self {
        MonitorError::TaskFailed(err.to_string())
    }
}

impl From<serde_json::Error> for MonitorError {
    fn from(err: serde_json::Error) -> Self {
        MonitorError::OutputError(err.to_string())
    }
}
