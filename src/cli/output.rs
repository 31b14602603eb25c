//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::{MonitorError, StorageError};

/// Map domain errors to a string for CLI output.
pub fn map_error(e: &MonitorError) -> String {
    match e {
        MonitorError::StorageError(StorageError::BaselineCorrupt { path, reason }) => format!(
            "Baseline at {} is corrupt ({}). Run `shield baseline` to rebuild it.",
            path.display(),
            reason
        ),
        other => other.to_string(),
    }
}
