//! Reconciliation
//!
//! Re-measures every baseline path and reports drift as alerts. Each tick is
//! a full re-scan: cost grows with the total byte size of the monitored set,
//! so keep the set and the poll interval proportionate.

use crate::baseline::{Baseline, FingerprintEntry};
use crate::error::{DigestError, MonitorError};
use crate::monitor::ShutdownSignal;
use crate::scan;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::debug;

/// Kind of drift
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    /// The path no longer exists
    Missing,
    /// Content digest differs from the baseline
    Checksum,
    /// Permission mode differs from the baseline
    Permissions,
    /// The path exists but could not be read or stat'ed
    Unreadable,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Missing => "missing",
            AlertKind::Checksum => "checksum",
            AlertKind::Permissions => "permissions",
            AlertKind::Unreadable => "unreadable",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observation of drift for one path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    #[serde(rename = "file")]
    pub path: PathBuf,
    #[serde(rename = "msg")]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed: Option<String>,
}

impl Alert {
    fn missing(path: PathBuf) -> Self {
        Self {
            kind: AlertKind::Missing,
            path,
            message: "File missing".to_string(),
            reference: None,
            observed: None,
        }
    }

    fn unreadable(path: PathBuf, reference: Option<String>, err: &DigestError) -> Self {
        let message = match &reference {
            Some(_) => format!("Content could not be verified: {}", err),
            None => format!("Permissions could not be verified: {}", err),
        };
        Self {
            kind: AlertKind::Unreadable,
            path,
            message,
            reference,
            observed: None,
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.path.display(), self.message)
    }
}

/// Compare one baseline entry against the filesystem.
///
/// Content and permission checks are independent, so one path can yield
/// both a `checksum` and a `permissions` alert. A path that no longer
/// exists yields only `missing`.
pub fn check_entry(entry: &FingerprintEntry) -> Vec<Alert> {
    let path = &entry.path;
    let mut alerts = Vec::new();

    match scan::path_exists(path) {
        Ok(false) => return vec![Alert::missing(path.clone())],
        Ok(true) => {}
        Err(err) => {
            let reference = entry.content_digest.map(|d| d.to_hex());
            return vec![Alert::unreadable(path.clone(), reference, &err)];
        }
    }

    let mut reported_unreadable = false;
    if let Some(reference) = &entry.content_digest {
        match scan::content_digest(path) {
            Ok(observed) if observed != *reference => alerts.push(Alert {
                kind: AlertKind::Checksum,
                path: path.clone(),
                message: "Content modified".to_string(),
                reference: Some(reference.to_hex()),
                observed: Some(observed.to_hex()),
            }),
            Ok(_) => {}
            // Deleted between the existence check and the read.
            Err(DigestError::NotFound(_)) => return vec![Alert::missing(path.clone())],
            Err(err) => {
                alerts.push(Alert::unreadable(path.clone(), Some(reference.to_hex()), &err));
                reported_unreadable = true;
            }
        }
    }

    if let Some(reference) = &entry.permission_mode {
        match scan::permission_mode(path) {
            Ok(observed) if observed != *reference => alerts.push(Alert {
                kind: AlertKind::Permissions,
                path: path.clone(),
                message: format!(
                    "Permissions modified (reference: {}, observed: {})",
                    reference, observed
                ),
                reference: Some(reference.to_string()),
                observed: Some(observed.to_string()),
            }),
            Ok(_) => {}
            Err(DigestError::NotFound(_)) => return vec![Alert::missing(path.clone())],
            Err(err) if !reported_unreadable => {
                alerts.push(Alert::unreadable(path.clone(), None, &err));
            }
            Err(_) => {}
        }
    }

    alerts
}

/// Result of a reconciliation that may be interrupted by shutdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Every baseline path was checked
    Complete(Vec<Alert>),
    /// Shutdown was requested before every path was checked; no alerts are
    /// reported for a partial pass
    Interrupted,
}

/// Runs reconciliation passes over a baseline snapshot
#[derive(Debug, Clone)]
pub struct Reconciler {
    max_concurrent: usize,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Reconciler {
    /// `max_concurrent` bounds how many files are digested at once (min 1)
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            max_concurrent: max_concurrent.max(1),
        }
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Sequential pass on the calling thread. Alerts follow baseline order.
    pub fn reconcile(&self, baseline: &Baseline) -> Vec<Alert> {
        baseline.entries().flat_map(check_entry).collect()
    }

    /// Concurrent pass on blocking worker tasks.
    ///
    /// Shutdown is checked before each per-path job starts. Results are
    /// gathered by index and flattened in baseline order, so the output is
    /// identical to `reconcile` for the same filesystem state.
    pub async fn reconcile_concurrent(
        &self,
        baseline: &Baseline,
        shutdown: &ShutdownSignal,
    ) -> Result<ReconcileOutcome, MonitorError> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut jobs = JoinSet::new();

        for (index, entry) in baseline.entries().cloned().enumerate() {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| MonitorError::TaskFailed(e.to_string()))?;
            if shutdown.is_shutdown() {
                debug!(checked = index, "Reconciliation interrupted by shutdown");
                jobs.abort_all();
                return Ok(ReconcileOutcome::Interrupted);
            }
            jobs.spawn_blocking(move || {
                let alerts = check_entry(&entry);
                drop(permit);
                (index, alerts)
            });
        }

        let mut results: Vec<Option<Vec<Alert>>> = vec![None; baseline.len()];
        while let Some(joined) = jobs.join_next().await {
            let (index, alerts) = joined?;
            results[index] = Some(alerts);
        }

        Ok(ReconcileOutcome::Complete(
            results.into_iter().flatten().flatten().collect(),
        ))
    }
}
