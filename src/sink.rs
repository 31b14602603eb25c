//! Alert Sink
//!
//! Where alerts leave the core. The console sink prints them; the memory
//! sink collects them for an embedding reporter (and for tests).

use crate::error::MonitorError;
use crate::reconcile::{Alert, AlertKind};
use chrono::{SecondsFormat, Utc};
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::io::Write;
use tracing::{debug, warn};

/// Receives the alerts of each completed reconciliation tick.
///
/// Called once per tick, after the pass completes, with alerts in baseline
/// order. Implementations must be safe to share across threads.
pub trait AlertSink: Send + Sync {
    fn deliver(&self, alerts: &[Alert]) -> Result<(), MonitorError>;
}

/// Report envelope handed to the reporting channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityReport {
    /// RFC 3339 UTC timestamp of the reconciliation
    pub timestamp: String,
    pub integrity_alerts: Vec<Alert>,
}

impl IntegrityReport {
    pub fn new(alerts: Vec<Alert>) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            integrity_alerts: alerts,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.integrity_alerts.is_empty()
    }
}

/// Console output style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleFormat {
    /// `[ALERT] checksum /etc/hosts: Content modified`
    Text { color: bool },
    /// One JSON object per alert per line
    JsonLines,
}

/// Prints alerts to stdout and mirrors them into the log
pub struct ConsoleSink {
    format: ConsoleFormat,
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleSink {
    pub fn new(format: ConsoleFormat) -> Self {
        Self::with_writer(format, Box::new(std::io::stdout()))
    }

    pub fn with_writer(format: ConsoleFormat, out: Box<dyn Write + Send>) -> Self {
        Self {
            format,
            out: Mutex::new(out),
        }
    }
}

/// Render one alert as a text line
pub fn format_alert_line(alert: &Alert, color: bool) -> String {
    let kind = alert.kind.as_str();
    let kind = if color {
        match alert.kind {
            AlertKind::Missing | AlertKind::Unreadable => kind.red().to_string(),
            AlertKind::Checksum | AlertKind::Permissions => kind.yellow().to_string(),
        }
    } else {
        kind.to_string()
    };
    format!(
        "[ALERT] {} {}: {}",
        kind,
        alert.path.display(),
        alert.message
    )
}

impl AlertSink for ConsoleSink {
    fn deliver(&self, alerts: &[Alert]) -> Result<(), MonitorError> {
        if alerts.is_empty() {
            debug!("No drift");
            return Ok(());
        }

        let mut out = self.out.lock();
        for alert in alerts {
            warn!(
                kind = %alert.kind,
                path = %alert.path.display(),
                reference = alert.reference.as_deref().unwrap_or(""),
                observed = alert.observed.as_deref().unwrap_or(""),
                "{}",
                alert.message
            );
            let line = match self.format {
                ConsoleFormat::Text { color } => format_alert_line(alert, color),
                ConsoleFormat::JsonLines => serde_json::to_string(alert)?,
            };
            writeln!(out, "{}", line).map_err(|e| MonitorError::OutputError(e.to_string()))?;
        }
        out.flush()
            .map_err(|e| MonitorError::OutputError(e.to_string()))
    }
}

/// Collects delivered alerts, one batch per tick
#[derive(Debug, Default)]
pub struct MemorySink {
    batches: Mutex<Vec<Vec<Alert>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Batches delivered so far, oldest first
    pub fn batches(&self) -> Vec<Vec<Alert>> {
        self.batches.lock().clone()
    }

    /// Remove and return every batch delivered so far
    pub fn drain(&self) -> Vec<Vec<Alert>> {
        std::mem::take(&mut *self.batches.lock())
    }

    pub fn tick_count(&self) -> usize {
        self.batches.lock().len()
    }
}

impl AlertSink for MemorySink {
    fn deliver(&self, alerts: &[Alert]) -> Result<(), MonitorError> {
        self.batches.lock().push(alerts.to_vec());
        Ok(())
    }
}
