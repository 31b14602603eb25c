//! Shield: Host Integrity Monitoring
//!
//! Records a trusted baseline of file content digests and permission modes
//! for a configured set of paths, then periodically re-measures them and
//! reports content changes, permission changes and disappearances as
//! structured alerts.

pub mod baseline;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod monitor;
pub mod reconcile;
pub mod scan;
pub mod sink;
pub mod types;

pub use baseline::{Baseline, BaselineStore, FingerprintEntry, JsonBaselineStore};
pub use config::{MonitorConfig, ShieldConfig};
pub use monitor::{shutdown_channel, IntegrityMonitor, MonitorState, ShutdownHandle, ShutdownSignal};
pub use reconcile::{Alert, AlertKind, Reconciler};
pub use sink::{AlertSink, IntegrityReport};
