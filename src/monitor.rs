//! Monitor Loop
//!
//! Owns the run lifecycle: build and persist a fresh baseline, then reload it
//! and reconcile on a fixed interval until shutdown is requested.
//!
//! ```text
//! Initializing --(baseline persisted)--> Watching --(shutdown)--> Stopped
//!                                         |    ^
//!                                         +----+ every poll interval
//! ```

use crate::baseline::{Baseline, BaselineStore, BaselineSummary};
use crate::config::MonitorConfig;
use crate::error::MonitorError;
use crate::reconcile::{Alert, ReconcileOutcome, Reconciler};
use crate::scan::Walker;
use crate::sink::AlertSink;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Lifecycle state of a monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Initializing,
    Watching,
    Stopped,
}

/// Sending half of a shutdown request
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    /// Request shutdown. Idempotent.
    pub fn shutdown(&self) {
        self.tx.send_replace(true);
    }
}

/// Receiving half of a shutdown request, checked cooperatively
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    pub fn is_shutdown(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once shutdown is requested. Never resolves if every handle
    /// is dropped without requesting shutdown.
    pub async fn wait(&mut self) {
        while !*self.rx.borrow_and_update() {
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Create a connected shutdown handle and signal
pub fn shutdown_channel() -> (ShutdownHandle, ShutdownSignal) {
    let (tx, rx) = watch::channel(false);
    (ShutdownHandle { tx: Arc::new(tx) }, ShutdownSignal { rx })
}

/// Continuous integrity monitor
pub struct IntegrityMonitor {
    config: MonitorConfig,
    store: Arc<dyn BaselineStore>,
    sink: Arc<dyn AlertSink>,
    reconciler: Reconciler,
    state: Arc<RwLock<MonitorState>>,
}

impl IntegrityMonitor {
    pub fn new(
        config: MonitorConfig,
        store: Arc<dyn BaselineStore>,
        sink: Arc<dyn AlertSink>,
    ) -> Self {
        let reconciler = Reconciler::new(config.max_concurrent_digests);
        Self {
            config,
            store,
            sink,
            reconciler,
            state: Arc::new(RwLock::new(MonitorState::Initializing)),
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn state(&self) -> MonitorState {
        *self.state.read()
    }

    fn set_state(&self, state: MonitorState) {
        *self.state.write() = state;
        debug!(?state, "Monitor state changed");
    }

    /// Build a fresh baseline from the configured roots and persist it.
    ///
    /// Any previous baseline is replaced: starting a run always resets trust.
    pub async fn initialize(&self) -> Result<BaselineSummary, MonitorError> {
        let walker = Walker::new(self.config.paths.clone());
        let store = Arc::clone(&self.store);

        let summary = tokio::task::spawn_blocking(move || {
            let baseline = Baseline::build_with(&walker);
            store.persist(&baseline).map(|_| baseline.summary())
        })
        .await??;

        info!(
            entries = summary.entries,
            checksums = summary.checksums,
            permissions = summary.permissions,
            "Baseline reset"
        );
        Ok(summary)
    }

    /// Load the persisted baseline and run one reconciliation pass.
    ///
    /// This is the single entry point for callers that schedule checks
    /// themselves (e.g. a periodic report push).
    pub async fn check_once(&self) -> Result<Vec<Alert>, MonitorError> {
        let (_handle, signal) = shutdown_channel();
        match self.tick(&signal).await? {
            ReconcileOutcome::Complete(alerts) => Ok(alerts),
            ReconcileOutcome::Interrupted => Ok(Vec::new()),
        }
    }

    async fn tick(&self, shutdown: &ShutdownSignal) -> Result<ReconcileOutcome, MonitorError> {
        let store = Arc::clone(&self.store);
        let baseline = tokio::task::spawn_blocking(move || store.load()).await??;
        debug!(entries = baseline.len(), "Baseline loaded for reconciliation");
        self.reconciler
            .reconcile_concurrent(&baseline, shutdown)
            .await
    }

    /// Run until shutdown is requested.
    ///
    /// Fails only if the initial baseline cannot be built or persisted.
    /// Per-tick failures are logged and retried on the next tick.
    pub async fn run(&self, mut shutdown: ShutdownSignal) -> Result<(), MonitorError> {
        self.set_state(MonitorState::Initializing);
        if let Err(e) = self.initialize().await {
            error!(error = %e, "Failed to establish baseline");
            return Err(e);
        }

        self.set_state(MonitorState::Watching);
        info!(
            interval_secs = self.config.poll_interval.as_secs_f64(),
            roots = self.config.paths.len(),
            max_concurrent = self.reconciler.max_concurrent(),
            "Integrity monitor watching"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.config.poll_interval) => {}
                _ = shutdown.wait() => break,
            }
            if shutdown.is_shutdown() {
                break;
            }

            match self.tick(&shutdown).await {
                Ok(ReconcileOutcome::Complete(alerts)) => {
                    if !alerts.is_empty() {
                        info!(alerts = alerts.len(), "Drift detected");
                    }
                    if let Err(e) = self.sink.deliver(&alerts) {
                        warn!(error = %e, "Failed to deliver alerts");
                    }
                }
                Ok(ReconcileOutcome::Interrupted) => break,
                Err(MonitorError::StorageError(e)) if e.is_transient() => {
                    warn!(error = %e, "Baseline temporarily unavailable, retrying next tick");
                }
                Err(e) => {
                    error!(error = %e, "Reconciliation tick failed, retrying next tick");
                }
            }
        }

        self.set_state(MonitorState::Stopped);
        info!("Integrity monitor stopped");
        Ok(())
    }
}
