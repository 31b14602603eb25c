//! CLI route: single route table and run context.

use crate::baseline::{BaselineStore, JsonBaselineStore};
use crate::config::{ConfigLoader, ShieldConfig};
use crate::error::MonitorError;
use crate::monitor::{shutdown_channel, IntegrityMonitor};
use crate::sink::{ConsoleFormat, ConsoleSink, IntegrityReport, MemorySink};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::cli::parse::{Commands, OutputFormat};
use crate::cli::presentation::{format_baseline, format_baseline_summary, format_report};

/// Printed output plus the process exit status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub output: String,
    pub exit_code: i32,
}

impl CommandOutcome {
    fn ok(output: String) -> Self {
        Self {
            output,
            exit_code: 0,
        }
    }
}

/// Runtime context for CLI execution: workspace, validated config, and the
/// baseline store. Built with ConfigLoader only.
pub struct RunContext {
    workspace_root: PathBuf,
    config: ShieldConfig,
    store: Arc<JsonBaselineStore>,
}

impl RunContext {
    /// Load and validate configuration. Any failure here is fatal.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, MonitorError> {
        let config = match config_path {
            Some(ref cfg_path) => ConfigLoader::load_from_file(cfg_path).map_err(|e| {
                MonitorError::ConfigError(format!("{}: {}", cfg_path.display(), e))
            })?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        Self::from_config(workspace_root, config)
    }

    /// Build a context from an already-parsed configuration
    pub fn from_config(workspace_root: PathBuf, config: ShieldConfig) -> Result<Self, MonitorError> {
        config.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            MonitorError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })?;

        let baseline_path = config.storage.resolve_baseline_path(&workspace_root);
        Ok(Self {
            workspace_root,
            config,
            store: Arc::new(JsonBaselineStore::new(baseline_path)),
        })
    }

    pub fn config(&self) -> &ShieldConfig {
        &self.config
    }

    /// Execute a CLI command via the route table.
    pub fn execute(&self, command: &Commands) -> Result<CommandOutcome, MonitorError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| MonitorError::TaskFailed(format!("Failed to start runtime: {}", e)))?;

        match command {
            Commands::Baseline => runtime.block_on(self.handle_baseline()),
            Commands::Check {
                format,
                fail_on_alert,
            } => runtime.block_on(self.handle_check(*format, *fail_on_alert)),
            Commands::Watch { interval, json } => {
                runtime.block_on(self.handle_watch(*interval, *json))
            }
            Commands::Show { format } => self.handle_show(*format),
        }
    }

    fn monitor(&self, sink: Arc<dyn crate::sink::AlertSink>) -> IntegrityMonitor {
        IntegrityMonitor::new(
            self.config.monitor_config(&self.workspace_root),
            Arc::clone(&self.store) as Arc<dyn BaselineStore>,
            sink,
        )
    }

    async fn handle_baseline(&self) -> Result<CommandOutcome, MonitorError> {
        let monitor = self.monitor(Arc::new(MemorySink::new()));
        let summary = monitor.initialize().await?;
        Ok(CommandOutcome::ok(format_baseline_summary(
            &summary,
            self.store.path(),
        )))
    }

    async fn handle_check(
        &self,
        format: OutputFormat,
        fail_on_alert: bool,
    ) -> Result<CommandOutcome, MonitorError> {
        let monitor = self.monitor(Arc::new(MemorySink::new()));
        let alerts = monitor.check_once().await?;
        let report = IntegrityReport::new(alerts);
        let exit_code = if fail_on_alert && !report.is_clean() { 1 } else { 0 };
        Ok(CommandOutcome {
            output: format_report(&report, format)?,
            exit_code,
        })
    }

    async fn handle_watch(
        &self,
        interval: Option<u64>,
        json: bool,
    ) -> Result<CommandOutcome, MonitorError> {
        let format = if json {
            ConsoleFormat::JsonLines
        } else {
            ConsoleFormat::Text {
                color: std::io::stdout().is_terminal(),
            }
        };

        let mut monitor_config = self.config.monitor_config(&self.workspace_root);
        if let Some(secs) = interval {
            if secs == 0 {
                return Err(MonitorError::ConfigError(
                    "--interval must be a positive integer".to_string(),
                ));
            }
            monitor_config = monitor_config.with_poll_interval(Duration::from_secs(secs));
        }
        let monitor = IntegrityMonitor::new(
            monitor_config,
            Arc::clone(&self.store) as Arc<dyn BaselineStore>,
            Arc::new(ConsoleSink::new(format)),
        );

        let (handle, signal) = shutdown_channel();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Shutdown requested"),
                Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C, stopping"),
            }
            handle.shutdown();
        });

        monitor.run(signal).await?;
        Ok(CommandOutcome::ok("Integrity monitoring stopped.".to_string()))
    }

    fn handle_show(&self, format: OutputFormat) -> Result<CommandOutcome, MonitorError> {
        let baseline = self.store.load()?;
        Ok(CommandOutcome::ok(format_baseline(&baseline, format)?))
    }
}
