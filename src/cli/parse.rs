//! CLI parse: clap types for Shield. No behavior; definitions only.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shield CLI - Host integrity monitoring
#[derive(Parser)]
#[command(name = "shield")]
#[command(about = "Baseline file content and permissions, then watch for drift")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory (relative paths and config/ resolve here)
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, default_value = "false")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// Rendering of command output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables
    Text,
    /// Pretty-printed JSON
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build and persist a fresh baseline, replacing any existing one
    Baseline,
    /// Run one reconciliation against the persisted baseline
    Check {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Exit with status 1 when any alert is reported
        #[arg(long)]
        fail_on_alert: bool,
    },
    /// Reset the baseline, then reconcile every poll interval until Ctrl-C
    Watch {
        /// Override poll_interval_seconds from the config
        #[arg(long)]
        interval: Option<u64>,
        /// Print alerts as JSON lines instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print the persisted baseline
    Show {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}
