//! Merge rules: defaults, override order, conflict handling.

use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("paths", Vec::<String>::new())?
        .set_default(
            "poll_interval_seconds",
            crate::config::DEFAULT_POLL_INTERVAL_SECONDS,
        )?
        .set_default(
            "max_concurrent_digests",
            crate::config::DEFAULT_MAX_CONCURRENT_DIGESTS as u64,
        )?
        .set_default("storage.baseline_path", "checksums.json")
}
