//! Environment source: `SHIELD__POLL_INTERVAL_SECONDS=30`, `SHIELD__PATHS=/etc,/srv`,
//! `SHIELD__STORAGE__BASELINE_PATH=...`.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::Environment;

/// Add the `SHIELD__` environment source to builder.
pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix("SHIELD")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("paths"),
    )
}
