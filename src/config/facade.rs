//! Config loader facade: one entry point for layered and single-file loading.

use super::merge::merge_policy;
use super::sources::{environment, global_file, workspace_file};
use super::ShieldConfig;
use config::{ConfigError, File};
use std::path::Path;
use tracing::debug;

/// Loads `ShieldConfig` from its sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Layered load for a workspace.
    ///
    /// Precedence (lowest to highest): defaults, global config file,
    /// workspace `config/config.toml`, workspace `config/{SHIELD_ENV}.toml`,
    /// `SHIELD__*` environment variables.
    pub fn load(workspace_root: &Path) -> Result<ShieldConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = environment::add_to_builder(builder);

        let config: ShieldConfig = builder.build()?.try_deserialize()?;
        debug!(
            workspace = %workspace_root.display(),
            paths = config.paths.len(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Load a single explicit file. The format is inferred from the
    /// extension; a missing or malformed file is an error.
    pub fn load_from_file(path: &Path) -> Result<ShieldConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?
            .add_source(File::from(path.to_path_buf()).required(true));
        let builder = environment::add_to_builder(builder);

        builder.build()?.try_deserialize()
    }
}
