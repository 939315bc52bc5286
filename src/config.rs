//! Configuration System
//!
//! Layered configuration built with the `config` crate. Sources, lowest
//! precedence first: built-in defaults, the global config file, workspace
//! config files, then `DOCSYNC_*` environment variables.

use crate::error::CatalogError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod merge;
mod sources;

pub use merge::merge_policy::default_base_dir;
pub use sources::global_file::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocsyncConfig {
    /// Directory holding the sled database
    pub data_dir: PathBuf,

    /// Root directory for generated documents
    pub docs_dir: PathBuf,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for DocsyncConfig {
    fn default() -> Self {
        let base = default_base_dir();
        Self {
            data_dir: base.join("data"),
            docs_dir: base.join("docs"),
            logging: LoggingConfig::default(),
        }
    }
}

impl DocsyncConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(CatalogError::ConfigError(
                "data_dir cannot be empty".to_string(),
            ));
        }
        if self.docs_dir.as_os_str().is_empty() {
            return Err(CatalogError::ConfigError(
                "docs_dir cannot be empty".to_string(),
            ));
        }
        if self.data_dir == self.docs_dir {
            return Err(CatalogError::ConfigError(format!(
                "data_dir and docs_dir must differ (both {:?})",
                self.data_dir
            )));
        }
        self.logging.validate()
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, CatalogError> {
        toml::to_string_pretty(self)
            .map_err(|e| CatalogError::ConfigError(format!("Failed to render config: {}", e)))
    }
}

/// Loads [`DocsyncConfig`] from its layered sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace root.
    pub fn load(workspace_root: &Path) -> Result<DocsyncConfig, CatalogError> {
        let builder = merge::merge_policy::builder_with_defaults()?;
        let builder = sources::global_file::add_to_builder(builder)?;
        let builder = sources::workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = sources::environment::add_to_builder(builder);

        let config: DocsyncConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from one explicit file over the built-in defaults.
    pub fn load_from_file(path: &Path) -> Result<DocsyncConfig, CatalogError> {
        if !path.exists() {
            return Err(CatalogError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let config: DocsyncConfig = merge::merge_policy::builder_with_defaults()?
            .add_source(config::File::from(path))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}
