//! Merge rules: built-in defaults applied beneath every other source.

use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;
use directories::ProjectDirs;
use std::path::PathBuf;

/// Base directory holding the default `data` and `docs` directories.
pub fn default_base_dir() -> PathBuf {
    ProjectDirs::from("", "", "docsync")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".docsync"))
}

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let base = default_base_dir();
    Config::builder()
        .set_default("data_dir", base.join("data").to_string_lossy().to_string())?
        .set_default("docs_dir", base.join("docs").to_string_lossy().to_string())
}
