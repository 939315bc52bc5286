//! Workspace config files under `<workspace>/config/`
//!
//! `config.toml` is the shared layer; `<env>.toml` sits on top of it, where
//! `<env>` comes from `DOCSYNC_ENV` and falls back to `development`.

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File, FileFormat};
use std::path::{Path, PathBuf};
use tracing::debug;

const CONFIG_DIR: &str = "config";
const SHARED_FILE: &str = "config.toml";
const DEFAULT_ENV: &str = "development";

/// Active environment name; a blank `DOCSYNC_ENV` counts as unset.
pub fn active_env() -> String {
    std::env::var("DOCSYNC_ENV")
        .ok()
        .map(|env| env.trim().to_string())
        .filter(|env| !env.is_empty())
        .unwrap_or_else(|| DEFAULT_ENV.to_string())
}

/// Existing workspace config files for `env`, lowest precedence first.
pub fn workspace_config_files(workspace_root: &Path, env: &str) -> Vec<PathBuf> {
    let dir = workspace_root.join(CONFIG_DIR);
    [dir.join(SHARED_FILE), dir.join(format!("{}.toml", env))]
        .into_iter()
        .filter(|path| path.is_file())
        .collect()
}

pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    workspace_root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let env = active_env();
    let files = workspace_config_files(workspace_root, &env);
    debug!(env = %env, files = files.len(), "Workspace configuration layers");

    Ok(files.into_iter().fold(builder, |builder, path| {
        builder.add_source(File::from(path).format(FileFormat::Toml))
    }))
}
