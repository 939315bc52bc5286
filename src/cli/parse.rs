//! CLI parse: clap types for docsync. No behavior; definitions only.

use crate::types::EntityId;
use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

/// Docsync CLI - hierarchical API catalog with generated documentation
#[derive(Parser, Debug)]
#[command(name = "docsync")]
#[command(about = "Catalog modules and endpoints and keep their documentation in sync")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory (searched for config/config.toml)
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides layered config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, short = 'v')]
    pub verbose: bool,

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

/// Module arguments accept either an id or a slash-separated path.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a module, at the root or under a parent
    AddModule {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Parent module (id or path); omit for a root module
        #[arg(long)]
        parent: Option<String>,
    },
    /// Create an endpoint under a module
    AddEndpoint {
        /// Owning module (id or path)
        module: String,
        name: String,
        #[arg(long, default_value = "")]
        declaration: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Rename a module or change its description
    UpdateModule {
        /// Module (id or path)
        module: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Update an endpoint's name, declaration or description
    UpdateEndpoint {
        id: EntityId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        declaration: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// List root modules, or detached modules with --detached
    ListModules {
        /// Case-insensitive name substring
        #[arg(long)]
        filter: Option<String>,
        #[arg(long)]
        detached: bool,
    },
    /// List a module's endpoints
    ListEndpoints {
        /// Module (id or path)
        module: String,
        #[arg(long)]
        filter: Option<String>,
    },
    /// Show one module
    #[command(group(ArgGroup::new("target").required(true).args(["id", "path"])))]
    ShowModule {
        #[arg(long)]
        id: Option<EntityId>,
        #[arg(long)]
        path: Option<String>,
    },
    /// Show one endpoint
    ShowEndpoint { id: EntityId },
    /// Move a module (and its subtree) under a new parent
    MoveModule {
        /// Module to move (id or path)
        module: String,
        /// New parent (id or path)
        to: String,
    },
    /// Detach a child module from its parent
    DetachModule {
        /// Parent module (id or path)
        parent: String,
        /// Child module (id or path)
        child: String,
    },
    /// Regenerate documents: one module subtree, one endpoint, or everything
    Sync {
        #[arg(long, conflicts_with = "endpoint")]
        module: Option<String>,
        #[arg(long)]
        endpoint: Option<EntityId>,
    },
    /// Print the effective configuration
    Config,
}
