//! Command-name contract used in logs.

use crate::cli::parse::Commands;

/// Command name string for log fields (e.g. "add_module", "sync").
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::AddModule { .. } => "add_module",
        Commands::AddEndpoint { .. } => "add_endpoint",
        Commands::UpdateModule { .. } => "update_module",
        Commands::UpdateEndpoint { .. } => "update_endpoint",
        Commands::ListModules { .. } => "list_modules",
        Commands::ListEndpoints { .. } => "list_endpoints",
        Commands::ShowModule { .. } => "show_module",
        Commands::ShowEndpoint { .. } => "show_endpoint",
        Commands::MoveModule { .. } => "move_module",
        Commands::DetachModule { .. } => "detach_module",
        Commands::Sync { .. } => "sync",
        Commands::Config => "config",
    }
}

/// Whether the command edits the catalog.
pub fn is_mutating(command: &Commands) -> bool {
    matches!(
        command,
        Commands::AddModule { .. }
            | Commands::AddEndpoint { .. }
            | Commands::UpdateModule { .. }
            | Commands::UpdateEndpoint { .. }
            | Commands::MoveModule { .. }
            | Commands::DetachModule { .. }
    )
}
