//! CLI domain: parse, route, help and output only.
//! No domain orchestration; a single route table dispatches to the catalog and sync engine.

mod help;
mod output;
mod parse;
mod route;

pub use help::{command_name, is_mutating};
pub use output::{error_code, map_error};
pub use parse::{Cli, Commands};
pub use route::RunContext;
