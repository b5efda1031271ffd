//! Command dispatch logic.
//!
//! Responsibilities:
//! - Route parsed CLI arguments to the matching command handler.
//! - Build loader options only for commands that load sources.
//!
//! Does NOT handle:
//! - CLI structure definitions (see `args` module).
//! - Exit code mapping (see `error` module).

use anyhow::Result;

use crate::args::{Cli, Commands};
use crate::commands;

/// Dispatch CLI commands to their respective handlers.
pub(crate) fn run_command(cli: Cli) -> Result<()> {
    match &cli.command {
        Commands::Show {
            sources,
            conditions,
            format,
        } => {
            let options = cli.scope_options()?;
            commands::show::run(sources, conditions, *format, options)?;
        }
        Commands::Get {
            path,
            sources,
            conditions,
            default,
            raw,
        } => {
            let options = cli.scope_options()?;
            commands::get::run(path, sources, conditions, default.as_deref(), *raw, options)?;
        }
        Commands::Check { expression } => {
            commands::check::run(expression)?;
        }
        Commands::Facts { json } => {
            commands::facts::run(*json)?;
        }
    }

    Ok(())
}
