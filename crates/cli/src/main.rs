//! tierconf - Command-line front end for layered configuration.
//!
//! Responsibilities:
//! - Parse command-line arguments and environment variables.
//! - Load configuration sources through the shared config library.
//! - Print merged configuration, single values, condition results and machine facts.
//!
//! Does NOT handle:
//! - Parsing, merging or resolving configuration (see `crates/config`).
//!
//! Invariants:
//! - `load_dotenv()` is called BEFORE CLI parsing so `.env` can supply loader variables.
//! - Logging goes to stderr; stdout carries only command output.

mod args;
mod commands;
mod dispatch;
mod error;

use anyhow::{Context, Result};
use args::Cli;
use clap::Parser;
use dispatch::run_command;
use error::{ExitCode, ExitCodeExt};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() {
    // Load .env before parsing so TIERCONF_* variables from it are honoured
    if let Err(e) = load_dotenv() {
        eprintln!("Failed to load environment: {:#}", e);
        std::process::exit(ExitCode::GeneralError.as_i32());
    }

    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let exit_code = match run_command(cli) {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            eprintln!("{:#}", e);
            e.exit_code()
        }
    };

    std::process::exit(exit_code.as_i32());
}

/// Check if dotenv loading is disabled via environment variable.
fn dotenv_disabled() -> bool {
    matches!(
        std::env::var("DOTENV_DISABLED").ok().as_deref(),
        Some("true") | Some("1")
    )
}

/// Load environment variables from `.env` if present.
///
/// Missing `.env` files are ignored. Error messages never echo `.env` contents.
fn load_dotenv() -> Result<()> {
    if dotenv_disabled() {
        return Ok(());
    }

    match dotenvy::dotenv() {
        Ok(_) => Ok(()),
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(dotenvy::Error::LineParse(_, index)) => Err(anyhow::anyhow!(
            "Failed to parse .env file at position {index}. Hint: set DOTENV_DISABLED=1 to skip .env loading"
        )),
        Err(e) => Err(e).context("Failed to read .env file"),
    }
}
