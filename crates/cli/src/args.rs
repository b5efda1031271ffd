//! CLI argument definitions and parsing.
//!
//! Responsibilities:
//! - Define the CLI structure using clap derive macros.
//! - Turn global loader flags into `ScopeOptions` overrides.
//!
//! Non-responsibilities:
//! - Does not execute commands (see `dispatch` module).
//! - Does not read loader environment variables (see `ScopeOptions::from_env`).

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use anyhow::{Context, Result};
use tierconf_config::{Encoding, ScopeOptions};

#[derive(Parser)]
#[command(name = "tierconf")]
#[command(about = "Load, merge and inspect layered tierconf configuration", long_about = None)]
#[command(version)]
#[command(
    after_help = "Examples:\n  tierconf show ./config\n  tierconf show ./config --format leaves\n  tierconf show base.cfg 'server.port: 9090' --conditions 'os = linux'\n  tierconf get server.port ./config --default 8080\n  tierconf check 'os = linux and cpus >= 4'\n  tierconf facts --json\n"
)]
pub struct Cli {
    /// Directory that relative source paths are resolved against first
    #[arg(long, global = true, value_name = "DIR")]
    pub base_dir: Option<PathBuf>,

    /// Suffix of files loaded from directories (e.g., .cfg)
    #[arg(long, global = true, value_name = "SUFFIX")]
    pub extension: Option<String>,

    /// Text encoding of configuration files (utf-8, latin1, ascii)
    #[arg(long, global = true, value_name = "NAME")]
    pub encoding: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Options from the environment with command-line flags applied on top.
    pub fn scope_options(&self) -> Result<ScopeOptions> {
        let mut options =
            ScopeOptions::from_env().context("Failed to read loader options from environment")?;

        if let Some(name) = &self.encoding {
            let encoding: Encoding = name.parse()?;
            options = options.with_encoding(encoding);
        }
        if let Some(extension) = &self.extension {
            options = options.with_extension(extension.clone());
        }
        if let Some(dir) = &self.base_dir {
            options = options.with_base_dir(dir.clone());
        }
        Ok(options)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Merge configuration sources and print the result
    Show {
        /// Files, directories or inline notation, applied in order
        #[arg(required = true, value_name = "SOURCE")]
        sources: Vec<String>,

        /// Condition applied to every source (e.g., 'os = linux')
        #[arg(short, long, default_value = "")]
        conditions: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },

    /// Print a single value from the merged configuration
    Get {
        /// Dotted path of the value (e.g., server.port)
        path: String,

        /// Files, directories or inline notation, applied in order
        #[arg(required = true, value_name = "SOURCE")]
        sources: Vec<String>,

        /// Condition applied to every source
        #[arg(short, long, default_value = "")]
        conditions: String,

        /// Value printed when the path is absent, read as a notation scalar
        #[arg(short, long, allow_hyphen_values = true)]
        default: Option<String>,

        /// Print strings without JSON quoting
        #[arg(short, long)]
        raw: bool,
    },

    /// Evaluate a condition against this machine
    Check {
        /// Condition expression (e.g., 'os = linux and cpus >= 4')
        expression: String,
    },

    /// List every special string and its value on this machine
    Facts {
        /// Print a JSON object instead of aligned text
        #[arg(long)]
        json: bool,
    },
}

/// Output format of `show`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Indented JSON
    Pretty,
    /// Single-line JSON
    Json,
    Yaml,
    /// Every dotted key path, branches included
    Keys,
    /// `path: value` per leaf, readable back as notation
    Leaves,
}
