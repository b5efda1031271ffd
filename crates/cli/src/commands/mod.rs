//! CLI command implementations.

pub mod check;
pub mod facts;
pub mod get;
pub mod show;

use anyhow::{Context, Result};
use tierconf_config::{Config, ConfigScope, ScopeOptions};

/// Name of the scope the CLI loads into.
const CLI_SCOPE: &str = "cli";

/// Add every source in order under `conditions`, then start and return the result.
pub fn load_config(sources: &[String], conditions: &str, options: ScopeOptions) -> Result<Config> {
    let mut scope = ConfigScope::new(CLI_SCOPE).with_options(options);
    scope.init()?;

    for source in sources {
        scope
            .add(source.as_str(), conditions)
            .with_context(|| format!("Failed to load '{}'", abbreviate(source)))?;
    }

    scope.start().context("Failed to resolve configuration")?;
    scope
        .config()
        .cloned()
        .context("Configuration scope did not start")
}

/// First line of a source argument, shortened for error messages.
fn abbreviate(source: &str) -> String {
    const MAX_CHARS: usize = 40;
    let first_line = source.lines().next().unwrap_or_default();
    if first_line.chars().count() > MAX_CHARS || first_line.len() < source.trim_end().len() {
        let head: String = first_line.chars().take(MAX_CHARS).collect();
        format!("{head}...")
    } else {
        first_line.to_string()
    }
}
