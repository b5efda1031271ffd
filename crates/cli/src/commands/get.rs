//! Get command implementation.

use anyhow::{Context, Result};
use serde_json::Value;
use tierconf_config::notation::coerce_scalar;
use tierconf_config::{ConfigError, ScopeOptions};

use crate::commands::load_config;

pub fn run(
    path: &str,
    sources: &[String],
    conditions: &str,
    default: Option<&str>,
    raw: bool,
    options: ScopeOptions,
) -> Result<()> {
    let config = load_config(sources, conditions, options)?;

    let value = match (config.get(path), default) {
        (Some(value), _) => value.clone(),
        (None, Some(default)) => coerce_scalar(default),
        (None, None) => {
            return Err(ConfigError::MissingConfigurationProperty(path.to_string()).into());
        }
    };

    println!("{}", format_value(&value, raw)?);
    Ok(())
}

/// JSON text of `value`; with `raw`, strings are printed bare.
pub fn format_value(value: &Value, raw: bool) -> Result<String> {
    match value {
        Value::String(s) if raw => Ok(s.clone()),
        other => serde_json::to_string_pretty(other).context("Failed to serialize JSON"),
    }
}
