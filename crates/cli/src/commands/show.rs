//! Show command implementation.

use anyhow::{Context, Result};
use tierconf_config::{Config, ScopeOptions};
use tracing::info;

use crate::args::OutputFormat;
use crate::commands::load_config;

pub fn run(
    sources: &[String],
    conditions: &str,
    format: OutputFormat,
    options: ScopeOptions,
) -> Result<()> {
    let config = load_config(sources, conditions, options)?;
    info!(
        sources = sources.len(),
        keys = config.len(),
        "Loaded configuration"
    );

    let output = render(&config, format)?;
    print!("{}", output);
    Ok(())
}

/// Render `config` in `format`, newline-terminated unless empty.
pub fn render(config: &Config, format: OutputFormat) -> Result<String> {
    let output = match format {
        OutputFormat::Pretty => format!("{config}\n"),
        OutputFormat::Json => {
            let json = serde_json::to_string(config).context("Failed to serialize JSON")?;
            format!("{json}\n")
        }
        OutputFormat::Yaml => serde_yaml::to_string(config).context("Failed to serialize YAML")?,
        OutputFormat::Keys => lines(config.keys(false)),
        OutputFormat::Leaves => {
            let mut leaves = Vec::new();
            for path in config.keys(true) {
                let value = config.require(&path)?;
                let value = serde_json::to_string(value).context("Failed to serialize JSON")?;
                leaves.push(format!("{path}: {value}"));
            }
            lines(leaves)
        }
    };
    Ok(output)
}

fn lines(items: Vec<String>) -> String {
    items.into_iter().map(|item| item + "\n").collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tierconf_config::ConfigScope;

    fn config(text: &str) -> Config {
        let mut scope = ConfigScope::new("test");
        scope.init().unwrap();
        scope.add(text, "").unwrap();
        scope.start().unwrap();
        scope.config().cloned().unwrap()
    }

    #[test]
    fn test_render_json_formats() {
        let config = config("server.port: 8080\nname: web");
        assert_eq!(
            render(&config, OutputFormat::Json).unwrap(),
            "{\"server\":{\"port\":8080},\"name\":\"web\"}\n"
        );
        assert_eq!(
            render(&config, OutputFormat::Pretty).unwrap(),
            "{\n  \"server\": {\n    \"port\": 8080\n  },\n  \"name\": \"web\"\n}\n"
        );
    }

    #[test]
    fn test_render_yaml() {
        let config = config("server.port: 8080\nname: web");
        assert_eq!(
            render(&config, OutputFormat::Yaml).unwrap(),
            "server:\n  port: 8080\nname: web\n"
        );
    }

    #[test]
    fn test_render_keys_and_leaves() {
        let config = config("server.port: 8080\nserver.host: \"a b\"\ntags: [1, 2]");
        assert_eq!(
            render(&config, OutputFormat::Keys).unwrap(),
            "server\nserver.port\nserver.host\ntags\n"
        );
        assert_eq!(
            render(&config, OutputFormat::Leaves).unwrap(),
            "server.port: 8080\nserver.host: \"a b\"\ntags: [1,2]\n"
        );
    }

    #[test]
    fn test_leaves_read_back_as_the_same_configuration() {
        let original = config("a.b: 1\na.c: \"x y\"\nd: true\ne: [1, {\"f\": null}]");
        let leaves = render(&original, OutputFormat::Leaves).unwrap();
        assert_eq!(config(&leaves), original);
    }

    #[test]
    fn test_render_empty_lists() {
        let config = config("# nothing here\n");
        assert_eq!(render(&config, OutputFormat::Keys).unwrap(), "");
        assert_eq!(render(&config, OutputFormat::Json).unwrap(), "{}\n");
    }
}
