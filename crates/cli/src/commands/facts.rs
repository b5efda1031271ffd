//! Facts command implementation.

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use tierconf_config::{
    ConditionError, FactValue, Facts, SPECIAL_STRINGS, SystemFacts, resolve_special,
};

pub fn run(json: bool) -> Result<()> {
    let facts = SystemFacts::new();
    let entries = collect(&facts).context("Failed to read machine facts")?;

    if json {
        let object: Map<String, Value> = entries
            .into_iter()
            .map(|(reference, value)| (reference.to_string(), value.into_json()))
            .collect();
        let text = serde_json::to_string_pretty(&object).context("Failed to serialize JSON")?;
        println!("{}", text);
    } else {
        let width = entries.iter().map(|(r, _)| r.len()).max().unwrap_or(0);
        for (reference, value) in entries {
            println!("{reference:<width$}  {}", value.to_string().escape_debug());
        }
    }
    Ok(())
}

/// Every fixed-key special string with its value.
pub fn collect(facts: &dyn Facts) -> Result<Vec<(&'static str, FactValue)>, ConditionError> {
    SPECIAL_STRINGS
        .iter()
        .map(|&reference| resolve_special(reference, facts).map(|value| (reference, value)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tierconf_config::StaticFacts;

    #[test]
    fn test_collect_resolves_every_special_string() {
        let facts = StaticFacts::new()
            .with_platform("darwin")
            .with_hostname("web1.example.com");
        let entries = collect(&facts).unwrap();

        assert_eq!(entries.len(), SPECIAL_STRINGS.len());
        let lookup = |reference: &str| {
            entries
                .iter()
                .find(|(r, _)| *r == reference)
                .map(|(_, v)| v.clone())
        };
        assert_eq!(
            lookup("os:platform"),
            Some(FactValue::String("darwin".to_string()))
        );
        assert_eq!(
            lookup("hostname:name"),
            Some(FactValue::String("web1".to_string()))
        );
        assert_eq!(
            lookup("hostname:domain"),
            Some(FactValue::String("example.com".to_string()))
        );
    }
}
