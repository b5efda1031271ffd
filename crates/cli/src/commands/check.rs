//! Check command implementation.

use anyhow::{Context, Result};
use tierconf_config::{ConditionParser, Facts, SystemFacts};

pub fn run(expression: &str) -> Result<()> {
    let facts = SystemFacts::new();
    println!("{}", evaluate(expression, &facts)?);
    Ok(())
}

/// Canonical form of `expression` and whether it holds, as `<condition> => <bool>`.
///
/// A blank expression always holds.
pub fn evaluate(expression: &str, facts: &dyn Facts) -> Result<String> {
    let condition = ConditionParser::new(facts)
        .parse(expression)
        .with_context(|| format!("Invalid condition '{}'", expression.trim()))?;

    Ok(match condition {
        Some(condition) => format!("{} => {}", condition, condition.resolve(facts)),
        None => "(always) => true".to_string(),
    })
}
