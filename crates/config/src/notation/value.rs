//! Scalar coercion for unquoted notation values.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Number, Value};

use crate::cursor::is_quote_character;

static INTEGER: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^[+-]?\d+$").ok());
static DECIMAL: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^[+-]?\d+\.\d+$").ok());

fn matches(pattern: &LazyLock<Option<Regex>>, text: &str) -> bool {
    pattern.as_ref().is_some_and(|re| re.is_match(text))
}

/// Turn the raw text of a scalar into a typed value.
///
/// `null`, `true`, `false`, integers and decimals become their JSON types.
/// A value wrapped in matching quotes becomes the inner text, with escaped
/// quotes of the same kind unescaped. Anything else stays a string.
pub fn coerce_scalar(raw: &str) -> Value {
    let text = raw.trim();
    match text {
        "null" => return Value::Null,
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }

    if matches(&INTEGER, text) {
        if let Ok(n) = text.trim_start_matches('+').parse::<i64>() {
            return Value::Number(n.into());
        }
    }
    if matches(&INTEGER, text) || matches(&DECIMAL, text) {
        if let Some(n) = text.parse::<f64>().ok().and_then(Number::from_f64) {
            return Value::Number(n);
        }
    }

    if let Some(inner) = unquote(text) {
        return Value::String(inner);
    }

    Value::String(text.to_string())
}

/// Inner text of a quoted value, or `None` if `text` is not wrapped in matching quotes.
pub fn unquote(text: &str) -> Option<String> {
    let mut chars = text.chars();
    let first = chars.next().filter(|c| is_quote_character(*c))?;
    if text.len() < 2 || !text.ends_with(first) {
        return None;
    }

    let inner = &text[1..text.len() - 1];
    let escaped = format!("\\{first}");
    Some(inner.replace(&escaped, &first.to_string()))
}
