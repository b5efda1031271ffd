//! Variable substitution over a merged configuration tree.
//!
//! Responsibilities:
//! - Replace `${path}` references with the referenced value.
//! - Replace `${namespace:key}` special strings with machine facts.
//! - Reject unresolved `<<placeholder>>` values.
//!
//! Invariants:
//! - A string that is exactly one token takes the referenced value's type.
//!   Embedded tokens splice text; mappings and arrays splice as JSON.
//! - References resolve depth-first; a path revisited while still resolving
//!   is a circular reference.
//! - Spliced-in text is not rescanned for further tokens.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::trace;

use crate::error::{ConfigError, Result};
use crate::facts::{Facts, resolve_special};
use crate::tree::{get_path, get_path_mut, scalar_paths};

static TOKEN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\$\{([\w\-.:$]+)\}").ok());
static PLACEHOLDER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^<<([^>]+)>>$").ok());

/// Resolves references inside one configuration tree.
pub struct Resolver<'f> {
    facts: &'f dyn Facts,
}

impl<'f> Resolver<'f> {
    pub fn new(facts: &'f dyn Facts) -> Self {
        Self { facts }
    }

    /// Resolve every reference in `root` in place.
    pub fn resolve(&self, root: &mut Value) -> Result<()> {
        let mut resolving = HashSet::new();
        for path in scalar_paths(root) {
            self.resolve_path(root, &path, &mut resolving)?;
        }
        Ok(())
    }

    fn resolve_path(
        &self,
        root: &mut Value,
        path: &str,
        resolving: &mut HashSet<String>,
    ) -> Result<Value> {
        if !resolving.insert(path.to_string()) {
            return Err(ConfigError::CircularReference {
                path: path.to_string(),
            });
        }

        let Some(mut value) = get_path(root, path).cloned() else {
            resolving.remove(path);
            return Ok(Value::Null);
        };

        if matches!(value, Value::Object(_) | Value::Array(_)) {
            for child in child_paths(&value, path) {
                self.resolve_path(root, &child, resolving)?;
            }
            value = get_path(root, path).cloned().unwrap_or(Value::Null);
        } else if let Value::String(text) = &value {
            let resolved = self.substitute(root, path, text, resolving)?;
            if let Value::String(text) = &resolved {
                check_placeholder(text, path)?;
            }
            if resolved != value {
                trace!(path, "Resolved configuration reference");
                if let Some(slot) = get_path_mut(root, path) {
                    *slot = resolved.clone();
                }
                value = resolved;
            }
        }

        resolving.remove(path);
        Ok(value)
    }

    fn substitute(
        &self,
        root: &mut Value,
        path: &str,
        text: &str,
        resolving: &mut HashSet<String>,
    ) -> Result<Value> {
        let Some(token) = TOKEN.as_ref() else {
            return Ok(Value::String(text.to_string()));
        };

        let mut out = String::new();
        let mut rest = 0;
        for captures in token.captures_iter(text) {
            let (Some(whole), Some(variable)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            let replacement = self.lookup(root, path, variable.as_str(), resolving)?;

            if whole.start() == 0 && whole.end() == text.len() {
                return Ok(replacement);
            }
            out.push_str(&text[rest..whole.start()]);
            out.push_str(&splice_text(&replacement));
            rest = whole.end();
        }
        out.push_str(&text[rest..]);
        Ok(Value::String(out))
    }

    fn lookup(
        &self,
        root: &mut Value,
        path: &str,
        variable: &str,
        resolving: &mut HashSet<String>,
    ) -> Result<Value> {
        if variable.contains(':') {
            return resolve_special(variable, self.facts)
                .map(|fact| fact.into_json())
                .map_err(|_| ConfigError::UnresolvedSpecialString {
                    reference: variable.to_string(),
                    path: path.to_string(),
                });
        }

        if get_path(root, variable).is_none() {
            return Err(ConfigError::InvalidVariableAssignment {
                variable: variable.to_string(),
                path: path.to_string(),
            });
        }
        self.resolve_path(root, variable, resolving)
    }
}

fn child_paths(value: &Value, path: &str) -> Vec<String> {
    match value {
        Value::Object(map) => map.keys().map(|key| format!("{path}.{key}")).collect(),
        Value::Array(items) => (0..items.len()).map(|i| format!("{path}.{i}")).collect(),
        _ => Vec::new(),
    }
}

fn splice_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn check_placeholder(text: &str, path: &str) -> Result<()> {
    let captures = PLACEHOLDER.as_ref().and_then(|re| re.captures(text));
    match captures.and_then(|c| c.get(1)) {
        Some(placeholder) => Err(ConfigError::UnfulfilledPlaceholder {
            placeholder: placeholder.as_str().to_string(),
            path: path.to_string(),
        }),
        None => Ok(()),
    }
}
