//! Configuration sources and the inputs they are built from.
//!
//! Responsibilities:
//! - `ConfigSource`: one condition-gated fragment of configuration.
//! - `ConfigInput`: what `add()` accepts (a mapping, notation text or a path).
//!
//! Invariants:
//! - A source's content is always a mapping with no dotted keys.
//! - A source without conditions always applies.

use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::condition::Condition;
use crate::facts::Facts;
use crate::tree::expand_dotted;

/// One fragment of configuration, gated by an optional condition.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSource {
    origin: String,
    content: Map<String, Value>,
    conditions: Option<Condition>,
}

impl ConfigSource {
    /// Dotted keys in `content` are expanded into nested mappings.
    pub fn new(
        origin: impl Into<String>,
        content: Map<String, Value>,
        conditions: Option<Condition>,
    ) -> Self {
        Self {
            origin: origin.into(),
            content: expand_dotted(content),
            conditions,
        }
    }

    /// Where this source came from: a file path or the `file:line` of the `add()` call.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn content(&self) -> &Map<String, Value> {
        &self.content
    }

    pub fn conditions(&self) -> Option<&Condition> {
        self.conditions.as_ref()
    }

    /// Returns true if this source applies on the machine described by `facts`.
    pub fn matches(&self, facts: &dyn Facts) -> bool {
        self.conditions
            .as_ref()
            .is_none_or(|condition| condition.resolve(facts))
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.conditions {
            Some(condition) => write!(f, "{} [{}]", self.origin, condition),
            None => write!(f, "{}", self.origin),
        }
    }
}

/// Content accepted by `ConfigScope::add`.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigInput {
    /// An already-built mapping, used as a single source.
    Object(Map<String, Value>),
    /// Notation text, or the path of a file or directory if one exists there.
    Text(String),
    /// A file or directory that must exist.
    Path(PathBuf),
    /// A value that can never be configuration, with the reason.
    Invalid(String),
}

impl From<Map<String, Value>> for ConfigInput {
    fn from(map: Map<String, Value>) -> Self {
        Self::Object(map)
    }
}

impl From<Value> for ConfigInput {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::Object(map),
            Value::String(text) => Self::Text(text),
            Value::Null => Self::Invalid("null".to_string()),
            Value::Bool(_) => Self::Invalid("a boolean".to_string()),
            Value::Number(_) => Self::Invalid("a number".to_string()),
            Value::Array(_) => Self::Invalid("an array".to_string()),
        }
    }
}

impl From<&str> for ConfigInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for ConfigInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&Path> for ConfigInput {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<PathBuf> for ConfigInput {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&PathBuf> for ConfigInput {
    fn from(path: &PathBuf) -> Self {
        Self::Path(path.clone())
    }
}
