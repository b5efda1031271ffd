//! Read-only access to a started configuration.
//!
//! Responsibilities:
//! - `Config`: the frozen, shareable configuration tree and its lookups.
//! - `ConfigView`: structured navigation that fails on missing keys.
//!
//! Invariants:
//! - The tree is never mutated after construction; clones share it.
//! - `get`/`get_or`/`has` never fail; `require`, `get_as` and `ConfigView::field`
//!   fail with `MissingConfigurationProperty` on absent keys.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::{ConfigError, Result};
use crate::tree::{get_path, key_paths};

/// A frozen configuration tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    root: Arc<Value>,
}

impl Config {
    pub(crate) fn new(root: Value) -> Self {
        Self {
            root: Arc::new(root),
        }
    }

    /// Value at a dotted path, if present.
    pub fn get(&self, path: &str) -> Option<&Value> {
        get_path(&self.root, path)
    }

    /// Value at a dotted path, or `default` when absent.
    pub fn get_or(&self, path: &str, default: impl Into<Value>) -> Value {
        self.get(path).cloned().unwrap_or_else(|| default.into())
    }

    pub fn has(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Value at a dotted path; absence is an error.
    pub fn require(&self, path: &str) -> Result<&Value> {
        self.get(path)
            .ok_or_else(|| ConfigError::MissingConfigurationProperty(path.to_string()))
    }

    /// Deserialize the value at a dotted path.
    pub fn get_as<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let value = self.require(path)?;
        T::deserialize(value).map_err(|source| ConfigError::Deserialize {
            path: path.to_string(),
            source,
        })
    }

    /// Every dotted path, depth-first in insertion order.
    pub fn keys(&self, leaves_only: bool) -> Vec<String> {
        key_paths(&self.root, leaves_only)
    }

    /// Number of top-level keys.
    pub fn len(&self) -> usize {
        self.root.as_object().map_or(0, |map| map.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_value(&self) -> &Value {
        &self.root
    }

    /// Structured view rooted at the top of the tree.
    pub fn view(&self) -> ConfigView<'_> {
        ConfigView {
            path: String::new(),
            value: &self.root,
        }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string_pretty(self.root.as_ref()).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl Serialize for Config {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.root.serialize(serializer)
    }
}

/// Read-only cursor into a `Config`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigView<'a> {
    path: String,
    value: &'a Value,
}

impl<'a> ConfigView<'a> {
    /// Dotted path of this view; empty at the root.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn value(&self) -> &'a Value {
        self.value
    }

    /// Child view at `key` (itself may be dotted).
    pub fn field(&self, key: &str) -> Result<ConfigView<'a>> {
        let path = if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{key}", self.path)
        };
        match get_path(self.value, key) {
            Some(value) => Ok(ConfigView { path, value }),
            None => Err(ConfigError::MissingConfigurationProperty(path)),
        }
    }

    /// Child view at `key`, or `None` when absent.
    pub fn get(&self, key: &str) -> Option<ConfigView<'a>> {
        self.field(key).ok()
    }

    /// Keys of this mapping in insertion order; empty for non-mappings.
    pub fn keys(&self) -> Vec<&'a str> {
        match self.value {
            Value::Object(map) => map.keys().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }

    pub fn as_str(&self) -> Option<&'a str> {
        self.value.as_str()
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.value.as_i64()
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.value.as_f64()
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.value.as_bool()
    }

    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }
}
