//! Dotted-path access and merging over JSON configuration trees.
//!
//! Responsibilities:
//! - Read, write and list values by dotted path (`a.b.c`, `list.0`).
//! - Deep-merge one mapping into another.
//!
//! Invariants:
//! - Mappings merge recursively; arrays and scalars are replaced wholesale.
//! - Merging keeps the insertion position of keys already present.
//! - Numeric path segments index into arrays; mappings are never created inside arrays.

use serde_json::{Map, Value};

/// Value at `path`. The empty path is the root itself.
pub fn get_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(root);
    }
    path.split('.').try_fold(root, |node, segment| match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

pub fn get_path_mut<'a>(root: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    if path.is_empty() {
        return Some(root);
    }
    path.split('.').try_fold(root, |node, segment| match node {
        Value::Object(map) => map.get_mut(segment),
        Value::Array(items) => segment
            .parse::<usize>()
            .ok()
            .and_then(move |i| items.get_mut(i)),
        _ => None,
    })
}

/// Deep-set `value` at `path`, creating (or replacing non-mapping) intermediates.
pub fn set_path(root: &mut Map<String, Value>, path: &str, value: Value) {
    let mut segments = path.split('.').peekable();
    let mut node = root;
    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            node.insert(segment.to_string(), value);
            return;
        }
        let child = node
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !child.is_object() {
            *child = Value::Object(Map::new());
        }
        node = match child {
            Value::Object(map) => map,
            _ => return,
        };
    }
}

/// Rebuild `map` with every dotted key split into nested mappings, at every depth.
///
/// Entries apply in order: later scalars win and mappings that land on the
/// same path are deep-merged, so `{"a.b": 1, "a": {"c": 2}}` keeps both.
pub fn expand_dotted(map: Map<String, Value>) -> Map<String, Value> {
    let mut expanded = Map::new();
    for (key, value) in map {
        let value = match value {
            Value::Object(inner) => Value::Object(expand_dotted(inner)),
            other => other,
        };
        if !key.contains('.') {
            match (expanded.get_mut(&key), value) {
                (Some(Value::Object(existing)), Value::Object(incoming)) => {
                    deep_merge(existing, &incoming);
                }
                (_, value) => {
                    expanded.insert(key, value);
                }
            }
            continue;
        }
        let mut nested = Map::new();
        set_path(&mut nested, &key, value);
        deep_merge(&mut expanded, &nested);
    }
    expanded
}

/// Merge `source` into `target`.
pub fn deep_merge(target: &mut Map<String, Value>, source: &Map<String, Value>) {
    for (key, incoming) in source {
        match (target.get_mut(key), incoming) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                deep_merge(existing, incoming);
            }
            _ => {
                target.insert(key.clone(), incoming.clone());
            }
        }
    }
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Dotted paths of every mapping entry, depth-first in insertion order.
///
/// With `leaves_only`, paths of non-empty mappings are skipped. Arrays are leaves.
pub fn key_paths(root: &Value, leaves_only: bool) -> Vec<String> {
    fn walk(map: &Map<String, Value>, prefix: &str, leaves_only: bool, out: &mut Vec<String>) {
        for (key, value) in map {
            let path = join(prefix, key);
            match value {
                Value::Object(child) if !child.is_empty() => {
                    if !leaves_only {
                        out.push(path.clone());
                    }
                    walk(child, &path, leaves_only, out);
                }
                _ => out.push(path),
            }
        }
    }

    let mut out = Vec::new();
    if let Value::Object(map) = root {
        walk(map, "", leaves_only, &mut out);
    }
    out
}

/// Paths of every scalar inside the tree, array elements included.
pub fn scalar_paths(root: &Value) -> Vec<String> {
    fn walk(value: &Value, path: String, out: &mut Vec<String>) {
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    walk(child, join(&path, key), out);
                }
            }
            Value::Array(items) => {
                for (index, child) in items.iter().enumerate() {
                    walk(child, join(&path, &index.to_string()), out);
                }
            }
            _ => out.push(path),
        }
    }

    let mut out = Vec::new();
    if root.is_object() {
        walk(root, String::new(), &mut out);
    }
    out
}
