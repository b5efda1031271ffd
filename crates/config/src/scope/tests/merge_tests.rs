//! Merge tests: source order, condition filtering, deep merge and interpolation.

use proptest::prelude::*;
use serde_json::{Value, json};

use super::{open_scope, open_scope_with};
use crate::error::ConfigError;
use crate::facts::StaticFacts;
use crate::view::Config;

fn started(sources: &[(Value, &str)]) -> Config {
    let mut scope = open_scope();
    for (content, conditions) in sources {
        scope.add(content.clone(), conditions).unwrap();
    }
    scope.start().unwrap();
    scope.config().cloned().unwrap()
}

#[test]
fn test_last_matching_source_wins() {
    let config = started(&[(json!({"x": 1}), ""), (json!({"x": 2}), "")]);
    assert_eq!(config.get("x"), Some(&json!(2)));

    let config = started(&[(json!({"x": 2}), ""), (json!({"x": 1}), "")]);
    assert_eq!(config.get("x"), Some(&json!(1)));
}

#[test]
fn test_condition_filtering() {
    let config = started(&[
        (json!({"x": "never"}), "false"),
        (json!({"x": 1}), ""),
        (json!({"y": "always"}), "true"),
        (json!({"x": "never"}), "false"),
    ]);
    assert_eq!(config.get("x"), Some(&json!(1)));
    assert_eq!(config.get("y"), Some(&json!("always")));
}

#[test]
fn test_deep_merge_and_array_replacement() {
    let config = started(&[
        (json!({"a": {"b": 1, "c": 1}, "list": [1, 2]}), ""),
        (json!({"a": {"b": 2}, "list": [3]}), ""),
    ]);
    assert_eq!(config.as_value(), &json!({"a": {"b": 2, "c": 1}, "list": [3]}));
}

#[test]
fn test_interpolation() {
    let config = started(&[(json!({"one": 1, "two": "${one}", "three": "val=${one}"}), "")]);
    assert_eq!(config.get("two"), Some(&json!(1)));
    assert_eq!(config.get("three"), Some(&json!("val=1")));
}

#[test]
fn test_references_see_the_merged_tree() {
    let config = started(&[
        (json!({"root": "/opt", "data": "${root}/data"}), ""),
        (json!({"root": "/srv"}), ""),
    ]);
    assert_eq!(config.get("data"), Some(&json!("/srv/data")));
}

#[test]
fn test_missing_key_dual_behavior() {
    let config = started(&[(json!({"a": 1}), "")]);
    assert!(matches!(
        config.require("b"),
        Err(ConfigError::MissingConfigurationProperty(_))
    ));
    assert_eq!(config.get("b"), None);
    assert_eq!(config.get_or("b", 99), json!(99));
}

#[test]
fn test_sections_select_by_machine() {
    let document = "\
port: 80
[os = darwin]
port: 8080
[os = linux and cpus >= 4]
port: 9090
";
    let mut scope = open_scope_with(StaticFacts::new().with_platform("darwin"));
    scope.add(document, "").unwrap();
    scope.start().unwrap();
    assert_eq!(scope.config().unwrap().get("port"), Some(&json!(8080)));

    let mut scope = open_scope_with(StaticFacts::new().with_cpus(8));
    scope.add(document, "").unwrap();
    scope.start().unwrap();
    assert_eq!(scope.config().unwrap().get("port"), Some(&json!(9090)));

    let mut scope = open_scope();
    scope.add(document, "").unwrap();
    scope.start().unwrap();
    assert_eq!(scope.config().unwrap().get("port"), Some(&json!(80)));
}

#[test]
fn test_default_conditions_gate_unsectioned_content() {
    let mut scope = open_scope();
    scope.add("a: 1\n[true]\nb: 2", "false").unwrap();
    scope.start().unwrap();
    let config = scope.config().unwrap();
    assert!(!config.has("a"));
    assert_eq!(config.get("b"), Some(&json!(2)));
}

#[test]
fn test_invalid_conditions_on_objects() {
    let mut scope = open_scope();
    assert!(matches!(
        scope.add(json!({"a": 1}), "os ~ linux"),
        Err(ConfigError::Condition { .. })
    ));
}

#[test]
fn test_special_strings_in_sources() {
    let facts = StaticFacts::new()
        .with_hostname("web3.prod.example.com")
        .with_env("APP_HOME", "/opt/app");
    let mut scope = open_scope_with(facts);
    scope
        .add("home: ${env:APP_HOME}\nlogs: ${home}/logs\nhost: ${hostname:name}", "")
        .unwrap();
    scope.start().unwrap();
    let config = scope.config().unwrap();
    assert_eq!(config.get("logs"), Some(&json!("/opt/app/logs")));
    assert_eq!(config.get("host"), Some(&json!("web3")));
}

#[test]
fn test_dotted_mapping_keys_are_nested() {
    let config = started(&[
        (json!({"server.host": "localhost", "server": {"port": 80}}), ""),
        (json!({"server.port": 8080, "url": "${server.host}:${server.port}"}), ""),
    ]);
    assert_eq!(
        config.get("server"),
        Some(&json!({"host": "localhost", "port": 8080}))
    );
    assert!(config.has("server.host"));
    assert_eq!(config.get("url"), Some(&json!("localhost:8080")));
    assert_eq!(config.keys(true), vec!["server.host", "server.port", "url"]);
}

#[test]
fn test_dotted_mapping_keys_are_checked_when_starting() {
    let mut scope = open_scope();
    scope.add(json!({"a.b": "<<fill me>>"}), "").unwrap();
    assert!(matches!(
        scope.start(),
        Err(ConfigError::UnfulfilledPlaceholder { ref path, .. }) if path == "a.b"
    ));

    let mut scope = open_scope();
    scope.add(json!({"c.d": "${missing}"}), "").unwrap();
    assert!(matches!(
        scope.start(),
        Err(ConfigError::InvalidVariableAssignment { ref path, .. }) if path == "c.d"
    ));
}

proptest! {
    #[test]
    fn last_source_wins_for_any_values(first in any::<i64>(), second in any::<i64>()) {
        let config = started(&[(json!({"x": first}), ""), (json!({"x": second}), "")]);
        prop_assert_eq!(config.get("x"), Some(&json!(second)));
    }

    #[test]
    fn blank_conditions_always_match(conditions in "[ \t\n]{0,8}") {
        let config = started(&[(json!({"x": 1}), conditions.as_str())]);
        prop_assert_eq!(config.get("x"), Some(&json!(1)));
    }

    #[test]
    fn false_sources_never_contribute(position in 0usize..4) {
        let mut sources: Vec<(Value, &str)> =
            (0..4).map(|i| (json!({ "k": i }), "")).collect();
        sources.insert(position, (json!({"k": "never", "extra": true}), "false"));
        let config = started(&sources);
        prop_assert_eq!(config.get("k"), Some(&json!(3)));
        prop_assert!(!config.has("extra"));
    }
}
