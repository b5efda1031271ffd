//! Property-based tests for parsing and merging.
//!
//! Test coverage:
//! - Notation scalars: integers, booleans and quoted text keep their type
//! - Dotted keys: any key path deep-sets to the same nested value
//! - Merge order: the last matching source wins per leaf key
//! - Blank conditions: whitespace and comments behave like no condition
//! - Condition display: the canonical form re-parses to the same tree

use std::sync::Arc;

use proptest::prelude::*;
use serde_json::{Value, json};

use tierconf_config::{Condition, ConditionParser, ConfigScope, NotationParser, StaticFacts};

/// Strategy for generating dotted key paths of one to four segments.
fn key_path_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z][a-z0-9_]{0,8}", 1..=4)
}

/// Strategy for generating condition trees from literals and machine fields.
fn condition_text_strategy() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        Just("true".to_string()),
        Just("false".to_string()),
        Just("os = linux".to_string()),
        Just("arch != arm64".to_string()),
        Just("cpus >= 2".to_string()),
        Just("hostname ^ 'web'".to_string()),
    ];
    leaf.prop_recursive(4, 16, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(|c| format!("not {c}")),
            inner.clone().prop_map(|c| format!("({c})")),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| format!("{l} and {r}")),
            (inner.clone(), inner).prop_map(|(l, r)| format!("{l} or {r}")),
        ]
    })
}

fn parse_single(text: &str) -> Value {
    let facts = StaticFacts::new();
    let sources = NotationParser::new(&facts).parse("prop", text, "").unwrap();
    match sources.as_slice() {
        [source] => Value::Object(source.content().clone()),
        other => panic!("expected one fragment, got {}", other.len()),
    }
}

fn start(sources: Vec<(Value, String)>) -> Value {
    let mut scope = ConfigScope::new("prop").with_facts(Arc::new(StaticFacts::new()));
    scope.init().unwrap();
    for (content, conditions) in sources {
        scope.add(content, &conditions).unwrap();
    }
    scope.start().unwrap();
    scope.config().unwrap().as_value().clone()
}

proptest! {
    #[test]
    fn integers_parse_as_numbers(n in any::<i64>()) {
        prop_assert_eq!(parse_single(&format!("value: {n}")), json!({"value": n}));
    }

    #[test]
    fn quoted_numbers_stay_strings(n in any::<u32>()) {
        prop_assert_eq!(
            parse_single(&format!("value: \"{n}\"")),
            json!({"value": n.to_string()})
        );
    }

    #[test]
    fn booleans_parse_as_booleans(b in any::<bool>()) {
        prop_assert_eq!(parse_single(&format!("value = {b}")), json!({"value": b}));
    }

    #[test]
    fn dotted_keys_deep_set(path in key_path_strategy(), n in any::<i32>()) {
        let parsed = parse_single(&format!("{}: {n}", path.join(".")));
        let mut expected = json!(n);
        for segment in path.iter().rev() {
            expected = json!({ segment.as_str(): expected });
        }
        prop_assert_eq!(parsed, expected);
    }

    #[test]
    fn last_matching_source_wins(values in prop::collection::vec(any::<i64>(), 1..8)) {
        let sources = values.iter().map(|v| (json!({"x": v}), String::new())).collect();
        let last = values.last().copied();
        prop_assert_eq!(start(sources), json!({"x": last}));
    }

    #[test]
    fn reversing_add_order_flips_the_winner(a in any::<i64>(), b in any::<i64>()) {
        prop_assume!(a != b);
        let forward = start(vec![(json!({"x": a}), String::new()), (json!({"x": b}), String::new())]);
        let backward = start(vec![(json!({"x": b}), String::new()), (json!({"x": a}), String::new())]);
        prop_assert_eq!(forward, json!({"x": b}));
        prop_assert_eq!(backward, json!({"x": a}));
    }

    #[test]
    fn blank_conditions_behave_like_none(blank in "[ \t\r\n]{0,6}(# note\n)?") {
        let facts = StaticFacts::new();
        prop_assert_eq!(ConditionParser::new(&facts).parse(&blank).unwrap(), None);
        prop_assert_eq!(start(vec![(json!({"x": 1}), blank)]), json!({"x": 1}));
    }

    #[test]
    fn condition_display_round_trips(text in condition_text_strategy()) {
        let facts = StaticFacts::new();
        let parser = ConditionParser::new(&facts);
        let parsed: Condition = parser.parse(&text).unwrap().unwrap();
        let reparsed = parser.parse(&parsed.to_string()).unwrap().unwrap();
        prop_assert_eq!(parsed.resolve(&facts), reparsed.resolve(&facts));
        prop_assert_eq!(parsed, reparsed);
    }
}
