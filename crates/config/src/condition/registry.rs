//! Ordered registry of field constructors consulted by the condition parser.
//!
//! The first constructor whose predicate accepts a field token builds it:
//! literals (`true`/`false`), then special-string typed fields (`env:NAME`,
//! `os:platform`, ...), then machine facts (`os`, `arch`, `hostname`, ...).

use super::{Condition, Field};
use crate::error::ConditionError;
use crate::facts::{FactValue, Facts, resolve_special};

/// What a field token turned into.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum FieldToken {
    /// A complete condition needing no operator or value.
    Literal(Condition),
    /// A fact that still needs `<operator><value>`.
    Field(Field),
}

struct FieldConstructor {
    accepts: fn(&str) -> bool,
    build: fn(&str, &dyn Facts) -> Result<FieldToken, ConditionError>,
}

const CONSTRUCTORS: &[FieldConstructor] = &[
    FieldConstructor {
        accepts: is_literal,
        build: build_literal,
    },
    FieldConstructor {
        accepts: is_special_string,
        build: build_special_string,
    },
    FieldConstructor {
        accepts: is_machine_fact,
        build: build_machine_fact,
    },
];

/// Resolve a field token with the first accepting constructor.
pub(super) fn lookup(token: &str, facts: &dyn Facts) -> Result<FieldToken, ConditionError> {
    CONSTRUCTORS
        .iter()
        .find(|constructor| (constructor.accepts)(token))
        .map(|constructor| (constructor.build)(token, facts))
        .unwrap_or_else(|| {
            Err(ConditionError::UnknownField {
                field: token.to_string(),
            })
        })
}

fn is_literal(token: &str) -> bool {
    token.eq_ignore_ascii_case("true") || token.eq_ignore_ascii_case("false")
}

fn build_literal(token: &str, _facts: &dyn Facts) -> Result<FieldToken, ConditionError> {
    let condition = if token.eq_ignore_ascii_case("true") {
        Condition::True
    } else {
        Condition::False
    };
    Ok(FieldToken::Literal(condition))
}

fn is_special_string(token: &str) -> bool {
    token.contains(':')
}

/// Special strings are resolved once, here; the fact's own type picks the field type.
///
/// Text facts stay text whatever they contain, so `env:BUILD ~ 2024` parses
/// the same way for `BUILD=2024` and `BUILD=release-2024`.
fn build_special_string(token: &str, facts: &dyn Facts) -> Result<FieldToken, ConditionError> {
    let reference = token.to_string();
    let field = match resolve_special(token, facts)? {
        FactValue::Bool(source) => Field::Boolean { reference, source },
        FactValue::Number(source) => Field::Number { reference, source },
        FactValue::String(source) => Field::Text { reference, source },
    };
    Ok(FieldToken::Field(field))
}

fn is_machine_fact(token: &str) -> bool {
    Field::machine(token).is_some()
}

fn build_machine_fact(token: &str, _facts: &dyn Facts) -> Result<FieldToken, ConditionError> {
    Field::machine(token)
        .map(FieldToken::Field)
        .ok_or_else(|| ConditionError::UnknownField {
            field: token.to_string(),
        })
}
