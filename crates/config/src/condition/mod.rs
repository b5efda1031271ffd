//! Boolean condition expressions gating configuration sources.
//!
//! Responsibilities:
//! - Represent parsed conditions as an immutable tree (`Condition`).
//! - Evaluate a tree against a `Facts` provider.
//! - Re-serialize a tree to its canonical text form (`Display`).
//!
//! Does NOT handle:
//! - Reading facts (see `facts`).
//!
//! Invariants:
//! - Evaluation is left-then-right and has no side effects beyond reading facts.
//! - The canonical form re-parses to the same tree: a binary right operand is
//!   parenthesized, since the parser only builds left-leaning chains.

mod field;
mod parser;
mod registry;

use std::fmt;

use crate::facts::Facts;

pub use field::{Field, FieldCondition, FieldKind};
pub use parser::ConditionParser;

/// A parsed condition expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    True,
    False,
    Not(Box<Condition>),
    And(Box<Condition>, Box<Condition>),
    Or(Box<Condition>, Box<Condition>),
    /// Parenthesized sub-expression.
    Group(Box<Condition>),
    Field(FieldCondition),
}

impl Condition {
    pub fn not(condition: Condition) -> Self {
        Self::Not(Box::new(condition))
    }

    pub fn and(left: Condition, right: Condition) -> Self {
        Self::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Condition, right: Condition) -> Self {
        Self::Or(Box::new(left), Box::new(right))
    }

    pub fn group(condition: Condition) -> Self {
        Self::Group(Box::new(condition))
    }

    /// Evaluate this condition against the given facts.
    pub fn resolve(&self, facts: &dyn Facts) -> bool {
        match self {
            Self::True => true,
            Self::False => false,
            Self::Not(inner) => !inner.resolve(facts),
            Self::And(left, right) => left.resolve(facts) && right.resolve(facts),
            Self::Or(left, right) => left.resolve(facts) || right.resolve(facts),
            Self::Group(inner) => inner.resolve(facts),
            Self::Field(field) => field.resolve(facts),
        }
    }

    fn is_binary(&self) -> bool {
        matches!(self, Self::And(..) | Self::Or(..))
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_binary() {
            write!(f, "({self})")
        } else {
            write!(f, "{self}")
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::True => f.write_str("true"),
            Self::False => f.write_str("false"),
            Self::Not(inner) => {
                f.write_str("not ")?;
                inner.fmt_operand(f)
            }
            Self::And(left, right) => {
                write!(f, "{left} and ")?;
                right.fmt_operand(f)
            }
            Self::Or(left, right) => {
                write!(f, "{left} or ")?;
                right.fmt_operand(f)
            }
            Self::Group(inner) => write!(f, "({inner})"),
            Self::Field(field) => write!(f, "{field}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::StaticFacts;

    #[test]
    fn test_literals_and_combinators() {
        let facts = StaticFacts::new();
        assert!(Condition::True.resolve(&facts));
        assert!(!Condition::False.resolve(&facts));
        assert!(!Condition::not(Condition::True).resolve(&facts));
        assert!(!Condition::and(Condition::True, Condition::False).resolve(&facts));
        assert!(Condition::and(Condition::True, Condition::True).resolve(&facts));
        assert!(Condition::or(Condition::False, Condition::True).resolve(&facts));
        assert!(!Condition::or(Condition::False, Condition::False).resolve(&facts));
        assert!(Condition::group(Condition::True).resolve(&facts));
    }

    #[test]
    fn test_display_parenthesizes_binary_right_operands() {
        let left_chain = Condition::and(
            Condition::and(Condition::True, Condition::False),
            Condition::True,
        );
        assert_eq!(left_chain.to_string(), "true and false and true");

        let right_nested = Condition::and(
            Condition::True,
            Condition::or(Condition::False, Condition::True),
        );
        assert_eq!(right_nested.to_string(), "true and (false or true)");

        let negated = Condition::not(Condition::and(Condition::True, Condition::False));
        assert_eq!(negated.to_string(), "not (true and false)");
        assert_eq!(Condition::not(Condition::False).to_string(), "not false");
    }
}
