//! Field conditions: one fact compared against one literal value.
//!
//! Responsibilities:
//! - Define which operators each kind of field accepts.
//! - Compare live (machine) or parse-time (special-string) facts against values.
//!
//! Invariants:
//! - A `FieldCondition` is only constructed with an operator valid for its field.
//! - `*` is a wildcard for every field; `any` is also a wildcard for `os` and `arch`.
//! - Negated operators (`!=`, `!==`, `!^`, `!$`, `!~`) invert the positive answer,
//!   wildcards included.

use std::fmt;

use crate::error::{ConditionError, ParseError};
use crate::facts::{Facts, machine_name};

const EQUALITY_OPERATORS: &[&str] = &["=", "==", "===", "!=", "!=="];
const STRING_OPERATORS: &[&str] = &[
    "=", "==", "===", "!=", "!==", "^", "$", "~", "!^", "!$", "!~",
];
const NUMBER_OPERATORS: &[&str] = &["=", "==", "===", "!=", "!==", ">", ">=", "<", "<="];

const UNIX_PLATFORMS: &[&str] = &["linux", "freebsd", "openbsd", "sunos", "aix", "darwin"];
const ARCH_32: &[&str] = &["arm", "ia32", "mips", "ppc", "s390", "x32"];
const ARCH_64: &[&str] = &["arm64", "mipsel", "ppc64", "s390x", "x64"];

/// The fact a field condition reads.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Os,
    Arch,
    Hostname,
    Uname,
    Machine,
    Cpus,
    Cwd,
    /// A special string that resolved to a boolean at parse time.
    Boolean { reference: String, source: bool },
    /// A special string that resolved to a number at parse time.
    Number { reference: String, source: i64 },
    /// A special string that resolved to text at parse time.
    Text { reference: String, source: String },
}

/// How a field's value is compared, which decides its valid operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Equality,
    String,
    Number,
}

impl FieldKind {
    pub fn operators(self) -> &'static [&'static str] {
        match self {
            Self::Equality => EQUALITY_OPERATORS,
            Self::String => STRING_OPERATORS,
            Self::Number => NUMBER_OPERATORS,
        }
    }

    pub fn is_operator_valid(self, operator: &str) -> bool {
        self.operators().contains(&operator)
    }
}

impl Field {
    /// Machine field for a (case-insensitive) field name.
    pub fn machine(name: &str) -> Option<Self> {
        let field = match name.to_lowercase().as_str() {
            "os" => Self::Os,
            "arch" => Self::Arch,
            "hostname" => Self::Hostname,
            "uname" | "type" => Self::Uname,
            "machine" | "server" => Self::Machine,
            "cpus" | "cpu" | "cpucount" => Self::Cpus,
            "cwd" | "currentdir" => Self::Cwd,
            _ => return None,
        };
        Some(field)
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Os | Self::Arch | Self::Boolean { .. } => FieldKind::Equality,
            Self::Hostname | Self::Uname | Self::Machine | Self::Cwd | Self::Text { .. } => {
                FieldKind::String
            }
            Self::Cpus | Self::Number { .. } => FieldKind::Number,
        }
    }

    /// Name used when re-serializing the condition.
    pub fn name(&self) -> &str {
        match self {
            Self::Os => "os",
            Self::Arch => "arch",
            Self::Hostname => "hostname",
            Self::Uname => "uname",
            Self::Machine => "machine",
            Self::Cpus => "cpus",
            Self::Cwd => "cwd",
            Self::Boolean { reference, .. }
            | Self::Number { reference, .. }
            | Self::Text { reference, .. } => reference,
        }
    }
}

/// Parsed comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Comparison {
    Equal,
    StartsWith,
    EndsWith,
    Contains,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
}

fn split_operator(operator: &str) -> Option<(Comparison, bool)> {
    let (negated, rest) = match operator.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, operator),
    };
    let comparison = match rest {
        "=" | "==" | "===" => Comparison::Equal,
        "^" => Comparison::StartsWith,
        "$" => Comparison::EndsWith,
        "~" => Comparison::Contains,
        ">" => Comparison::Greater,
        ">=" => Comparison::GreaterOrEqual,
        "<" => Comparison::Less,
        "<=" => Comparison::LessOrEqual,
        _ => return None,
    };
    Some((comparison, negated))
}

/// `field <operator> value`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCondition {
    field: Field,
    operator: String,
    value: String,
    comparison: Comparison,
    negated: bool,
}

impl FieldCondition {
    /// Build a field condition, validating the operator and value for the field.
    ///
    /// `value` is kept as written (quotes included) for re-serialization.
    pub fn new(field: Field, operator: &str, value: &str) -> Result<Self, ConditionError> {
        let invalid = || ConditionError::InvalidOperator {
            field: field.name().to_string(),
            operator: operator.to_string(),
        };
        if !field.kind().is_operator_valid(operator) {
            return Err(invalid());
        }
        let (comparison, negated) = split_operator(operator).ok_or_else(invalid)?;

        let condition = Self {
            field,
            operator: operator.to_string(),
            value: value.to_string(),
            comparison,
            negated,
        };
        condition.validate_value()?;
        Ok(condition)
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn operator(&self) -> &str {
        &self.operator
    }

    /// The value as written.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The value with one layer of matching quotes removed.
    pub fn unquoted_value(&self) -> &str {
        let v = self.value.as_str();
        for quote in ['"', '\''] {
            if v.len() >= 2 && v.starts_with(quote) && v.ends_with(quote) {
                return &v[1..v.len() - 1];
            }
        }
        v
    }

    fn is_wildcard(&self) -> bool {
        let value = self.unquoted_value();
        value == "*"
            || (matches!(self.field, Field::Os | Field::Arch) && value.eq_ignore_ascii_case("any"))
    }

    fn validate_value(&self) -> Result<(), ConditionError> {
        if self.is_wildcard() {
            return Ok(());
        }
        let value = self.unquoted_value();
        let valid = match self.field.kind() {
            FieldKind::Number => value.parse::<i64>().is_ok(),
            FieldKind::Equality if matches!(self.field, Field::Boolean { .. }) => {
                value.parse_bool().is_some()
            }
            _ => true,
        };
        if valid {
            Ok(())
        } else {
            Err(ConditionError::Parse(ParseError {
                message: format!(
                    "Invalid value '{}' for field '{}'.",
                    self.value,
                    self.field.name()
                ),
                line: 1,
                column: 1,
                origin: None,
            }))
        }
    }

    /// Evaluate against the given facts.
    pub fn resolve(&self, facts: &dyn Facts) -> bool {
        let answer = if self.is_wildcard() {
            true
        } else {
            let value = self.unquoted_value();
            match &self.field {
                Field::Os => os_matches(&facts.platform(), value),
                Field::Arch => arch_matches(&facts.arch(), value),
                Field::Hostname => self.compare_text(&facts.hostname(), value),
                Field::Uname => self.compare_text(&facts.os_type(), value),
                Field::Machine => self.compare_text(machine_name(&facts.hostname()), value),
                Field::Cwd => self.compare_text(&facts.cwd(), value),
                Field::Text { source, .. } => self.compare_text(source, value),
                Field::Cpus => {
                    let cpus = i64::try_from(facts.cpus()).unwrap_or(i64::MAX);
                    self.compare_number(cpus, value)
                }
                Field::Number { source, .. } => self.compare_number(*source, value),
                Field::Boolean { source, .. } => value.parse_bool() == Some(*source),
            }
        };

        if self.negated { !answer } else { answer }
    }

    fn compare_text(&self, source: &str, value: &str) -> bool {
        match self.comparison {
            Comparison::Equal => source == value,
            Comparison::StartsWith => source.starts_with(value),
            Comparison::EndsWith => source.ends_with(value),
            Comparison::Contains => source.contains(value),
            _ => false,
        }
    }

    fn compare_number(&self, source: i64, value: &str) -> bool {
        let Ok(value) = value.parse::<i64>() else {
            return false;
        };
        match self.comparison {
            Comparison::Equal => source == value,
            Comparison::Greater => source > value,
            Comparison::GreaterOrEqual => source >= value,
            Comparison::Less => source < value,
            Comparison::LessOrEqual => source <= value,
            _ => false,
        }
    }
}

trait ParseBool {
    fn parse_bool(&self) -> Option<bool>;
}

impl ParseBool for str {
    fn parse_bool(&self) -> Option<bool> {
        if self.eq_ignore_ascii_case("true") {
            Some(true)
        } else if self.eq_ignore_ascii_case("false") {
            Some(false)
        } else {
            None
        }
    }
}

fn os_matches(platform: &str, value: &str) -> bool {
    match value.to_lowercase().as_str() {
        "win" | "win32" | "windows" | "mswin" | "microsoft" => platform == "win32",
        "unix" => UNIX_PLATFORMS.contains(&platform),
        "darwin" | "apple" | "macos" | "mac" => platform == "darwin",
        "linux" | "freebsd" | "openbsd" | "sunos" | "aix" => platform == value.to_lowercase(),
        _ => false,
    }
}

fn arch_matches(arch: &str, value: &str) -> bool {
    match value.to_lowercase().as_str() {
        "32" => ARCH_32.contains(&arch),
        "64" => ARCH_64.contains(&arch),
        "x86_64" => arch == "x64",
        "aarch64" => arch == "arm64",
        "x86" => arch == "ia32",
        other => arch == other,
    }
}

impl fmt::Display for FieldCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.field.name(), self.operator, self.value)
    }
}
