//! Special-string references (`namespace:key`) resolved against live facts.
//!
//! Supported namespaces: `env`, `hostname`, `process`, `os`, `string`.
//! Namespaces and keys are case-insensitive, except environment variable names.

use std::fmt;

use serde_json::Value;

use super::{Facts, domain_name, machine_name};
use crate::error::ConditionError;

/// Every special string with a fixed key, in documentation order.
pub const SPECIAL_STRINGS: &[&str] = &[
    "hostname:name",
    "hostname:domain",
    "hostname:full",
    "hostname:fqdn",
    "process:pid",
    "process:ppid",
    "process:args",
    "process:exec",
    "process:execpath",
    "process:cwd",
    "process:version",
    "process:main",
    "process:script",
    "os:arch",
    "os:type",
    "os:platform",
    "os:cpus",
    "os:homedir",
    "os:home",
    "os:user",
    "os:username",
    "os:bits",
    "string:eol",
    "string:encoding",
];

const SIXTY_FOUR_BIT: &[&str] = &["arm64", "mipsel", "ppc64", "s390x", "x64"];

/// Typed value of a resolved fact.
#[derive(Debug, Clone, PartialEq)]
pub enum FactValue {
    Bool(bool),
    Number(i64),
    String(String),
}

impl FactValue {
    pub fn into_json(self) -> Value {
        match self {
            Self::Bool(b) => Value::Bool(b),
            Self::Number(n) => Value::from(n),
            Self::String(s) => Value::String(s),
        }
    }
}

impl fmt::Display for FactValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

fn number(n: u64) -> FactValue {
    FactValue::Number(i64::try_from(n).unwrap_or(i64::MAX))
}

/// Resolve a `namespace:key` reference.
///
/// `env:<NAME>` for an unset variable resolves to an empty string.
pub fn resolve_special(reference: &str, facts: &dyn Facts) -> Result<FactValue, ConditionError> {
    let unresolved = || ConditionError::UnresolvedSpecialString {
        reference: reference.to_string(),
    };

    let (namespace, key) = reference.split_once(':').ok_or_else(unresolved)?;
    if key.is_empty() {
        return Err(unresolved());
    }
    let flavor = key.to_lowercase();

    let value = match namespace.to_lowercase().as_str() {
        "env" => FactValue::String(facts.env(key).unwrap_or_default()),
        "hostname" => {
            let hostname = facts.hostname();
            match flavor.as_str() {
                "name" => FactValue::String(machine_name(&hostname).to_string()),
                "domain" => FactValue::String(domain_name(&hostname)),
                "full" | "fqdn" => FactValue::String(hostname),
                _ => return Err(unresolved()),
            }
        }
        "process" => match flavor.as_str() {
            "pid" => number(facts.pid()),
            "ppid" => number(facts.ppid()),
            "args" => FactValue::String(facts.args().join(" ")),
            "exec" | "execpath" => FactValue::String(facts.exec_path()),
            "cwd" => FactValue::String(facts.cwd()),
            "version" => FactValue::String(facts.version()),
            "main" | "script" => FactValue::String(facts.main_path()),
            _ => return Err(unresolved()),
        },
        "os" => match flavor.as_str() {
            "arch" => FactValue::String(facts.arch()),
            "type" => FactValue::String(facts.os_type()),
            "platform" => FactValue::String(facts.platform()),
            "cpus" => number(facts.cpus()),
            "homedir" | "home" => FactValue::String(facts.home_dir()),
            "user" | "username" => FactValue::String(facts.username()),
            "bits" => {
                let bits = if SIXTY_FOUR_BIT.contains(&facts.arch().as_str()) {
                    64
                } else {
                    32
                };
                FactValue::Number(bits)
            }
            _ => return Err(unresolved()),
        },
        "string" => match flavor.as_str() {
            "eol" => FactValue::String(facts.eol()),
            "encoding" => FactValue::String("utf-8".to_string()),
            _ => return Err(unresolved()),
        },
        _ => return Err(unresolved()),
    };

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::{MockFacts, StaticFacts, SystemFacts};

    fn facts() -> StaticFacts {
        StaticFacts::new()
            .with_hostname("web1.eu.example.com")
            .with_arch("arm64")
            .with_cpus(8)
            .with_env("APP_MODE", "staging")
    }

    #[test]
    fn test_env_reference() {
        let facts = facts();
        assert_eq!(
            resolve_special("env:APP_MODE", &facts).unwrap(),
            FactValue::String("staging".to_string())
        );
        assert_eq!(
            resolve_special("env:xyz", &facts).unwrap(),
            FactValue::String(String::new())
        );
    }

    #[test]
    fn test_hostname_flavors() {
        let facts = facts();
        let resolve = |s: &str| resolve_special(s, &facts).unwrap().to_string();
        assert_eq!(resolve("hostname:name"), "web1");
        assert_eq!(resolve("hostname:domain"), "example.com");
        assert_eq!(resolve("hostname:full"), "web1.eu.example.com");
        assert_eq!(resolve("HOSTNAME:FQDN"), "web1.eu.example.com");
    }

    #[test]
    fn test_os_values_are_typed() {
        let facts = facts();
        assert_eq!(
            resolve_special("os:cpus", &facts).unwrap(),
            FactValue::Number(8)
        );
        assert_eq!(
            resolve_special("os:bits", &facts).unwrap(),
            FactValue::Number(64)
        );
        let facts = facts.with_arch("ia32");
        assert_eq!(
            resolve_special("os:bits", &facts).unwrap(),
            FactValue::Number(32)
        );
    }

    #[test]
    fn test_every_listed_special_string_resolves() {
        let facts = SystemFacts::new();
        for reference in SPECIAL_STRINGS {
            assert!(
                resolve_special(reference, &facts).is_ok(),
                "{reference} should resolve"
            );
        }
        assert_eq!(
            resolve_special("string:EOL", &facts).unwrap().to_string(),
            facts.eol()
        );
    }

    #[test]
    fn test_unresolved() {
        let facts = facts();
        for reference in ["blah", "blah:blah", "os:", "process:nope", "string:tab"] {
            assert_eq!(
                resolve_special(reference, &facts),
                Err(ConditionError::UnresolvedSpecialString {
                    reference: reference.to_string()
                })
            );
        }
    }

    #[test]
    fn test_reads_only_the_requested_fact() {
        let mut facts = MockFacts::new();
        facts
            .expect_pid()
            .times(1)
            .returning(|| 4242);

        assert_eq!(
            resolve_special("process:pid", &facts).unwrap(),
            FactValue::Number(4242)
        );
    }
}
