//! Hierarchical configuration loading for tierconf.
//!
//! This crate merges configuration from mappings, notation text, files and
//! directories into one read-only tree. Each source may be gated by a
//! condition over machine facts (`os = linux and cpus >= 4`), and string
//! values may reference other values (`${server.port}`) or facts
//! (`${env:HOME}`, `${hostname:name}`).
//!
//! ```no_run
//! use tierconf_config::Registry;
//!
//! let scope = Registry::global().scope("app");
//! scope.init()?;
//! scope.add("/etc/app", "")?;
//! scope.add("server.port: 8080\n[os = darwin]\nserver.port: 9090", "")?;
//! scope.start()?;
//! let port = scope.config().and_then(|c| c.get_as::<u16>("server.port").ok());
//! # Ok::<(), tierconf_config::ConfigError>(())
//! ```

pub mod condition;
pub mod constants;
mod cursor;
pub mod error;
pub mod facts;
pub mod notation;
mod resolver;
pub mod scope;
mod source;
mod tree;
mod view;

pub use condition::{Condition, ConditionParser, Field, FieldCondition, FieldKind};
pub use error::{ConditionError, ConfigError, ParseError, Result};
pub use facts::{FactValue, Facts, SPECIAL_STRINGS, StaticFacts, SystemFacts, resolve_special};
pub use notation::NotationParser;
pub use resolver::Resolver;
pub use scope::{
    ConfigScope, Encoding, Registry, ScopeHandle, ScopeOptions, ScopeState, env_var_or_none,
};
pub use source::{ConfigInput, ConfigSource};
pub use view::{Config, ConfigView};
