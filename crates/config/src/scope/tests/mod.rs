//! Tests for configuration scopes and the scope registry.
//!
//! Responsibilities:
//! - Test the scope lifecycle and its illegal transitions.
//! - Test merging, condition filtering and reference resolution at `start()`.
//! - Test loading files and directories from disk.
//! - Test registry lookup and teardown.
//!
//! Invariants:
//! - Scopes under test read `StaticFacts`, never the live machine.
//! - Temporary directories are cleaned up automatically via `tempfile`.

use std::sync::Arc;

use crate::facts::StaticFacts;
use crate::scope::ConfigScope;

pub mod merge_tests;

/// An initialised scope evaluating conditions against `facts`.
pub fn open_scope_with(facts: StaticFacts) -> ConfigScope {
    let mut scope = ConfigScope::new("test").with_facts(Arc::new(facts));
    scope.init().unwrap();
    scope
}

/// An initialised scope on a default linux/x64 machine.
pub fn open_scope() -> ConfigScope {
    open_scope_with(StaticFacts::new())
}
