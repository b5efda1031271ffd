//! Purpose: Enforce deterministic temp file cleanup patterns in tests.
//!
//! Loader tests write configuration trees to disk; all of them must use the
//! tempfile crate's RAII types rather than std::env::temp_dir() with manual
//! cleanup.
//!
//! Non-scope: This test does not verify runtime behavior; it only checks
//! source code patterns.
//!
//! Invariants:
//! - No hardcoded /tmp paths in tests
//! - Tempdir handles are bound to a named variable for the whole test

mod common;

use std::fs;

/// Sources containing at least one test, with their contents.
fn test_sources() -> Vec<(String, String)> {
    common::crate_sources()
        .into_iter()
        .filter_map(|path| {
            let content = fs::read_to_string(&path).ok()?;
            content
                .contains("#[test]")
                .then(|| (common::relative(&path), content))
        })
        .collect()
}

#[test]
fn test_no_manual_temp_dir_usage() {
    let mut violations: Vec<String> = Vec::new();

    for (path, content) in test_sources() {
        if content.contains("std::env::temp_dir()") {
            violations.push(format!(
                "{}: uses std::env::temp_dir() - prefer tempfile::tempdir() for RAII cleanup",
                path
            ));
        }
        if content.contains("\"/tmp") || content.contains("'/tmp") {
            violations.push(format!(
                "{}: contains hardcoded /tmp path - prefer tempfile crate",
                path
            ));
        }
        if content.contains("fs::remove_file") || content.contains("fs::remove_dir_all") {
            violations.push(format!(
                "{}: removes files manually - let TempDir clean up on drop",
                path
            ));
        }
    }

    assert!(
        violations.is_empty(),
        "Found manual temp file patterns (not panic-safe):\n{}",
        violations.join("\n")
    );
}

#[test]
fn test_tempfile_bindings_retained() {
    let mut violations: Vec<String> = Vec::new();

    for (path, content) in test_sources() {
        for (i, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.starts_with("//") {
                continue;
            }

            let creates_tempdir =
                trimmed.contains("tempfile::tempdir()") || trimmed.contains("TempDir::new()");
            if trimmed.starts_with("let _ =") && creates_tempdir {
                violations.push(format!(
                    "{}:{}: tempdir bound to `_` - use a named variable for RAII cleanup",
                    path,
                    i + 1
                ));
            } else if creates_tempdir && !trimmed.starts_with("let ") {
                violations.push(format!(
                    "{}:{}: tempdir not retained - bind it to a variable for RAII cleanup",
                    path,
                    i + 1
                ));
            }
        }
    }

    assert!(
        violations.is_empty(),
        "Found tempfile instances not properly retained:\n{}",
        violations.join("\n")
    );
}
