//! Purpose: Keep library and CLI code free of `unwrap()`/`expect()`.
//!
//! Errors are returned as `ConfigError` (library) or `anyhow::Error` (CLI);
//! panicking shortcuts are allowed only in tests and benches.
//!
//! Non-scope: Test modules are recognised by the first `#[cfg(test)]` line;
//! everything after it in a file is treated as test code.

mod common;

use std::fs;

const FORBIDDEN: &[&str] = &[".unwrap()", ".expect("];

/// Production part of a source file: everything before `#[cfg(test)]`.
fn production_part(content: &str) -> &str {
    content
        .find("#[cfg(test)]")
        .map_or(content, |index| &content[..index])
}

#[test]
fn test_no_unwrap_or_expect_outside_tests() {
    let mut violations: Vec<String> = Vec::new();

    for path in common::crate_sources() {
        if common::is_test_source(&path) {
            continue;
        }
        let content = fs::read_to_string(&path).unwrap_or_default();

        for (i, line) in production_part(&content).lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.starts_with("//") {
                continue;
            }
            if let Some(call) = FORBIDDEN.iter().find(|call| trimmed.contains(*call)) {
                violations.push(format!(
                    "{}:{}: `{}` in non-test code - propagate the error instead",
                    common::relative(&path),
                    i + 1,
                    call
                ));
            }
        }
    }

    assert!(
        violations.is_empty(),
        "Found panicking calls in production code:\n{}",
        violations.join("\n")
    );
}

#[test]
fn test_production_part_stops_at_test_module() {
    let source = "fn a() -> Option<u8> { None }\n#[cfg(test)]\nmod tests { fn b() { a().unwrap(); } }\n";
    assert!(!production_part(source).contains("unwrap"));
    assert_eq!(production_part("fn a() {}"), "fn a() {}");
}
