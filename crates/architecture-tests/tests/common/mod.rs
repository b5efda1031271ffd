//! Shared helpers for architecture tests.
//!
//! Invariants:
//! - Paths are resolved from this crate's manifest, never the working directory.
//! - Build output (`target/`) and this crate's own sources are never scanned.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Root of the workspace (two levels above this crate).
pub fn workspace_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .ancestors()
        .nth(2)
        .unwrap_or(manifest_dir)
        .to_path_buf()
}

/// Every `.rs` file under `<workspace>/crates`, sorted.
pub fn crate_sources() -> Vec<PathBuf> {
    let crates_dir = workspace_root().join("crates");
    assert!(
        crates_dir.exists(),
        "crates/ directory not found at {:?}",
        crates_dir
    );

    let mut files: Vec<PathBuf> = WalkDir::new(&crates_dir)
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name();
            name != "target" && name != "architecture-tests"
        })
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "rs"))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// Path relative to the workspace root, for messages.
pub fn relative(path: &Path) -> String {
    path.strip_prefix(workspace_root())
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// True for integration test files and test-only module files.
#[allow(dead_code)]
pub fn is_test_source(path: &Path) -> bool {
    let path = relative(path);
    path.contains("/tests/") || path.ends_with("tests.rs") || path.contains("/benches/")
}
