//! Shared test utilities for tierconf integration tests.
//!
//! Responsibilities:
//! - Provide a hermetic CLI command factory that prevents dotenv loading.
//! - Write configuration trees into temporary directories.
//!
//! Invariants / Assumptions:
//! - All integration tests using this helper will be hermetic by default.
//! - Loader variables from the host (`TIERCONF_*`) never reach the child process.

use assert_cmd::Command;
use std::fs;
use std::path::Path;

/// Returns a hermetic `tierconf` command for integration testing.
///
/// It ensures:
/// - `DOTENV_DISABLED=1` is set to prevent local `.env` contamination.
/// - Loader variables are cleared to ensure no leakage from the host.
pub fn tierconf_cmd() -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("tierconf");

    cmd.env("DOTENV_DISABLED", "1");
    cmd.env_remove("TIERCONF_ENCODING")
        .env_remove("TIERCONF_EXTENSION")
        .env_remove("TIERCONF_BASE_DIR")
        .env_remove("RUST_LOG");

    cmd
}

/// Write `files` (relative path, contents) under `root`, creating parent directories.
#[allow(dead_code)]
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (relative, contents) in files {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }
}
