//! Centralized constants for the tierconf workspace.
//!
//! Default values and environment variable names shared by the library
//! and the command-line front end.

// =============================================================================
// Scope Defaults
// =============================================================================

/// Namespace of the default scope in a `Registry`.
pub const DEFAULT_SCOPE: &str = "";

/// Suffix of files loaded when a directory is added.
pub const DEFAULT_EXTENSION: &str = ".cfg";

// =============================================================================
// Environment Variables
// =============================================================================

/// Overrides the default file encoding.
pub const ENV_ENCODING: &str = "TIERCONF_ENCODING";

/// Overrides the suffix of files loaded from directories.
pub const ENV_EXTENSION: &str = "TIERCONF_EXTENSION";

/// Directory that relative paths are resolved against before the working directory.
pub const ENV_BASE_DIR: &str = "TIERCONF_BASE_DIR";
