//! Error types for configuration loading.
//!
//! Responsibilities:
//! - Define error variants for every failure of parsing, merging, resolving and querying.
//! - Carry enough context (origin, path, line/column) to point at the offending input.
//!
//! Does NOT handle:
//! - Mapping errors to process exit codes (see the CLI crate).
//!
//! Invariants:
//! - `ParseError` line and column numbers are 1-based.
//! - Errors raised while resolving never leave a scope in the started state.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// A syntax error in notation text or a condition expression.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} Error{} at line {line}, column {column}", in_origin(.origin))]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
    /// Document the error occurred in, when known.
    pub origin: Option<String>,
}

impl ParseError {
    /// Attach the document origin to this error.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }
}

fn in_origin(origin: &Option<String>) -> String {
    origin
        .as_ref()
        .map(|origin| format!(" in {origin}"))
        .unwrap_or_default()
}

/// Errors produced while parsing a condition expression.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConditionError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Unknown field '{field}' in condition")]
    UnknownField { field: String },

    #[error("Invalid operator '{operator}' for field '{field}'")]
    InvalidOperator { field: String, operator: String },

    #[error("Unterminated group: expected ')' at line {line}, column {column}")]
    UnterminatedGroup { line: usize, column: usize },

    #[error("Unresolved special string '{reference}'")]
    UnresolvedSpecialString { reference: String },
}

/// Errors that can occur while building or reading a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Invalid conditions in {origin}: {source}")]
    Condition {
        origin: String,
        #[source]
        source: ConditionError,
    },

    #[error("Invalid configuration content: {0}")]
    InvalidConfigurationContent(String),

    #[error("Cannot {operation}() while {state}")]
    IllegalStateTransition {
        operation: &'static str,
        state: &'static str,
    },

    #[error("Cannot reset() while started. stop() first.")]
    IllegalStateReset,

    #[error("Invalid variable circular reference at '{path}'")]
    CircularReference { path: String },

    #[error("Invalid variable assignment '{variable}' at '{path}'")]
    InvalidVariableAssignment { variable: String, path: String },

    #[error("Unfulfilled placeholder '{placeholder}' at '{path}'")]
    UnfulfilledPlaceholder { placeholder: String, path: String },

    #[error("Unresolved special string '{reference}' at '{path}'")]
    UnresolvedSpecialString { reference: String, path: String },

    #[error("Missing configuration property '{0}'")]
    MissingConfigurationProperty(String),

    #[error("Unsupported encoding '{0}'")]
    UnsupportedEncoding(String),

    #[error("Failed to read configuration file at {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to deserialize '{path}': {source}")]
    Deserialize {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ConfigError {
    /// Returns true for errors raised by the resolution phase of `start()`.
    pub fn is_resolution_error(&self) -> bool {
        matches!(
            self,
            Self::CircularReference { .. }
                | Self::InvalidVariableAssignment { .. }
                | Self::UnfulfilledPlaceholder { .. }
                | Self::UnresolvedSpecialString { .. }
        )
    }

    /// Returns true for syntax and condition errors in configuration input.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::Parse(_) | Self::Condition { .. })
    }
}
