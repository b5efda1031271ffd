//! CLI exit codes for scripting and automation.
//!
//! Responsibilities:
//! - Define structured exit codes that scripts can use to distinguish error types.
//! - Map ConfigError and ConditionError variants to appropriate exit codes.
//!
//! Does NOT handle:
//! - Error message formatting (handled by anyhow Display).
//!
//! Invariants:
//! - Exit codes 1-5 are reserved for specific error categories.
//! - Errors are classified by the first configuration error found in the chain.

use tierconf_config::{ConditionError, ConfigError};

/// Structured exit codes for tierconf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success - command completed successfully.
    Success = 0,

    /// General error - unhandled or generic failure.
    GeneralError = 1,

    /// Parse error - malformed notation or condition expression.
    ///
    /// Scripts should fix the input; retrying will not help.
    ParseError = 2,

    /// Resolution error - circular reference, missing variable,
    /// unfulfilled placeholder or unknown special string.
    ResolutionError = 3,

    /// Requested property is absent and no default was given.
    NotFound = 4,

    /// A configuration file or directory could not be read.
    IoError = 5,
}

impl ExitCode {
    /// Convert the exit code to an i32 for use with std::process::exit().
    pub const fn as_i32(self) -> i32 {
        self as u8 as i32
    }
}

impl From<&ConfigError> for ExitCode {
    fn from(err: &ConfigError) -> Self {
        match err {
            ConfigError::Parse(_) | ConfigError::Condition { .. } => ExitCode::ParseError,

            ConfigError::CircularReference { .. }
            | ConfigError::InvalidVariableAssignment { .. }
            | ConfigError::UnfulfilledPlaceholder { .. }
            | ConfigError::UnresolvedSpecialString { .. } => ExitCode::ResolutionError,

            ConfigError::MissingConfigurationProperty(_) => ExitCode::NotFound,

            ConfigError::FileRead { .. } => ExitCode::IoError,

            ConfigError::InvalidConfigurationContent(_)
            | ConfigError::IllegalStateTransition { .. }
            | ConfigError::IllegalStateReset
            | ConfigError::UnsupportedEncoding(_)
            | ConfigError::Deserialize { .. } => ExitCode::GeneralError,
        }
    }
}

impl From<&ConditionError> for ExitCode {
    fn from(_: &ConditionError) -> Self {
        ExitCode::ParseError
    }
}

/// Extension trait for anyhow::Error to extract exit codes.
pub trait ExitCodeExt {
    /// Extract the appropriate exit code from this error.
    ///
    /// Returns ExitCode::GeneralError if no configuration error is in the chain.
    fn exit_code(&self) -> ExitCode;
}

impl ExitCodeExt for anyhow::Error {
    fn exit_code(&self) -> ExitCode {
        for cause in self.chain() {
            if let Some(err) = cause.downcast_ref::<ConfigError>() {
                return ExitCode::from(err);
            }
            if let Some(err) = cause.downcast_ref::<ConditionError>() {
                return ExitCode::from(err);
            }
        }
        ExitCode::GeneralError
    }
}
