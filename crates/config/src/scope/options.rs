//! Loader options for a configuration scope.
//!
//! Responsibilities:
//! - Hold the default file encoding, the directory file extension and the
//!   base directory for relative paths.
//! - Read overrides from `TIERCONF_*` environment variables.
//!
//! Invariants:
//! - Empty or whitespace-only environment variables are treated as unset.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;

use crate::constants::{DEFAULT_EXTENSION, ENV_BASE_DIR, ENV_ENCODING, ENV_EXTENSION};
use crate::error::{ConfigError, Result};

/// Read an environment variable, returning None if unset, empty, or whitespace-only.
pub fn env_var_or_none(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty())
}

/// Text encoding of configuration files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Encoding {
    #[default]
    Utf8,
    Latin1,
    Ascii,
}

impl Encoding {
    /// Decode file bytes into text.
    pub fn decode(self, bytes: Vec<u8>) -> io::Result<String> {
        match self {
            Self::Utf8 => String::from_utf8(bytes)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)),
            Self::Latin1 => Ok(bytes.into_iter().map(char::from).collect()),
            Self::Ascii => match bytes.iter().position(|b| !b.is_ascii()) {
                Some(offset) => Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("non-ASCII byte at offset {offset}"),
                )),
                None => Ok(bytes.into_iter().map(char::from).collect()),
            },
        }
    }
}

impl FromStr for Encoding {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "latin1" | "latin-1" | "iso-8859-1" => Ok(Self::Latin1),
            "ascii" | "us-ascii" => Ok(Self::Ascii),
            _ => Err(ConfigError::UnsupportedEncoding(s.to_string())),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Utf8 => "utf-8",
            Self::Latin1 => "latin1",
            Self::Ascii => "ascii",
        };
        f.write_str(name)
    }
}

/// Options applied when a scope reads files and directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeOptions {
    pub encoding: Encoding,
    /// Suffix of files loaded when a directory is added (including the dot).
    pub extension: String,
    /// Relative paths are tried against this directory before the working directory.
    pub base_dir: Option<PathBuf>,
}

impl Default for ScopeOptions {
    fn default() -> Self {
        Self {
            encoding: Encoding::default(),
            extension: DEFAULT_EXTENSION.to_string(),
            base_dir: None,
        }
    }
}

impl ScopeOptions {
    /// Defaults overridden by `TIERCONF_ENCODING`, `TIERCONF_EXTENSION` and `TIERCONF_BASE_DIR`.
    pub fn from_env() -> Result<Self> {
        let mut options = Self::default();
        if let Some(encoding) = env_var_or_none(ENV_ENCODING) {
            options.encoding = encoding.parse()?;
        }
        if let Some(extension) = env_var_or_none(ENV_EXTENSION) {
            options.extension = extension.trim().to_string();
        }
        if let Some(base_dir) = env_var_or_none(ENV_BASE_DIR) {
            options.base_dir = Some(PathBuf::from(base_dir));
        }
        Ok(options)
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }
}
