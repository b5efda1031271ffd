//! Configuration scopes: accumulate sources, merge, resolve and freeze.
//!
//! Responsibilities:
//! - Drive the scope lifecycle (`init`, `add`, `start`, `stop`, `reset`).
//! - Turn `add()` inputs (mappings, notation text, files, directories) into sources.
//! - Merge matching sources in order and resolve references at `start()`.
//!
//! Does NOT handle:
//! - Parsing notation or conditions (see `notation` and `condition`).
//! - Looking scopes up by name (see `Registry`).
//!
//! Invariants:
//! - `add()` is atomic: a failing input contributes no sources.
//! - A failed `start()` leaves the scope Open with its sources intact.
//! - Directory entries load in lexicographic filename order.

mod options;
mod registry;

use std::fmt;
use std::fs;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, trace};

pub use options::{Encoding, ScopeOptions, env_var_or_none};
pub use registry::{Registry, ScopeHandle};

use crate::condition::ConditionParser;
use crate::error::{ConfigError, Result};
use crate::facts::{Facts, SystemFacts};
use crate::notation::NotationParser;
use crate::resolver::Resolver;
use crate::source::{ConfigInput, ConfigSource};
use crate::tree::deep_merge;
use crate::view::Config;

/// Lifecycle state of a `ConfigScope`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeState {
    /// Created but not initialised; nothing is accepted yet.
    Unstarted,
    /// Accepting sources.
    Open,
    /// Frozen and queryable.
    Started,
}

impl ScopeState {
    fn describe(self) -> &'static str {
        match self {
            Self::Unstarted => "uninitialized",
            Self::Open => "open",
            Self::Started => "started",
        }
    }
}

impl fmt::Display for ScopeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// One isolated configuration: its queued sources and, once started, the frozen tree.
pub struct ConfigScope {
    name: String,
    state: ScopeState,
    sources: Vec<ConfigSource>,
    config: Option<Config>,
    facts: Arc<dyn Facts>,
    options: ScopeOptions,
}

impl fmt::Debug for ConfigScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigScope")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("sources", &self.sources.len())
            .field("options", &self.options)
            .finish()
    }
}

impl ConfigScope {
    /// A new, uninitialised scope reading live machine facts.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        debug!(scope = %name, "Created configuration scope");
        Self {
            name,
            state: ScopeState::Unstarted,
            sources: Vec::new(),
            config: None,
            facts: Arc::new(SystemFacts::new()),
            options: ScopeOptions::default(),
        }
    }

    /// Evaluate conditions and special strings against `facts` instead of the live machine.
    pub fn with_facts(mut self, facts: Arc<dyn Facts>) -> Self {
        self.facts = facts;
        self
    }

    pub fn with_options(mut self, options: ScopeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> ScopeState {
        self.state
    }

    pub fn is_started(&self) -> bool {
        self.state == ScopeState::Started
    }

    /// Every queued source, in merge order.
    pub fn sources(&self) -> &[ConfigSource] {
        &self.sources
    }

    pub fn options(&self) -> &ScopeOptions {
        &self.options
    }

    /// The frozen configuration, once started.
    pub fn config(&self) -> Option<&Config> {
        self.config.as_ref()
    }

    /// Open the scope for `add()`. A no-op when already open.
    pub fn init(&mut self) -> Result<()> {
        match self.state {
            ScopeState::Unstarted => {
                self.state = ScopeState::Open;
                debug!(scope = %self.name, "Initialised configuration scope");
                Ok(())
            }
            ScopeState::Open => Ok(()),
            ScopeState::Started => Err(self.illegal("init")),
        }
    }

    /// Queue configuration content gated by `conditions` (empty for none).
    ///
    /// Text that names an existing file or directory is loaded from disk;
    /// any other text is parsed as notation.
    #[track_caller]
    pub fn add(&mut self, content: impl Into<ConfigInput>, conditions: &str) -> Result<()> {
        let encoding = self.options.encoding;
        self.add_with_encoding(content, conditions, encoding)
    }

    /// `add()` reading files with `encoding` instead of the scope default.
    #[track_caller]
    pub fn add_with_encoding(
        &mut self,
        content: impl Into<ConfigInput>,
        conditions: &str,
        encoding: Encoding,
    ) -> Result<()> {
        let caller = Location::caller();
        let origin = format!("{}:{}", caller.file(), caller.line());

        if self.state != ScopeState::Open {
            return Err(self.illegal("add"));
        }

        let sources = self.load(content.into(), &origin, conditions, encoding)?;
        debug!(
            scope = %self.name,
            origin = %origin,
            count = sources.len(),
            "Added configuration sources"
        );
        self.sources.extend(sources);
        Ok(())
    }

    /// Merge matching sources, resolve references and freeze the result.
    ///
    /// Idempotent once started. On failure the scope stays Open.
    pub fn start(&mut self) -> Result<()> {
        match self.state {
            ScopeState::Started => return Ok(()),
            ScopeState::Unstarted => return Err(self.illegal("start")),
            ScopeState::Open => {}
        }

        let facts = self.facts.as_ref();
        let mut merged = Map::new();
        for source in &self.sources {
            if source.matches(facts) {
                deep_merge(&mut merged, source.content());
            } else {
                trace!(scope = %self.name, source = %source, "Skipping source: conditions not met");
            }
        }

        let mut root = Value::Object(merged);
        Resolver::new(facts).resolve(&mut root)?;

        self.config = Some(Config::new(root));
        self.state = ScopeState::Started;
        debug!(scope = %self.name, sources = self.sources.len(), "Started configuration scope");
        Ok(())
    }

    /// Discard the frozen tree and reopen. Queued sources are kept.
    pub fn stop(&mut self) {
        if self.state == ScopeState::Started {
            self.config = None;
            self.state = ScopeState::Open;
            debug!(scope = %self.name, "Stopped configuration scope");
        }
    }

    /// Drop every queued source. Fails while started.
    pub fn reset(&mut self) -> Result<()> {
        if self.state == ScopeState::Started {
            return Err(ConfigError::IllegalStateReset);
        }
        self.sources.clear();
        debug!(scope = %self.name, "Reset configuration scope");
        Ok(())
    }

    fn illegal(&self, operation: &'static str) -> ConfigError {
        ConfigError::IllegalStateTransition {
            operation,
            state: self.state.describe(),
        }
    }

    fn load(
        &self,
        input: ConfigInput,
        origin: &str,
        conditions: &str,
        encoding: Encoding,
    ) -> Result<Vec<ConfigSource>> {
        match input {
            ConfigInput::Object(map) => {
                let condition = ConditionParser::new(self.facts.as_ref())
                    .parse(conditions)
                    .map_err(|source| ConfigError::Condition {
                        origin: origin.to_string(),
                        source,
                    })?;
                Ok(vec![ConfigSource::new(origin, map, condition)])
            }
            ConfigInput::Text(text) => self.load_text(&text, origin, conditions, encoding),
            ConfigInput::Path(path) => match self.locate(&path) {
                Some(found) => self.load_path(&found, conditions, encoding),
                None => Err(ConfigError::InvalidConfigurationContent(format!(
                    "no such file or directory: {}",
                    path.display()
                ))),
            },
            ConfigInput::Invalid(reason) => Err(ConfigError::InvalidConfigurationContent(reason)),
        }
    }

    fn load_text(
        &self,
        text: &str,
        origin: &str,
        conditions: &str,
        encoding: Encoding,
    ) -> Result<Vec<ConfigSource>> {
        if text.is_empty() {
            return Err(ConfigError::InvalidConfigurationContent(
                "empty string".to_string(),
            ));
        }

        let single_line = !text.contains(['\n', '\r']);
        if single_line {
            if let Some(found) = self.locate(Path::new(text.trim())) {
                return self.load_path(&found, conditions, encoding);
            }
        }

        let parsed = NotationParser::new(self.facts.as_ref()).parse(origin, text, conditions);
        match parsed {
            Err(ConfigError::Parse(_)) if single_line && self.looks_like_path(text) => {
                Err(ConfigError::InvalidConfigurationContent(format!(
                    "no such file or directory: {}",
                    text.trim()
                )))
            }
            other => other,
        }
    }

    fn looks_like_path(&self, text: &str) -> bool {
        let text = text.trim();
        text.contains(['/', '\\']) || text.ends_with(&self.options.extension)
    }

    /// Resolve `path` against the base directory, then the working directory.
    fn locate(&self, path: &Path) -> Option<PathBuf> {
        if path.as_os_str().is_empty() {
            return None;
        }
        if path.is_absolute() {
            return path.exists().then(|| path.to_path_buf());
        }
        if let Some(base) = &self.options.base_dir {
            let candidate = base.join(path);
            if candidate.exists() {
                return Some(candidate);
            }
        }
        path.exists().then(|| path.to_path_buf())
    }

    fn load_path(
        &self,
        path: &Path,
        conditions: &str,
        encoding: Encoding,
    ) -> Result<Vec<ConfigSource>> {
        if !path.is_dir() {
            return self.load_file(path, conditions, encoding);
        }

        let read_error = |source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        };
        let mut entries = fs::read_dir(path)
            .map_err(read_error)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()
            .map_err(read_error)?;
        entries.sort();

        let mut sources = Vec::new();
        for entry in entries {
            let matches_extension = entry
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.ends_with(&self.options.extension));
            if matches_extension {
                sources.extend(self.load_path(&entry, conditions, encoding)?);
            } else {
                trace!(scope = %self.name, path = %entry.display(), "Skipping directory entry");
            }
        }
        Ok(sources)
    }

    fn load_file(
        &self,
        path: &Path,
        conditions: &str,
        encoding: Encoding,
    ) -> Result<Vec<ConfigSource>> {
        let text = fs::read(path)
            .and_then(|bytes| encoding.decode(bytes))
            .map_err(|source| ConfigError::FileRead {
                path: path.to_path_buf(),
                source,
            })?;
        let origin = path.display().to_string();
        NotationParser::new(self.facts.as_ref()).parse(&origin, &text, conditions)
    }
}

#[cfg(test)]
mod tests;
