//! Named configuration scopes shared across a process.
//!
//! Responsibilities:
//! - Map namespace names to scopes, creating each on first reference.
//! - Hand out cloneable `ScopeHandle`s that lock and delegate to the scope.
//! - Tear scopes down on request.
//!
//! Invariants:
//! - One scope per name; every handle for a name shares it.
//! - A started scope cannot be removed.
//! - Poisoned locks are recovered; scope state is only mutated through
//!   methods that leave it consistent on error.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use serde_json::Value;
use tracing::{debug, warn};

use super::{ConfigScope, Encoding, ScopeOptions, ScopeState};
use crate::constants::DEFAULT_SCOPE;
use crate::error::{ConfigError, Result};
use crate::facts::{Facts, SystemFacts};
use crate::source::{ConfigInput, ConfigSource};
use crate::view::Config;

/// Process-wide map of namespace name to configuration scope.
pub struct Registry {
    scopes: Mutex<HashMap<String, ScopeHandle>>,
    facts: Arc<dyn Facts>,
    options: ScopeOptions,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// An empty registry whose scopes read live machine facts and default options.
    pub fn new() -> Self {
        Self {
            scopes: Mutex::new(HashMap::new()),
            facts: Arc::new(SystemFacts::new()),
            options: ScopeOptions::default(),
        }
    }

    /// The shared registry, created on first use with options from the environment.
    pub fn global() -> &'static Registry {
        static GLOBAL: OnceLock<Registry> = OnceLock::new();
        GLOBAL.get_or_init(|| {
            let options = ScopeOptions::from_env().unwrap_or_else(|e| {
                warn!(error = %e, "Ignoring invalid loader environment, using defaults");
                ScopeOptions::default()
            });
            Registry::new().with_options(options)
        })
    }

    /// Facts given to scopes created from now on.
    pub fn with_facts(mut self, facts: Arc<dyn Facts>) -> Self {
        self.facts = facts;
        self
    }

    /// Options given to scopes created from now on.
    pub fn with_options(mut self, options: ScopeOptions) -> Self {
        self.options = options;
        self
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, ScopeHandle>> {
        self.scopes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The scope named `name`, created (uninitialised) on first reference.
    pub fn scope(&self, name: &str) -> ScopeHandle {
        self.lock()
            .entry(name.to_string())
            .or_insert_with(|| {
                let scope = ConfigScope::new(name)
                    .with_facts(Arc::clone(&self.facts))
                    .with_options(self.options.clone());
                ScopeHandle::new(scope)
            })
            .clone()
    }

    /// The scope of the default (empty) namespace.
    pub fn default_scope(&self) -> ScopeHandle {
        self.scope(DEFAULT_SCOPE)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lock().contains_key(name)
    }

    /// Tear down the scope named `name`. Returns false if there was none.
    ///
    /// Handles already given out keep working but are no longer reachable by name.
    pub fn remove(&self, name: &str) -> Result<bool> {
        let mut scopes = self.lock();
        if let Some(handle) = scopes.get(name) {
            if handle.is_started() {
                return Err(ConfigError::IllegalStateReset);
            }
        }
        let removed = scopes.remove(name).is_some();
        if removed {
            debug!(scope = %name, "Removed configuration scope");
        }
        Ok(removed)
    }

    /// Names of every scope, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock().keys().cloned().collect();
        names.sort();
        names
    }
}

/// Shared handle to a registered scope.
#[derive(Clone)]
pub struct ScopeHandle {
    inner: Arc<Mutex<ConfigScope>>,
}

impl std::fmt::Debug for ScopeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&*self.lock(), f)
    }
}

impl ScopeHandle {
    pub fn new(scope: ConfigScope) -> Self {
        Self {
            inner: Arc::new(Mutex::new(scope)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ConfigScope> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with exclusive access to the scope.
    pub fn with<R>(&self, f: impl FnOnce(&mut ConfigScope) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn name(&self) -> String {
        self.lock().name().to_string()
    }

    pub fn state(&self) -> ScopeState {
        self.lock().state()
    }

    pub fn is_started(&self) -> bool {
        self.lock().is_started()
    }

    pub fn init(&self) -> Result<()> {
        self.lock().init()
    }

    #[track_caller]
    pub fn add(&self, content: impl Into<ConfigInput>, conditions: &str) -> Result<()> {
        self.lock().add(content, conditions)
    }

    #[track_caller]
    pub fn add_with_encoding(
        &self,
        content: impl Into<ConfigInput>,
        conditions: &str,
        encoding: Encoding,
    ) -> Result<()> {
        self.lock().add_with_encoding(content, conditions, encoding)
    }

    pub fn start(&self) -> Result<()> {
        self.lock().start()
    }

    pub fn stop(&self) {
        self.lock().stop()
    }

    pub fn reset(&self) -> Result<()> {
        self.lock().reset()
    }

    /// The frozen configuration, once started. Cheap to clone.
    pub fn config(&self) -> Option<Config> {
        self.lock().config().cloned()
    }

    pub fn sources(&self) -> Vec<ConfigSource> {
        self.lock().sources().to_vec()
    }

    /// Value at a dotted path of the started configuration.
    pub fn get(&self, path: &str) -> Option<Value> {
        self.lock().config().and_then(|config| config.get(path).cloned())
    }

    pub fn has(&self, path: &str) -> bool {
        self.lock().config().is_some_and(|config| config.has(path))
    }
}
