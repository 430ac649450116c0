//! Loader composing the process environment with an optional env file.
//!
//! Responsibilities:
//! - Snapshot an environment store, merge parsed file values on top
//!   (file wins), and wrap the result in an [`EnvDict`].
//! - Optionally write the merged mapping back into the store.
//!
//! Does NOT handle:
//! - File syntax (see `parser.rs`) or casting rules (see `cast.rs`).
//!
//! Invariants / Assumptions:
//! - With `load_globally` set (the default), every merged key/value is
//!   written back into the process-wide environment, a deliberate
//!   global-state side effect that persists until process exit.
//! - No synchronization is provided; multi-threaded hosts must serialize
//!   calls to `load` themselves.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cast::{CastError, CastFn, Value};
use crate::dict::{EnvDict, Schema};
use crate::error::EnvError;
use crate::parser::read_file_values;

/// The environment store the loader reads from and writes back to.
///
/// Injected so hosts can test loading without touching real process
/// state; production code uses [`ProcessEnv`].
pub trait EnvStore {
    /// The current mapping, snapshotted at call time.
    fn snapshot(&self) -> HashMap<String, String>;

    /// Write one key/value pair into the store.
    fn set(&mut self, key: &str, value: &str);
}

/// [`EnvStore`] bound to the real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvStore for ProcessEnv {
    fn snapshot(&self) -> HashMap<String, String> {
        std::env::vars().collect()
    }

    fn set(&mut self, key: &str, value: &str) {
        // SAFETY: mutating the process environment is only sound while no
        // other thread concurrently reads or writes it. `load_globally`
        // documents this requirement; threaded hosts serialize `load`.
        unsafe { std::env::set_var(key, value) }
    }
}

/// In-memory [`EnvStore`] for hosts and tests that must not mutate the
/// real process environment.
#[derive(Debug, Default, Clone)]
pub struct MemoryEnv {
    vars: HashMap<String, String>,
}

impl MemoryEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl EnvStore for MemoryEnv {
    fn snapshot(&self) -> HashMap<String, String> {
        self.vars.clone()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.vars.insert(key.to_owned(), value.to_owned());
    }
}

impl<K, V> FromIterator<(K, V)> for MemoryEnv
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Builder that gathers the environment, merges an optional env file, and
/// produces an [`EnvDict`].
///
/// Defaults: `fail_silently = true`, `load_globally = true`.
pub struct Loader {
    env_file: Option<PathBuf>,
    fail_silently: bool,
    load_globally: bool,
    casts: Vec<(String, CastFn)>,
    schema: Schema,
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

impl Loader {
    pub fn new() -> Self {
        Self {
            env_file: None,
            fail_silently: true,
            load_globally: true,
            casts: Vec::new(),
            schema: Schema::new(),
        }
    }

    /// Merge values parsed from `path` on top of the environment snapshot.
    pub fn env_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.env_file = Some(path.into());
        self
    }

    /// Whether an unreadable env file degrades to an empty mapping
    /// (logged) instead of propagating as [`EnvError::Io`].
    pub fn fail_silently(mut self, fail_silently: bool) -> Self {
        self.fail_silently = fail_silently;
        self
    }

    /// Whether the merged mapping is written back into the store.
    pub fn load_globally(mut self, load_globally: bool) -> Self {
        self.load_globally = load_globally;
        self
    }

    /// Register a cast override for the resulting dictionary.
    pub fn cast<F>(mut self, tag: impl Into<String>, cast: F) -> Self
    where
        F: Fn(&str) -> Result<Value, CastError> + Send + Sync + 'static,
    {
        self.casts.push((tag.into(), Arc::new(cast)));
        self
    }

    /// Replace the schema applied to the resulting dictionary.
    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    /// Add one schema entry.
    pub fn schema_entry(mut self, key: impl Into<String>, tag: impl Into<String>) -> Self {
        self.schema.insert(key.into(), tag.into());
        self
    }

    /// Load against the real process environment.
    pub fn load(self) -> Result<EnvDict, EnvError> {
        self.load_from(&mut ProcessEnv)
    }

    /// Load against an injected store.
    pub fn load_from(self, store: &mut dyn EnvStore) -> Result<EnvDict, EnvError> {
        let mut data = store.snapshot();
        if let Some(path) = &self.env_file {
            data.extend(read_file_values(path, self.fail_silently)?);
        }
        if self.load_globally {
            for (key, value) in &data {
                store.set(key, value);
            }
        }

        let mut builder = EnvDict::builder().values(data).schema(self.schema);
        for (tag, cast) in self.casts {
            builder = builder.cast_fn(tag, cast);
        }
        builder.build()
    }
}

/// Load with the defaults: read the process environment, merge `env_file`
/// when given (file wins), write the merged mapping back globally, fail
/// silently on unreadable files.
pub fn load(env_file: Option<&Path>) -> Result<EnvDict, EnvError> {
    let mut loader = Loader::new();
    if let Some(path) = env_file {
        loader = loader.env_file(path);
    }
    loader.load()
}
