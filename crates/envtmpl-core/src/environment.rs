//! Where `env` looks variables up.
//!
//! Rendering never touches `std::env` directly; it goes through an
//! [`Environment`]. [`ProcessEnv`] is the real process environment and is
//! what [`crate::generate_template`] uses. [`MapEnv`] is a fixed set of
//! variables for embedding and tests.

use std::collections::HashMap;

use crate::value::OptionalValue;

/// Source of environment variables.
pub trait Environment: Send + Sync {
    /// Look up `key`. Set-to-empty is present; unset is absent.
    fn lookup(&self, key: &str) -> OptionalValue;
}

/// The environment of the running process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn lookup(&self, key: &str) -> OptionalValue {
        // Names the OS cannot hold are never set.
        if key.is_empty() || key.contains(['=', '\0']) {
            return OptionalValue::absent();
        }
        std::env::var_os(key)
            .map(|value| value.to_string_lossy().into_owned())
            .into()
    }
}

/// A fixed, in-memory set of variables.
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }
}

impl Environment for MapEnv {
    fn lookup(&self, key: &str) -> OptionalValue {
        self.vars.get(key).cloned().into()
    }
}

impl<K, V> FromIterator<(K, V)> for MapEnv
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
