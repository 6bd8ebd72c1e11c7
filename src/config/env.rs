//! Environment variable access
//!
//! The resolver reads the environment through [`EnvSource`] so it never
//! touches global process state directly and tests can supply a fixed map.

use std::collections::HashMap;

/// Name of the variable holding the master password
pub const MASTER_PASSWORD_VAR: &str = "MASTER_PASSWORD";

/// Read-only source of environment variables
pub trait EnvSource {
    /// Raw value of a variable, if set and valid unicode
    fn get(&self, name: &str) -> Option<String>;

    /// Value of a variable, treating blank values as unset
    fn non_blank(&self, name: &str) -> Option<String> {
        self.get(name).filter(|value| !value.trim().is_empty())
    }
}

/// The real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// A fixed set of variables
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl EnvSource for MapEnv {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}
