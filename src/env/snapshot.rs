//! Immutable environment snapshot

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

/// Point-in-time copy of the inherited environment.
///
/// Keys are stored lossily as UTF-8; values keep their raw bytes so that
/// search paths with non-UTF-8 directories survive unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: BTreeMap<String, OsString>,
}

impl EnvSnapshot {
    /// Capture the current process environment.
    pub fn capture() -> Self {
        Self::from_pairs(std::env::vars_os())
    }

    /// Build a snapshot from explicit pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<OsStr>,
        V: Into<OsString>,
    {
        let vars = pairs
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_string_lossy().into_owned(), v.into()))
            .collect();
        Self { vars }
    }

    /// Raw value of a variable.
    pub fn get_os(&self, key: &str) -> Option<&OsStr> {
        self.vars.get(key).map(|v| v.as_os_str())
    }

    /// Value of a variable if set to valid UTF-8.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).and_then(|v| v.to_str())
    }

    /// Value of a variable treated as unset when empty.
    pub fn get_non_empty(&self, key: &str) -> Option<&OsStr> {
        self.get_os(key).filter(|v| !v.is_empty())
    }

    /// Path-valued variable, ignoring empty values.
    pub fn get_path(&self, key: &str) -> Option<PathBuf> {
        self.get_non_empty(key).map(PathBuf::from)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// Copy with one variable replaced.
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<OsString>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Copy with one variable removed.
    pub fn without_var(mut self, key: &str) -> Self {
        self.vars.remove(key);
        self
    }
}
