//! Allow-list configuration types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Extensions to the built-in allow-list, derived from shim config.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolConfig {
    /// Additional compiler frontend names (e.g. "gcc-13", "x86_64-linux-gnu-gcc").
    #[serde(default)]
    pub extra_compilers: BTreeSet<String>,

    /// Additional names that behave like the cache wrapper.
    #[serde(default)]
    pub extra_cache_wrappers: BTreeSet<String>,
}

impl ToolConfig {
    /// Add an extra compiler name.
    pub fn with_compiler(mut self, name: impl Into<String>) -> Self {
        self.extra_compilers.insert(name.into());
        self
    }

    /// Add an extra cache-wrapper name.
    pub fn with_cache_wrapper(mut self, name: impl Into<String>) -> Self {
        self.extra_cache_wrappers.insert(name.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ToolConfig::default();
        assert!(config.extra_compilers.is_empty());
        assert!(config.extra_cache_wrappers.is_empty());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: ToolConfig =
            serde_json::from_str(r#"{"extra_compilers": ["gcc-13"]}"#).unwrap();
        assert!(config.extra_compilers.contains("gcc-13"));
        assert!(config.extra_cache_wrappers.is_empty());
    }
}
