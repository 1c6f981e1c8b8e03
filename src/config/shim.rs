//! Typed shim configuration

use sccache_shim_tools::ToolConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the shim avoids invoking itself forever.
///
/// The cache re-invokes the compiler by name, and the first thing on the
/// search path under that name is the shim again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Detect "inside the cache" by the parent process's executable, then
    /// skip our own file while searching for the real compiler.
    #[default]
    ParentCheck,
    /// Remove our own directory from the search path before delegating.
    PathExclusion,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::ParentCheck => "parent-check",
            Strategy::PathExclusion => "path-exclusion",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "parent-check" | "parent" | "a" | "A" => Ok(Strategy::ParentCheck),
            "path-exclusion" | "path" | "b" | "B" => Ok(Strategy::PathExclusion),
            other => Err(format!(
                "unknown strategy '{}' (expected parent-check or path-exclusion)",
                other
            )),
        }
    }
}

/// Resolved configuration consumed by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShimConfig {
    /// Recursion-avoidance strategy
    #[serde(default)]
    pub strategy: Strategy,

    /// Variable holding the cache binary's path
    pub cache_env_var: String,

    /// Variable exported to mark "already passed through the cache"
    pub sentinel_env_var: String,

    /// Search-path variable
    pub path_env_var: String,

    /// Allow-list extensions
    #[serde(default)]
    pub tools: ToolConfig,
}

impl Default for ShimConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            cache_env_var: "SCCACHE_PATH".to_string(),
            sentinel_env_var: "SCCACHE_SHIM_ACTIVE".to_string(),
            path_env_var: "PATH".to_string(),
            tools: ToolConfig::default(),
        }
    }
}

impl ShimConfig {
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_cache_env_var(mut self, var: impl Into<String>) -> Self {
        self.cache_env_var = var.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_parent_check() {
        let config = ShimConfig::default();
        assert_eq!(config.strategy, Strategy::ParentCheck);
        assert_eq!(config.cache_env_var, "SCCACHE_PATH");
        assert_eq!(config.sentinel_env_var, "SCCACHE_SHIM_ACTIVE");
        assert_eq!(config.path_env_var, "PATH");
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!("path-exclusion".parse::<Strategy>(), Ok(Strategy::PathExclusion));
        assert_eq!(" parent-check ".parse::<Strategy>(), Ok(Strategy::ParentCheck));
        assert_eq!("B".parse::<Strategy>(), Ok(Strategy::PathExclusion));
        assert!("sometimes".parse::<Strategy>().is_err());
    }

    #[test]
    fn test_strategy_serde_kebab_case() {
        let json = serde_json::to_string(&Strategy::PathExclusion).unwrap();
        assert_eq!(json, "\"path-exclusion\"");
        let parsed: Strategy = serde_json::from_str("\"parent-check\"").unwrap();
        assert_eq!(parsed, Strategy::ParentCheck);
    }
}
