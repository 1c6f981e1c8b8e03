//! Built-in defaults (layer 1)

use super::shim::ShimConfig;

/// Built-in configuration values
#[derive(Debug, Clone, Default)]
pub struct BuiltinDefaults {
    config: ShimConfig,
}

impl BuiltinDefaults {
    /// Convert to JSON Value for merging
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "strategy": self.config.strategy.as_str(),
            "cache_env_var": self.config.cache_env_var,
            "sentinel_env_var": self.config.sentinel_env_var,
            "path_env_var": self.config.path_env_var,
            "tools": {
                "extra_compilers": [],
                "extra_cache_wrappers": []
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShimConfig;

    #[test]
    fn test_defaults_value() {
        let value = BuiltinDefaults::default().to_value();
        assert_eq!(value["strategy"], "parent-check");
        assert_eq!(value["cache_env_var"], "SCCACHE_PATH");
        assert_eq!(value["path_env_var"], "PATH");
        assert!(value["tools"]["extra_compilers"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_defaults_deserialize_to_default_config() {
        let value = BuiltinDefaults::default().to_value();
        let config: ShimConfig = serde_json::from_value(value).unwrap();
        assert_eq!(config, ShimConfig::default());
    }
}
