//! Effective configuration with provenance
//!
//! Records the merged configuration together with every source that
//! contributed to it, so `sccache-shim config` can show where a value
//! came from.

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use super::defaults::BuiltinDefaults;
use super::merge::merge_layers;
use super::shim::{ShimConfig, Strategy};
use super::{CONFIG_PATH_ENV, EXTRA_COMPILERS_ENV, STRATEGY_ENV};
use crate::env::EnvSnapshot;

/// Schema identifier for `config --json` output
pub const SCHEMA_ID: &str = "sccache-shim/effective_config@1";

/// Where a layer came from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Builtin,
    File,
    Env,
    Cli,
}

/// A contributing layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSource {
    pub origin: ConfigOrigin,

    /// File path (file layer only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 of the raw file bytes (file layer only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,

    /// Variables that produced this layer (env layer only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<String>,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {message}")]
    Io { path: String, message: String },

    #[error("cannot parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("{0}")]
    Validation(String),
}

/// Merged configuration plus provenance
#[derive(Debug, Clone, Serialize)]
pub struct EffectiveConfig {
    pub schema_id: String,

    pub created_at: DateTime<Utc>,

    /// Merged raw configuration
    pub config: Value,

    /// Contributing layers, lowest precedence first
    pub sources: Vec<ConfigSource>,

    /// Typed view of `config`
    #[serde(skip)]
    pub shim: ShimConfig,
}

impl EffectiveConfig {
    /// Load the configuration visible to this process.
    pub fn load(env: &EnvSnapshot) -> Result<Self, ConfigError> {
        Self::build(env, None)
    }

    /// Build from all layers, with optional CLI overrides on top.
    pub fn build(env: &EnvSnapshot, cli_overrides: Option<Value>) -> Result<Self, ConfigError> {
        let mut layers = vec![BuiltinDefaults::default().to_value()];
        let mut sources = vec![ConfigSource {
            origin: ConfigOrigin::Builtin,
            path: None,
            digest: None,
            keys: Vec::new(),
        }];

        if let Some((path, explicit)) = Self::config_file_path(env) {
            if path.is_file() {
                let (value, digest) = Self::load_toml_file(&path)?;
                debug!("loaded config file {}", path.display());
                layers.push(value);
                sources.push(ConfigSource {
                    origin: ConfigOrigin::File,
                    path: Some(path.to_string_lossy().into_owned()),
                    digest: Some(digest),
                    keys: Vec::new(),
                });
            } else if explicit {
                return Err(ConfigError::Io {
                    path: path.to_string_lossy().into_owned(),
                    message: format!("{} points at a missing file", CONFIG_PATH_ENV),
                });
            }
        }

        if let Some((value, keys)) = Self::env_overrides(env)? {
            layers.push(value);
            sources.push(ConfigSource {
                origin: ConfigOrigin::Env,
                path: None,
                digest: None,
                keys,
            });
        }

        if let Some(cli) = cli_overrides {
            layers.push(cli);
            sources.push(ConfigSource {
                origin: ConfigOrigin::Cli,
                path: None,
                digest: None,
                keys: Vec::new(),
            });
        }

        let merged = merge_layers(layers);
        let shim: ShimConfig = serde_json::from_value(merged.clone())
            .map_err(|e| ConfigError::Validation(format!("invalid configuration: {}", e)))?;
        Self::validate(&shim)?;

        Ok(Self {
            schema_id: SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            config: merged,
            sources,
            shim,
        })
    }

    /// Config file location and whether it was named explicitly.
    pub fn config_file_path(env: &EnvSnapshot) -> Option<(PathBuf, bool)> {
        if let Some(path) = env.get_path(CONFIG_PATH_ENV) {
            return Some((path, true));
        }
        if let Some(xdg) = env.get_path("XDG_CONFIG_HOME") {
            return Some((xdg.join("sccache-shim").join("config.toml"), false));
        }
        env.get_path("HOME")
            .map(|home| (home.join(".config").join("sccache-shim").join("config.toml"), false))
    }

    fn load_toml_file(path: &Path) -> Result<(Value, String), ConfigError> {
        let display = path.to_string_lossy().into_owned();
        let bytes = fs::read(path).map_err(|e| ConfigError::Io {
            path: display.clone(),
            message: e.to_string(),
        })?;

        let digest = hex::encode(Sha256::digest(&bytes));

        let contents = String::from_utf8(bytes).map_err(|e| ConfigError::Parse {
            path: display.clone(),
            message: format!("invalid UTF-8: {}", e),
        })?;
        let value: Value = toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: display,
            message: toml_error_message(&contents, &e),
        })?;

        Ok((value, digest))
    }

    fn env_overrides(env: &EnvSnapshot) -> Result<Option<(Value, Vec<String>)>, ConfigError> {
        let mut layer = serde_json::Map::new();
        let mut keys = Vec::new();

        if let Some(raw) = env.get(STRATEGY_ENV).filter(|s| !s.trim().is_empty()) {
            let strategy: Strategy = raw
                .parse()
                .map_err(|e| ConfigError::Validation(format!("{}: {}", STRATEGY_ENV, e)))?;
            layer.insert("strategy".to_string(), Value::String(strategy.as_str().to_string()));
            keys.push(STRATEGY_ENV.to_string());
        }

        if let Some(raw) = env.get(EXTRA_COMPILERS_ENV) {
            let names: Vec<Value> = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| Value::String(s.to_string()))
                .collect();
            if !names.is_empty() {
                layer.insert(
                    "tools".to_string(),
                    serde_json::json!({ "extra_compilers": names }),
                );
                keys.push(EXTRA_COMPILERS_ENV.to_string());
            }
        }

        if layer.is_empty() {
            Ok(None)
        } else {
            Ok(Some((Value::Object(layer), keys)))
        }
    }

    fn validate(config: &ShimConfig) -> Result<(), ConfigError> {
        for (field, value) in [
            ("cache_env_var", &config.cache_env_var),
            ("sentinel_env_var", &config.sentinel_env_var),
            ("path_env_var", &config.path_env_var),
        ] {
            if value.is_empty() || value.contains('=') || value.contains('\0') {
                return Err(ConfigError::Validation(format!(
                    "{} must be a non-empty variable name, got '{}'",
                    field, value
                )));
            }
        }

        for name in config
            .tools
            .extra_compilers
            .iter()
            .chain(config.tools.extra_cache_wrappers.iter())
        {
            if name.is_empty() || name.contains('/') {
                return Err(ConfigError::Validation(format!(
                    "tool names must be bare file names, got '{}'",
                    name
                )));
            }
        }

        Ok(())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Get a raw config value by dot-separated path
    pub fn get(&self, path: &str) -> Option<&Value> {
        path.split('.').try_fold(&self.config, |current, part| current.get(part))
    }
}

/// One-line rendering of a TOML error: `line L, column C: message`.
fn toml_error_message(contents: &str, err: &toml::de::Error) -> String {
    let message = err
        .message()
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    match err.span() {
        Some(span) => {
            let before = contents.get(..span.start).unwrap_or(contents);
            let line = before.matches('\n').count() + 1;
            let column = before.rsplit('\n').next().map_or(0, |l| l.chars().count()) + 1;
            format!("line {}, column {}: {}", line, column, message)
        }
        None => message,
    }
}
