//! Shim configuration
//!
//! Three layers, later layers win:
//! 1. Built-in defaults
//! 2. Config file (`$SCCACHE_SHIM_CONFIG`, else `$XDG_CONFIG_HOME/sccache-shim/config.toml`,
//!    else `~/.config/sccache-shim/config.toml`)
//! 3. Environment overrides (`SCCACHE_SHIM_STRATEGY`, `SCCACHE_SHIM_EXTRA_COMPILERS`)
//!
//! Management commands may push a fourth layer of CLI overrides.

mod defaults;
mod effective;
mod merge;
mod shim;

pub use defaults::BuiltinDefaults;
pub use effective::{ConfigError, ConfigOrigin, ConfigSource, EffectiveConfig};
pub use merge::{deep_merge, merge_layers};
pub use shim::{ShimConfig, Strategy};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "SCCACHE_SHIM_CONFIG";

/// Environment variable overriding the recursion-avoidance strategy.
pub const STRATEGY_ENV: &str = "SCCACHE_SHIM_STRATEGY";

/// Environment variable adding compiler names (comma-separated).
pub const EXTRA_COMPILERS_ENV: &str = "SCCACHE_SHIM_EXTRA_COMPILERS";
