//! sccache-shim - transparent sccache insertion for compiler toolchains
//!
//! The shim is installed on the search path under compiler names (`cc`,
//! `c++`, `gcc`, `g++`, `clang`, `clang++`, `rustc`) and cache-wrapper names
//! (`sccache`, `sccache-wrapper`). Each invocation is resolved into a
//! [`DispatchPlan`] that either hands the call to sccache or runs the real
//! compiler further down the search path, then the process is replaced.

pub mod config;
pub mod dispatch;
pub mod env;
pub mod error;
pub mod host;
pub mod install;
pub mod launch;
pub mod mock;
pub mod search_path;

pub use config::{EffectiveConfig, ShimConfig, Strategy};
pub use dispatch::{resolve, DispatchPlan, ExplainOutput, Invocation, PlanMode};
pub use env::{EnvOverlay, EnvSnapshot};
pub use error::{DispatchError, EXIT_CODE_FAILURE};
pub use host::{Host, SystemHost};

/// Name under which the binary exposes its management commands.
pub const MANAGEMENT_NAME: &str = "sccache-shim";

/// Whether argv[0] names the management CLI rather than a tool.
pub fn is_management_invocation(identity: &str) -> bool {
    sccache_shim_tools::parse_identity(identity)
        .map(|parsed| parsed.name == MANAGEMENT_NAME)
        .unwrap_or(false)
}

/// Load configuration from the environment and resolve an invocation.
pub fn plan_invocation(
    invocation: &Invocation,
    env: &EnvSnapshot,
    host: &dyn Host,
) -> Result<DispatchPlan, DispatchError> {
    if invocation.args.is_empty() {
        return Err(DispatchError::Usage {
            identity: invocation.identity_lossy(),
        });
    }
    let config = EffectiveConfig::load(env)?;
    resolve(invocation, env, &config.shim, host)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_management_invocation() {
        assert!(is_management_invocation("sccache-shim"));
        assert!(is_management_invocation("/usr/local/bin/sccache-shim"));
        assert!(!is_management_invocation("/usr/local/bin/sccache"));
        assert!(!is_management_invocation(""));
    }

    #[test]
    fn test_plan_invocation_usage_before_config() {
        // A broken config file must not mask the usage error
        let env = EnvSnapshot::from_pairs([(config::CONFIG_PATH_ENV, "/nonexistent/config.toml")]);
        let err = plan_invocation(&Invocation::from_strs("cc", &[]), &env, &SystemHost).unwrap_err();
        assert_eq!(err.code(), "USAGE");
    }

    #[test]
    fn test_plan_invocation_config_error_exits_99() {
        let env = EnvSnapshot::from_pairs([(config::CONFIG_PATH_ENV, "/nonexistent/config.toml")]);
        let err =
            plan_invocation(&Invocation::from_strs("cc", &["a.c"]), &env, &SystemHost).unwrap_err();
        assert_eq!(err.code(), "CONFIG");
        assert_eq!(err.exit_code(), 99);
    }
}
