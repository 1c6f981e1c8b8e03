//! Dispatcher errors
//!
//! Every failure the shim recognizes maps to the single exit status
//! [`EXIT_CODE_FAILURE`]. The delegate's own exit status is never
//! interpreted: once the process image is replaced it is not ours.

use std::path::PathBuf;

use crate::config::ConfigError;

/// Exit status for every recognized failure.
pub const EXIT_CODE_FAILURE: i32 = 99;

/// Prefix for single-line diagnostics on stderr.
pub const DIAGNOSTIC_PREFIX: &str = "sccache-shim";

/// Dispatcher errors
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// No arguments to forward
    #[error("usage: {identity} <args...> (no arguments given)")]
    Usage { identity: String },

    /// Cache binary variable not set
    #[error("{var} is not set; it must point at the sccache executable")]
    CacheBinaryUnset { var: String },

    /// Cache binary path does not name an executable file
    #[error("{var}={} is not an executable file: {reason}", path.display())]
    CacheBinaryInvalid {
        var: String,
        path: PathBuf,
        reason: String,
    },

    /// Shim configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Invocation name is not on the allow-list
    #[error("invalid tool '{identity}' (pid {pid})")]
    InvalidTool { identity: String, pid: u32 },

    /// No real compiler found behind the shim
    #[error("cannot find '{tool}' on {path_var} outside of {}", shim.display())]
    Unresolved {
        tool: String,
        path_var: String,
        shim: PathBuf,
    },

    /// The filtered search path could not be rebuilt
    #[error("cannot rebuild {path_var}: {message}")]
    SearchPath { path_var: String, message: String },

    /// The running executable could not be located
    #[error("cannot locate the running shim executable: {0}")]
    SelfLocation(String),

    /// Process replacement failed
    #[error("command failed: {command}: {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl DispatchError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            DispatchError::Usage { .. } => "USAGE",
            DispatchError::CacheBinaryUnset { .. }
            | DispatchError::CacheBinaryInvalid { .. }
            | DispatchError::Config(_) => "CONFIG",
            DispatchError::InvalidTool { .. } => "INVALID_TOOL",
            DispatchError::Unresolved { .. }
            | DispatchError::SearchPath { .. }
            | DispatchError::SelfLocation(_) => "UNRESOLVED",
            DispatchError::Launch { .. } => "LAUNCH",
        }
    }

    /// Exit status for this error. Always [`EXIT_CODE_FAILURE`].
    pub fn exit_code(&self) -> i32 {
        EXIT_CODE_FAILURE
    }

    /// Single-line diagnostic as printed on stderr.
    pub fn diagnostic(&self) -> String {
        let text = self.to_string();
        let line = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        format!("{}: {}", DIAGNOSTIC_PREFIX, line)
    }
}
