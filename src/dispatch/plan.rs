//! Dispatch plans
//!
//! A plan is everything needed to replace the current process: the target
//! executable, its argument vector, and the environment changes.

use serde::{Serialize, Serializer};
use std::ffi::OsString;
use std::path::PathBuf;

use crate::config::Strategy;
use crate::env::EnvOverlay;

fn serialize_args<S: Serializer>(args: &[OsString], s: S) -> Result<S::Ok, S::Error> {
    s.collect_seq(args.iter().map(|a| a.to_string_lossy()))
}

/// The invocation being dispatched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// argv[0] as received
    pub identity: OsString,
    /// argv[1..], forwarded verbatim
    pub args: Vec<OsString>,
}

impl Invocation {
    pub fn new(identity: impl Into<OsString>, args: Vec<OsString>) -> Self {
        Self {
            identity: identity.into(),
            args,
        }
    }

    /// Split a full argv. A missing argv[0] yields an empty identity.
    pub fn from_argv(argv: impl IntoIterator<Item = impl Into<OsString>>) -> Self {
        let mut iter = argv.into_iter().map(Into::into);
        let identity = iter.next().unwrap_or_default();
        Self {
            identity,
            args: iter.collect(),
        }
    }

    /// Convenience for string arguments.
    pub fn from_strs(identity: &str, args: &[&str]) -> Self {
        Self::new(identity, args.iter().map(OsString::from).collect())
    }

    pub fn identity_lossy(&self) -> String {
        self.identity.to_string_lossy().into_owned()
    }
}

/// Which branch produced a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanMode {
    /// First contact: hand the compiler invocation to the cache
    ForwardToCache,
    /// Run the real compiler found behind the shim
    DelegateToCompiler,
    /// Cache-wrapper name invoked directly: run the cache as-is
    CacheDirect,
}

impl PlanMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanMode::ForwardToCache => "forward_to_cache",
            PlanMode::DelegateToCompiler => "delegate_to_compiler",
            PlanMode::CacheDirect => "cache_direct",
        }
    }
}

/// Resolved process replacement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchPlan {
    /// Bare tool name the shim acted as
    pub tool: String,

    pub strategy: Strategy,

    pub mode: PlanMode,

    /// Executable to run
    pub target: PathBuf,

    /// Arguments after argv[0]
    #[serde(serialize_with = "serialize_args")]
    pub args: Vec<OsString>,

    /// Environment changes for the new process
    pub overlay: EnvOverlay,

    /// Search-path entries dropped because they hold the shim
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub excluded_dirs: Vec<PathBuf>,
}

impl DispatchPlan {
    /// Shell-like rendering of the command for diagnostics.
    pub fn command_line(&self) -> String {
        let mut parts = vec![self.target.to_string_lossy().into_owned()];
        parts.extend(self.args.iter().map(|a| a.to_string_lossy().into_owned()));
        parts.join(" ")
    }
}
