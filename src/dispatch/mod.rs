//! Tool dispatch
//!
//! `resolve` turns an invocation, an environment snapshot and the shim
//! configuration into a [`DispatchPlan`] without side effects. All
//! filesystem and process facts come through the [`Host`] trait.
//!
//! Preconditions are checked in a fixed order: a non-empty argument vector,
//! then a usable cache binary, then the invocation name.

mod explain;
mod plan;

pub use explain::ExplainOutput;
pub use plan::{DispatchPlan, Invocation, PlanMode};

use log::debug;
use sccache_shim_tools::{ToolKind, ToolTable};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::config::{ShimConfig, Strategy};
use crate::env::{EnvOverlay, EnvSnapshot};
use crate::error::DispatchError;
use crate::host::Host;
use crate::search_path::SearchPath;

/// Value exported in the sentinel variable.
pub const SENTINEL_VALUE: &str = "1";

/// Everything `resolve` reads, bundled for the per-tool helpers.
struct Context<'a> {
    env: &'a EnvSnapshot,
    config: &'a ShimConfig,
    host: &'a dyn Host,
    cache: PathBuf,
    own_exe: PathBuf,
}

impl Context<'_> {
    fn search_path(&self) -> SearchPath {
        self.env
            .get_os(&self.config.path_env_var)
            .map(SearchPath::parse)
            .unwrap_or_default()
    }

    fn sentinel_overlay(&self) -> EnvOverlay {
        EnvOverlay::new().with_set(
            self.config.sentinel_env_var.clone(),
            SENTINEL_VALUE,
            "passed through sccache-shim",
        )
    }

    /// Whether this process was started by the cache binary.
    fn inside_cache(&self) -> bool {
        match self.host.parent_exe() {
            Some(parent) => {
                let inside = self.host.same_file(&parent, &self.cache);
                debug!("parent executable {} (cache: {})", parent.display(), inside);
                inside
            }
            None => {
                let inside = self.env.contains(&self.config.sentinel_env_var);
                debug!(
                    "parent executable unknown, {} {}",
                    self.config.sentinel_env_var,
                    if inside { "set" } else { "unset" }
                );
                inside
            }
        }
    }

    /// Canonical directories holding the shim under `name`: the directory
    /// of a path-qualified identity, plus every search-path entry where
    /// `name` is the running executable.
    fn shim_dirs(&self, identity: &Path, name: &str, search: &SearchPath) -> Vec<PathBuf> {
        let mut dirs = Vec::new();
        if let Some(parent) = identity.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Ok(canonical) = self.host.canonicalize(parent) {
                dirs.push(canonical);
            }
        }
        for dir in search.dirs_containing_self(name, self.host, &self.own_exe) {
            if !dirs.contains(&dir) {
                dirs.push(dir);
            }
        }
        dirs
    }

    /// Search path with the shim removed, as an overlay plus the dropped entries.
    fn excluded_search_path(
        &self,
        identity: &Path,
        name: &str,
    ) -> Result<(SearchPath, Vec<PathBuf>, EnvOverlay), DispatchError> {
        let search = self.search_path();
        let dirs = self.shim_dirs(identity, name, &search);
        let exclusion = search.exclude(&dirs, self.host);

        let joined = exclusion.kept.join().map_err(|e| DispatchError::SearchPath {
            path_var: self.config.path_env_var.clone(),
            message: e.to_string(),
        })?;

        let mut overlay = self.sentinel_overlay();
        overlay.set(
            self.config.path_env_var.clone(),
            joined,
            Some("shim directories removed".to_string()),
        );

        Ok((exclusion.kept, exclusion.removed, overlay))
    }
}

/// Resolve an invocation into a plan.
pub fn resolve(
    invocation: &Invocation,
    env: &EnvSnapshot,
    config: &ShimConfig,
    host: &dyn Host,
) -> Result<DispatchPlan, DispatchError> {
    let identity = invocation.identity_lossy();

    if invocation.args.is_empty() {
        return Err(DispatchError::Usage { identity });
    }

    let cache = cache_binary(env, config, host)?;

    let table = ToolTable::new(config.tools.clone());
    let classification = table.classify(&identity);
    let (tool, kind) = match (classification.tool, classification.kind) {
        (Some(tool), Some(kind)) if classification.accepted => (tool, kind),
        _ => {
            return Err(DispatchError::InvalidTool {
                identity,
                pid: host.pid(),
            })
        }
    };

    let own_exe = host
        .current_exe()
        .map_err(|e| DispatchError::SelfLocation(e.to_string()))?;
    if host.same_file(&cache, &own_exe) {
        return Err(DispatchError::CacheBinaryInvalid {
            var: config.cache_env_var.clone(),
            path: cache,
            reason: "points at sccache-shim itself".to_string(),
        });
    }

    let ctx = Context {
        env,
        config,
        host,
        cache,
        own_exe,
    };

    debug!(
        "dispatching {} as {} ({}, {})",
        identity,
        tool,
        kind.as_str(),
        config.strategy
    );

    match kind {
        ToolKind::Compiler => {
            resolve_compiler(&ctx, Path::new(&invocation.identity), &tool, &invocation.args)
        }
        ToolKind::CacheWrapper => match config.strategy {
            Strategy::ParentCheck => shift_and_redispatch(&ctx, &table, &invocation.args),
            Strategy::PathExclusion => {
                let (_, excluded_dirs, overlay) =
                    ctx.excluded_search_path(Path::new(&invocation.identity), &tool)?;
                Ok(DispatchPlan {
                    tool,
                    strategy: Strategy::PathExclusion,
                    mode: PlanMode::CacheDirect,
                    target: ctx.cache.clone(),
                    args: invocation.args.clone(),
                    overlay,
                    excluded_dirs,
                })
            }
        },
    }
}

/// Validate the cache binary named by the configured variable.
fn cache_binary(
    env: &EnvSnapshot,
    config: &ShimConfig,
    host: &dyn Host,
) -> Result<PathBuf, DispatchError> {
    let var = &config.cache_env_var;
    let path = env
        .get_path(var)
        .ok_or_else(|| DispatchError::CacheBinaryUnset { var: var.clone() })?;

    let status = host.file_status(&path);
    if !status.is_executable() {
        return Err(DispatchError::CacheBinaryInvalid {
            var: var.clone(),
            path,
            reason: status.describe().to_string(),
        });
    }
    Ok(path)
}

/// Cache-wrapper invocation under the parent-check strategy: the first
/// argument names the compiler, the rest are its arguments.
fn shift_and_redispatch(
    ctx: &Context<'_>,
    table: &ToolTable,
    args: &[OsString],
) -> Result<DispatchPlan, DispatchError> {
    let (first, rest) = match args.split_first() {
        Some(split) => split,
        None => {
            return Err(DispatchError::Usage {
                identity: "sccache-wrapper".to_string(),
            })
        }
    };
    let delegate = first.to_string_lossy().into_owned();

    if rest.is_empty() {
        return Err(DispatchError::Usage { identity: delegate });
    }

    let classification = table.classify(&delegate);
    match (classification.tool, classification.kind) {
        (Some(tool), Some(ToolKind::Compiler)) => {
            debug!("cache wrapper shifted to {}", tool);
            resolve_compiler(ctx, Path::new(first), &tool, rest)
        }
        _ => Err(DispatchError::InvalidTool {
            identity: delegate,
            pid: ctx.host.pid(),
        }),
    }
}

fn resolve_compiler(
    ctx: &Context<'_>,
    identity: &Path,
    tool: &str,
    args: &[OsString],
) -> Result<DispatchPlan, DispatchError> {
    match ctx.config.strategy {
        Strategy::ParentCheck => {
            if ctx.inside_cache() {
                let target = ctx
                    .search_path()
                    .find_executable(tool, ctx.host, Some(&ctx.own_exe))
                    .ok_or_else(|| unresolved(ctx, tool))?;
                Ok(DispatchPlan {
                    tool: tool.to_string(),
                    strategy: Strategy::ParentCheck,
                    mode: PlanMode::DelegateToCompiler,
                    target,
                    args: args.to_vec(),
                    overlay: EnvOverlay::new(),
                    excluded_dirs: Vec::new(),
                })
            } else {
                let mut forwarded = Vec::with_capacity(args.len() + 1);
                forwarded.push(OsString::from(tool));
                forwarded.extend_from_slice(args);
                Ok(DispatchPlan {
                    tool: tool.to_string(),
                    strategy: Strategy::ParentCheck,
                    mode: PlanMode::ForwardToCache,
                    target: ctx.cache.clone(),
                    args: forwarded,
                    overlay: ctx.sentinel_overlay(),
                    excluded_dirs: Vec::new(),
                })
            }
        }
        Strategy::PathExclusion => {
            let (kept, excluded_dirs, overlay) = ctx.excluded_search_path(identity, tool)?;
            let target = kept
                .find_executable(tool, ctx.host, Some(&ctx.own_exe))
                .ok_or_else(|| unresolved(ctx, tool))?;
            Ok(DispatchPlan {
                tool: tool.to_string(),
                strategy: Strategy::PathExclusion,
                mode: PlanMode::DelegateToCompiler,
                target,
                args: args.to_vec(),
                overlay,
                excluded_dirs,
            })
        }
    }
}

fn unresolved(ctx: &Context<'_>, tool: &str) -> DispatchError {
    DispatchError::Unresolved {
        tool: tool.to_string(),
        path_var: ctx.config.path_env_var.clone(),
        shim: ctx.own_exe.clone(),
    }
}
