//! Shim installation
//!
//! Populates a directory with links named after every recognized tool, all
//! pointing at the shim executable. Putting that directory first on the
//! search path is what makes the shim transparent.

use sccache_shim_tools::{ToolKind, ToolTable};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::host::{Host, SystemHost};

/// Installation errors
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    #[error("'{0}' is not a recognized tool name")]
    UnknownTool(String),

    #[error("cannot create {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot link {}: {source}", path.display())]
    Link {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// What happened to one link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkOutcome {
    Created,
    Replaced,
    /// Already points at the shim
    Unchanged,
    /// Something else is there and `force` was not given
    Skipped,
}

/// One installed name
#[derive(Debug, Clone, Serialize)]
pub struct InstalledLink {
    pub name: String,
    pub kind: ToolKind,
    pub path: PathBuf,
    pub outcome: LinkOutcome,
}

/// Options for [`install`]
#[derive(Debug, Clone)]
pub struct InstallOptions {
    /// Directory to populate
    pub dir: PathBuf,
    /// Executable the links point at
    pub shim: PathBuf,
    /// Replace existing entries that are not the shim
    pub force: bool,
    /// Restrict to these names (empty means every recognized name)
    pub only: Vec<String>,
}

/// Create links for the selected tools.
pub fn install(
    options: &InstallOptions,
    table: &ToolTable,
) -> Result<Vec<InstalledLink>, InstallError> {
    let selected: Vec<(String, ToolKind)> = if options.only.is_empty() {
        table.entries()
    } else {
        options
            .only
            .iter()
            .map(|name| {
                table
                    .kind_of(name)
                    .map(|kind| (name.clone(), kind))
                    .ok_or_else(|| InstallError::UnknownTool(name.clone()))
            })
            .collect::<Result<_, _>>()?
    };

    fs::create_dir_all(&options.dir).map_err(|source| InstallError::CreateDir {
        path: options.dir.clone(),
        source,
    })?;

    let host = SystemHost::new();
    let mut installed = Vec::with_capacity(selected.len());

    for (name, kind) in selected {
        let path = options
            .dir
            .join(format!("{}{}", name, std::env::consts::EXE_SUFFIX));
        let outcome = link_one(&path, &options.shim, options.force, &host)?;
        installed.push(InstalledLink {
            name,
            kind,
            path,
            outcome,
        });
    }

    Ok(installed)
}

fn link_one(
    path: &Path,
    shim: &Path,
    force: bool,
    host: &dyn Host,
) -> Result<LinkOutcome, InstallError> {
    let link_err = |source: io::Error| InstallError::Link {
        path: path.to_path_buf(),
        source,
    };

    let exists = fs::symlink_metadata(path).is_ok();
    let outcome = if exists {
        if host.same_file(path, shim) {
            return Ok(LinkOutcome::Unchanged);
        }
        if !force {
            return Ok(LinkOutcome::Skipped);
        }
        fs::remove_file(path).map_err(link_err)?;
        LinkOutcome::Replaced
    } else {
        LinkOutcome::Created
    };

    #[cfg(unix)]
    std::os::unix::fs::symlink(shim, path).map_err(link_err)?;
    #[cfg(not(unix))]
    fs::hard_link(shim, path).map_err(link_err)?;

    Ok(outcome)
}
