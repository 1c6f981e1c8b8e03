//! Search-path handling
//!
//! Splitting and joining follow the platform's rules (`:` on Unix, `;` on
//! Windows). An empty entry means the current directory, as in `execvp`.

use log::trace;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use crate::host::Host;

/// Ordered list of search directories
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath {
    entries: Vec<PathBuf>,
}

/// Result of removing the shim's directories from a search path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exclusion {
    /// Entries that survived
    pub kept: SearchPath,
    /// Entries that were dropped, in original order
    pub removed: Vec<PathBuf>,
}

impl SearchPath {
    pub fn parse(value: &OsStr) -> Self {
        Self {
            entries: std::env::split_paths(value).collect(),
        }
    }

    pub fn from_entries(entries: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    /// Join back into a variable value.
    pub fn join(&self) -> Result<OsString, std::env::JoinPathsError> {
        std::env::join_paths(self.entries.iter())
    }

    fn lookup_dir(entry: &Path) -> &Path {
        if entry.as_os_str().is_empty() {
            Path::new(".")
        } else {
            entry
        }
    }

    /// Drop every entry whose canonical form is one of `dirs`.
    ///
    /// Entries that cannot be canonicalized are kept verbatim.
    pub fn exclude(&self, dirs: &[PathBuf], host: &dyn Host) -> Exclusion {
        let mut kept = Vec::new();
        let mut removed = Vec::new();

        for entry in &self.entries {
            let is_shim_dir = host
                .canonicalize(Self::lookup_dir(entry))
                .map(|canonical| dirs.contains(&canonical))
                .unwrap_or(false);
            if is_shim_dir {
                trace!("excluding {} from search path", entry.display());
                removed.push(entry.clone());
            } else {
                kept.push(entry.clone());
            }
        }

        Exclusion {
            kept: SearchPath { entries: kept },
            removed,
        }
    }

    /// First executable named `tool`, skipping any candidate that is the
    /// same file as `skip`.
    pub fn find_executable(
        &self,
        tool: &str,
        host: &dyn Host,
        skip: Option<&Path>,
    ) -> Option<PathBuf> {
        for entry in &self.entries {
            let candidate = Self::lookup_dir(entry).join(tool);
            if !host.file_status(&candidate).is_executable() {
                continue;
            }
            if let Some(own) = skip {
                if host.same_file(&candidate, own) {
                    trace!("skipping {} (the shim itself)", candidate.display());
                    continue;
                }
            }
            return Some(candidate);
        }
        None
    }

    /// Canonical directories in which `tool` is the running shim.
    pub fn dirs_containing_self(&self, tool: &str, host: &dyn Host, own: &Path) -> Vec<PathBuf> {
        let mut dirs = Vec::new();
        for entry in &self.entries {
            let dir = Self::lookup_dir(entry);
            if host.same_file(&dir.join(tool), own) {
                if let Ok(canonical) = host.canonicalize(dir) {
                    if !dirs.contains(&canonical) {
                        dirs.push(canonical);
                    }
                }
            }
        }
        dirs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockHost;

    fn shim_host() -> MockHost {
        MockHost::new("/opt/shim/libexec/sccache-shim")
            .with_shim_link("/opt/shim/bin", "cc")
            .with_executable("/usr/local/bin/cc")
            .with_executable("/usr/bin/cc")
    }

    #[cfg(unix)]
    #[test]
    fn test_parse_and_join() {
        let path = SearchPath::parse(OsStr::new("/opt/shim/bin:/usr/bin::/bin"));
        assert_eq!(path.entries().len(), 4);
        assert_eq!(path.entries()[2], PathBuf::from(""));
        assert_eq!(path.join().unwrap(), OsString::from("/opt/shim/bin:/usr/bin::/bin"));
    }

    #[test]
    fn test_find_skips_self() {
        let host = shim_host();
        let path = SearchPath::from_entries(["/opt/shim/bin", "/usr/local/bin", "/usr/bin"]);
        let found = path.find_executable("cc", &host, Some(Path::new("/opt/shim/libexec/sccache-shim")));
        assert_eq!(found, Some(PathBuf::from("/usr/local/bin/cc")));
    }

    #[test]
    fn test_find_without_skip_returns_shim() {
        let host = shim_host();
        let path = SearchPath::from_entries(["/opt/shim/bin", "/usr/bin"]);
        assert_eq!(
            path.find_executable("cc", &host, None),
            Some(PathBuf::from("/opt/shim/bin/cc"))
        );
    }

    #[test]
    fn test_find_only_self_is_none() {
        let host = shim_host();
        let path = SearchPath::from_entries(["/opt/shim/bin"]);
        assert!(path
            .find_executable("cc", &host, Some(Path::new("/opt/shim/libexec/sccache-shim")))
            .is_none());
    }

    #[test]
    fn test_find_ignores_non_executable() {
        let host = MockHost::new("/s/sccache-shim")
            .with_plain_file("/a/rustc")
            .with_executable("/b/rustc");
        let path = SearchPath::from_entries(["/a", "/b"]);
        assert_eq!(path.find_executable("rustc", &host, None), Some(PathBuf::from("/b/rustc")));
    }

    #[test]
    fn test_exclude_by_canonical_dir() {
        let host = shim_host().with_symlink("/shim", "/opt/shim/bin");
        let path = SearchPath::from_entries(["/shim", "/usr/local/bin", "/opt/shim/bin/", "/gone"]);
        let exclusion = path.exclude(&[PathBuf::from("/opt/shim/bin")], &host);

        assert_eq!(
            exclusion.kept,
            SearchPath::from_entries(["/usr/local/bin", "/gone"])
        );
        assert_eq!(
            exclusion.removed,
            vec![PathBuf::from("/shim"), PathBuf::from("/opt/shim/bin/")]
        );
    }

    #[test]
    fn test_dirs_containing_self() {
        let host = shim_host().with_symlink("/shim", "/opt/shim/bin");
        let path = SearchPath::from_entries(["/shim", "/usr/bin", "/opt/shim/bin"]);
        let dirs = path.dirs_containing_self("cc", &host, Path::new("/opt/shim/libexec/sccache-shim"));
        assert_eq!(dirs, vec![PathBuf::from("/opt/shim/bin")]);
    }
}
