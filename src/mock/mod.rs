//! In-process host double for tests
//!
//! Models a small filesystem of executables and symlinks plus fixed process
//! facts, so dispatch decisions can be checked without touching disk.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};

use crate::host::{FileStatus, Host};

/// Mock host with a declarative file table
#[derive(Debug, Clone)]
pub struct MockHost {
    files: BTreeMap<PathBuf, FileStatus>,
    dirs: BTreeSet<PathBuf>,
    links: BTreeMap<PathBuf, PathBuf>,
    current_exe: PathBuf,
    parent_exe: Option<PathBuf>,
    pid: u32,
}

impl MockHost {
    /// A host whose running executable is `current_exe`.
    pub fn new(current_exe: impl Into<PathBuf>) -> Self {
        let current_exe = current_exe.into();
        let mut host = Self {
            files: BTreeMap::new(),
            dirs: BTreeSet::new(),
            links: BTreeMap::new(),
            current_exe: current_exe.clone(),
            parent_exe: None,
            pid: 4242,
        };
        host.add_file(current_exe, FileStatus::Executable);
        host
    }

    fn add_file(&mut self, path: PathBuf, status: FileStatus) {
        let mut parent = path.parent();
        while let Some(dir) = parent {
            self.dirs.insert(dir.to_path_buf());
            parent = dir.parent();
        }
        self.files.insert(path, status);
    }

    /// Add an executable file.
    pub fn with_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.add_file(path.into(), FileStatus::Executable);
        self
    }

    /// Add a file without execute permission.
    pub fn with_plain_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.add_file(path.into(), FileStatus::NotExecutable);
        self
    }

    /// Add a directory.
    pub fn with_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.dirs.insert(path.into());
        self
    }

    /// Add a symlink (file or directory) pointing at `target`.
    pub fn with_symlink(mut self, link: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        let link = link.into();
        if let Some(dir) = link.parent() {
            self.dirs.insert(dir.to_path_buf());
        }
        self.links.insert(link, target.into());
        self
    }

    /// Install the shim under `name` inside `dir` as a symlink to the running executable.
    pub fn with_shim_link(self, dir: impl AsRef<Path>, name: &str) -> Self {
        let link = dir.as_ref().join(name);
        let target = self.current_exe.clone();
        self.with_symlink(link, target)
    }

    /// Set the parent process's executable.
    pub fn with_parent_exe(mut self, path: impl Into<PathBuf>) -> Self {
        self.parent_exe = Some(path.into());
        self
    }

    pub fn with_pid(mut self, pid: u32) -> Self {
        self.pid = pid;
        self
    }

    /// Follow symlinks on every prefix of `path`.
    fn resolve(&self, path: &Path) -> Option<PathBuf> {
        self.resolve_within(path, 0)
    }

    fn resolve_within(&self, path: &Path, depth: usize) -> Option<PathBuf> {
        use std::path::Component;

        if depth > 32 {
            return None;
        }

        let mut resolved = PathBuf::new();
        for component in path.components() {
            match component {
                Component::CurDir => continue,
                Component::ParentDir => {
                    resolved.pop();
                    continue;
                }
                other => resolved.push(other),
            }
            let mut hops = 0;
            while let Some(target) = self.links.get(&resolved) {
                hops += 1;
                if hops > 32 {
                    return None;
                }
                let next = if target.is_absolute() {
                    target.clone()
                } else {
                    resolved.parent().map(|p| p.join(target)).unwrap_or_else(|| target.clone())
                };
                // The target's own prefix may run through further links
                resolved = self.resolve_within(&next, depth + 1)?;
            }
        }
        Some(resolved)
    }
}

impl Host for MockHost {
    fn file_status(&self, path: &Path) -> FileStatus {
        match self.resolve(path) {
            Some(p) => match self.files.get(&p) {
                Some(status) => *status,
                None if self.dirs.contains(&p) => FileStatus::NotAFile,
                None => FileStatus::Missing,
            },
            None => FileStatus::Missing,
        }
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        let resolved = self
            .resolve(path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "symlink loop"))?;
        if self.files.contains_key(&resolved) || self.dirs.contains(&resolved) {
            Ok(resolved)
        } else {
            Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            ))
        }
    }

    fn same_file(&self, a: &Path, b: &Path) -> bool {
        match (self.canonicalize(a), self.canonicalize(b)) {
            (Ok(ca), Ok(cb)) => ca == cb,
            _ => false,
        }
    }

    fn current_exe(&self) -> io::Result<PathBuf> {
        Ok(self.current_exe.clone())
    }

    fn parent_exe(&self) -> Option<PathBuf> {
        self.parent_exe.clone()
    }

    fn pid(&self) -> u32 {
        self.pid
    }
}
