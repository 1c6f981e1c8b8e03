//! Host facts
//!
//! Abstracts the filesystem and process queries the dispatcher needs so the
//! decision logic can run against a [`MockHost`](crate::mock::MockHost) in
//! tests. Provides:
//! - `Host` trait: executability, canonical paths, file identity, own and
//!   parent executables
//! - `SystemHost`: the real operating system

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// What a path refers to, as far as launching it goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    /// Regular file the current user may execute
    Executable,
    /// Nothing at this path
    Missing,
    /// Exists but is a directory or other non-regular file
    NotAFile,
    /// Regular file without execute permission
    NotExecutable,
}

impl FileStatus {
    pub fn is_executable(&self) -> bool {
        matches!(self, FileStatus::Executable)
    }

    /// Short reason for diagnostics
    pub fn describe(&self) -> &'static str {
        match self {
            FileStatus::Executable => "executable",
            FileStatus::Missing => "no such file",
            FileStatus::NotAFile => "not a regular file",
            FileStatus::NotExecutable => "permission denied",
        }
    }
}

/// Host trait for filesystem and process queries
pub trait Host {
    /// Launch status of a path (symlinks followed)
    fn file_status(&self, path: &Path) -> FileStatus;

    /// Resolve symlinks and relative components
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;

    /// Whether two paths name the same underlying file
    fn same_file(&self, a: &Path, b: &Path) -> bool;

    /// The running executable
    fn current_exe(&self) -> io::Result<PathBuf>;

    /// The parent process's executable. `None` when the platform cannot tell.
    fn parent_exe(&self) -> Option<PathBuf>;

    /// Current process id
    fn pid(&self) -> u32;
}

/// The real operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHost;

impl SystemHost {
    pub fn new() -> Self {
        Self
    }
}

impl Host for SystemHost {
    fn file_status(&self, path: &Path) -> FileStatus {
        let metadata = match fs::metadata(path) {
            Ok(m) => m,
            Err(_) => return FileStatus::Missing,
        };
        if !metadata.is_file() {
            return FileStatus::NotAFile;
        }

        #[cfg(unix)]
        {
            use nix::unistd::{access, AccessFlags};
            use std::os::unix::fs::PermissionsExt;

            if metadata.permissions().mode() & 0o111 == 0 {
                return FileStatus::NotExecutable;
            }
            if access(path, AccessFlags::X_OK).is_err() {
                return FileStatus::NotExecutable;
            }
        }

        FileStatus::Executable
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        fs::canonicalize(path)
    }

    fn same_file(&self, a: &Path, b: &Path) -> bool {
        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;

            match (fs::metadata(a), fs::metadata(b)) {
                (Ok(ma), Ok(mb)) => ma.dev() == mb.dev() && ma.ino() == mb.ino(),
                _ => false,
            }
        }

        #[cfg(not(unix))]
        {
            match (fs::canonicalize(a), fs::canonicalize(b)) {
                (Ok(ca), Ok(cb)) => ca == cb,
                _ => false,
            }
        }
    }

    fn current_exe(&self) -> io::Result<PathBuf> {
        std::env::current_exe()
    }

    fn parent_exe(&self) -> Option<PathBuf> {
        #[cfg(target_os = "linux")]
        {
            let ppid = nix::unistd::getppid();
            fs::read_link(format!("/proc/{}/exe", ppid)).ok()
        }

        #[cfg(not(target_os = "linux"))]
        {
            None
        }
    }

    fn pid(&self) -> u32 {
        std::process::id()
    }
}
