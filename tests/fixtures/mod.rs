//! On-disk fixtures for running the built shim binary
//!
//! A `ShimLayout` is a temporary directory holding:
//! - `shim/`: links to the shim binary under tool names
//! - `real/`: shell scripts standing in for compilers and sccache
//! - `home/`: HOME and XDG_CONFIG_HOME, so no user config leaks in

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Path to the built shim binary
pub fn shim_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_sccache-shim"))
}

/// Temporary installation of the shim plus fake tools
pub struct ShimLayout {
    root: TempDir,
}

impl ShimLayout {
    pub fn new() -> Self {
        let root = TempDir::new().expect("create temp dir");
        for sub in ["shim", "real", "home"] {
            fs::create_dir_all(root.path().join(sub)).expect("create layout dir");
        }
        Self { root }
    }

    pub fn shim_dir(&self) -> PathBuf {
        self.root.path().join("shim")
    }

    pub fn real_dir(&self) -> PathBuf {
        self.root.path().join("real")
    }

    pub fn home(&self) -> PathBuf {
        self.root.path().join("home")
    }

    /// Link the shim binary into `shim/` as `name`.
    pub fn link(&self, name: &str) -> PathBuf {
        let path = self.shim_dir().join(name);
        std::os::unix::fs::symlink(shim_binary(), &path).expect("link shim");
        path
    }

    /// Write an executable shell script into `dir`.
    pub fn script(&self, dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).expect("write script");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod script");
        path
    }

    /// Fake sccache that prints the sentinel and its arguments.
    pub fn echo_cache(&self) -> PathBuf {
        self.script(
            &self.real_dir(),
            "sccache",
            "echo \"cache $SCCACHE_SHIM_ACTIVE $*\"",
        )
    }

    /// Write the user config file picked up through XDG_CONFIG_HOME.
    pub fn user_config(&self, contents: &str) {
        let dir = self.home().join("sccache-shim");
        fs::create_dir_all(&dir).expect("create config dir");
        fs::write(dir.join("config.toml"), contents).expect("write config");
    }

    /// Search path with the shim directory ahead of the fake tools.
    pub fn search_path(&self) -> String {
        format!("{}:{}", self.shim_dir().display(), self.real_dir().display())
    }

    /// Command for `program` with a scrubbed environment.
    pub fn command(&self, program: impl AsRef<Path>) -> Command {
        let mut command = Command::new(program.as_ref());
        command
            .env_clear()
            .env("HOME", self.home())
            .env("XDG_CONFIG_HOME", self.home())
            .env("PATH", self.search_path());
        command
    }
}
