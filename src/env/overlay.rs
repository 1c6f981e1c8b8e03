//! Environment overlay
//!
//! An ordered set of changes applied on top of the inherited environment
//! when the next process is launched. Each change carries the reason it was
//! made so `explain` can report it.

use serde::{Serialize, Serializer};
use std::ffi::OsString;
use std::process::Command;

fn serialize_lossy<S: Serializer>(value: &OsString, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&value.to_string_lossy())
}

/// A single environment change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum EnvOp {
    /// Set (or override) a variable
    Set {
        key: String,
        #[serde(serialize_with = "serialize_lossy")]
        value: OsString,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    /// Remove a variable
    Unset {
        key: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
}

impl EnvOp {
    pub fn key(&self) -> &str {
        match self {
            EnvOp::Set { key, .. } | EnvOp::Unset { key, .. } => key,
        }
    }
}

/// Changes to hand to the next process
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EnvOverlay {
    ops: Vec<EnvOp>,
}

impl EnvOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable. A later change to the same key replaces an earlier one.
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<OsString>,
        reason: Option<String>,
    ) {
        let key = key.into();
        self.ops.retain(|op| op.key() != key);
        self.ops.push(EnvOp::Set {
            key,
            value: value.into(),
            reason,
        });
    }

    /// Remove a variable. A later change to the same key replaces an earlier one.
    pub fn unset(&mut self, key: impl Into<String>, reason: Option<String>) {
        let key = key.into();
        self.ops.retain(|op| op.key() != key);
        self.ops.push(EnvOp::Unset { key, reason });
    }

    /// Builder form of [`EnvOverlay::set`].
    pub fn with_set(
        mut self,
        key: impl Into<String>,
        value: impl Into<OsString>,
        reason: impl Into<String>,
    ) -> Self {
        self.set(key, value, Some(reason.into()));
        self
    }

    pub fn ops(&self) -> &[EnvOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Value the overlay assigns to a key, if it sets one.
    pub fn value_of(&self, key: &str) -> Option<&OsString> {
        self.ops.iter().find_map(|op| match op {
            EnvOp::Set { key: k, value, .. } if k == key => Some(value),
            _ => None,
        })
    }

    /// Apply to a command that otherwise inherits the current environment.
    pub fn apply_to_command(&self, command: &mut Command) {
        for op in &self.ops {
            match op {
                EnvOp::Set { key, value, .. } => {
                    command.env(key, value);
                }
                EnvOp::Unset { key, .. } => {
                    command.env_remove(key);
                }
            }
        }
    }
}
