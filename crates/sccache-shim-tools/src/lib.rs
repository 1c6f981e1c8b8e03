//! Deny-by-default allow-list for sccache-shim invocation names.
//!
//! The classifier reduces argv[0] to a bare tool name and checks it against
//! a fixed table of compiler frontends and cache-wrapper names, optionally
//! extended by configuration.

mod config;
mod parser;
mod result;

pub use config::ToolConfig;
pub use parser::{parse_identity, IdentityError, ParsedIdentity};
pub use result::{Classification, RejectionReason, ToolKind};

/// Built-in compiler frontends.
pub const COMPILER_NAMES: &[&str] = &["cc", "c++", "gcc", "g++", "clang", "clang++", "rustc"];

/// Built-in cache-wrapper names.
pub const CACHE_WRAPPER_NAMES: &[&str] = &["sccache", "sccache-wrapper"];

/// Look up a bare name in the built-in table.
pub fn builtin_kind(name: &str) -> Option<ToolKind> {
    if CACHE_WRAPPER_NAMES.contains(&name) {
        Some(ToolKind::CacheWrapper)
    } else if COMPILER_NAMES.contains(&name) {
        Some(ToolKind::Compiler)
    } else {
        None
    }
}

/// Classifier over the built-in table plus configured extensions.
#[derive(Debug, Clone, Default)]
pub struct ToolTable {
    config: ToolConfig,
}

impl ToolTable {
    pub fn new(config: ToolConfig) -> Self {
        Self { config }
    }

    /// Kind of a bare name, if recognized. Cache-wrapper names win over
    /// compiler names when a configured name collides.
    pub fn kind_of(&self, name: &str) -> Option<ToolKind> {
        if let Some(kind) = builtin_kind(name) {
            return Some(kind);
        }
        if self.config.extra_cache_wrappers.contains(name) {
            return Some(ToolKind::CacheWrapper);
        }
        if self.config.extra_compilers.contains(name) {
            return Some(ToolKind::Compiler);
        }
        None
    }

    /// All recognized names in table order: built-ins first, then extensions.
    pub fn entries(&self) -> Vec<(String, ToolKind)> {
        let mut entries: Vec<(String, ToolKind)> = Vec::new();
        for name in CACHE_WRAPPER_NAMES {
            entries.push((name.to_string(), ToolKind::CacheWrapper));
        }
        for name in COMPILER_NAMES {
            entries.push((name.to_string(), ToolKind::Compiler));
        }
        for name in &self.config.extra_cache_wrappers {
            if builtin_kind(name).is_none() {
                entries.push((name.clone(), ToolKind::CacheWrapper));
            }
        }
        for name in &self.config.extra_compilers {
            if builtin_kind(name).is_none() && !self.config.extra_cache_wrappers.contains(name) {
                entries.push((name.clone(), ToolKind::Compiler));
            }
        }
        entries
    }

    /// Classify an invocation identity (bare name or path ending in a name).
    pub fn classify(&self, identity: &str) -> Classification {
        let parsed = match parse_identity(identity) {
            Ok(p) => p,
            Err(e) => {
                return Classification::rejected(
                    identity.to_string(),
                    RejectionReason::ParseError(e.to_string()),
                );
            }
        };

        match self.kind_of(&parsed.name) {
            Some(kind) => Classification::accepted(parsed.raw, parsed.name, kind),
            None => Classification::rejected(
                parsed.raw,
                RejectionReason::UnknownTool(parsed.name),
            ),
        }
    }
}

/// Classify against the built-in table only.
pub fn classify(identity: &str) -> Classification {
    ToolTable::default().classify(identity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_builtin_compiler_is_accepted() {
        for name in COMPILER_NAMES {
            let result = classify(name);
            assert!(result.accepted, "{} should be accepted", name);
            assert!(result.is_compiler());
            assert_eq!(result.tool.as_deref(), Some(*name));
        }
    }

    #[test]
    fn test_path_qualified_compiler() {
        let result = classify("/usr/local/shim/clang++");
        assert!(result.accepted);
        assert_eq!(result.tool.as_deref(), Some("clang++"));
        assert_eq!(result.identity, "/usr/local/shim/clang++");
    }

    #[test]
    fn test_cache_wrapper_names() {
        assert!(classify("sccache").is_cache_wrapper());
        assert!(classify("/opt/bin/sccache-wrapper").is_cache_wrapper());
    }

    #[test]
    fn test_reject_unknown_tool() {
        let result = classify("/usr/bin/ld");
        assert!(!result.accepted);
        assert!(result
            .rejection_reasons
            .iter()
            .any(|r| matches!(r, RejectionReason::UnknownTool(t) if t == "ld")));
    }

    #[test]
    fn test_reject_near_miss() {
        // Prefix and suffix lookalikes are not on the list
        assert!(!classify("xcc").accepted);
        assert!(!classify("cc-wrapper").accepted);
        assert!(!classify("rustc-nightly").accepted);
    }

    #[test]
    fn test_reject_empty_identity() {
        let result = classify("");
        assert!(!result.accepted);
        assert!(matches!(
            result.rejection_reasons[0],
            RejectionReason::ParseError(_)
        ));
    }

    #[test]
    fn test_extra_compiler() {
        let table = ToolTable::new(ToolConfig::default().with_compiler("gcc-13"));
        let result = table.classify("/usr/bin/gcc-13");
        assert!(result.accepted);
        assert!(result.is_compiler());
        assert!(!classify("gcc-13").accepted);
    }

    #[test]
    fn test_extra_cache_wrapper_wins_collision() {
        let table = ToolTable::new(
            ToolConfig::default()
                .with_compiler("ccw")
                .with_cache_wrapper("ccw"),
        );
        assert_eq!(table.kind_of("ccw"), Some(ToolKind::CacheWrapper));
    }

    #[test]
    fn test_builtin_cannot_be_reclassified() {
        let table = ToolTable::new(ToolConfig::default().with_cache_wrapper("cc"));
        assert_eq!(table.kind_of("cc"), Some(ToolKind::Compiler));
    }

    #[test]
    fn test_entries_order_and_dedup() {
        let table = ToolTable::new(
            ToolConfig::default()
                .with_compiler("cc")
                .with_compiler("tcc"),
        );
        let entries = table.entries();
        assert_eq!(entries[0], ("sccache".to_string(), ToolKind::CacheWrapper));
        assert_eq!(entries.iter().filter(|(n, _)| n == "cc").count(), 1);
        assert_eq!(entries.last().unwrap().0, "tcc");
        assert_eq!(entries.len(), CACHE_WRAPPER_NAMES.len() + COMPILER_NAMES.len() + 1);
    }
}
