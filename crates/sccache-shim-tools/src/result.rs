//! Classification result types.

use serde::{Deserialize, Serialize};

/// What a recognized name stands for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    /// A compiler frontend the cache knows how to wrap.
    Compiler,
    /// The cache itself, or a wrapper name standing in for it.
    CacheWrapper,
}

impl ToolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolKind::Compiler => "compiler",
            ToolKind::CacheWrapper => "cache_wrapper",
        }
    }
}

/// Machine-readable rejection reason.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "detail")]
pub enum RejectionReason {
    /// The identity could not be reduced to a tool name.
    #[serde(rename = "PARSE_ERROR")]
    ParseError(String),

    /// The tool name is not on the allow-list.
    #[serde(rename = "UNKNOWN_TOOL")]
    UnknownTool(String),
}

impl RejectionReason {
    /// Get a machine-readable string representation.
    pub fn to_code(&self) -> String {
        match self {
            RejectionReason::ParseError(e) => format!("PARSE_ERROR:{}", e),
            RejectionReason::UnknownTool(t) => format!("UNKNOWN_TOOL:{}", t),
        }
    }
}

/// Result of classifying an invocation identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Classification {
    /// Whether the identity is on the allow-list.
    pub accepted: bool,

    /// The identity as received.
    pub identity: String,

    /// Bare tool name. None when rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,

    /// Kind of the recognized tool. None when rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ToolKind>,

    /// Machine-readable rejection reasons.
    #[serde(default)]
    pub rejection_reasons: Vec<RejectionReason>,
}

impl Classification {
    /// Create an accepted result.
    pub fn accepted(identity: String, tool: String, kind: ToolKind) -> Self {
        Self {
            accepted: true,
            identity,
            tool: Some(tool),
            kind: Some(kind),
            rejection_reasons: Vec::new(),
        }
    }

    /// Create a rejected result.
    pub fn rejected(identity: String, reason: RejectionReason) -> Self {
        Self {
            accepted: false,
            identity,
            tool: None,
            kind: None,
            rejection_reasons: vec![reason],
        }
    }

    /// True when the identity names a compiler.
    pub fn is_compiler(&self) -> bool {
        self.kind == Some(ToolKind::Compiler)
    }

    /// True when the identity names the cache wrapper.
    pub fn is_cache_wrapper(&self) -> bool {
        self.kind == Some(ToolKind::CacheWrapper)
    }

    /// Get rejection reasons as machine-readable strings.
    pub fn rejection_reason_codes(&self) -> Vec<String> {
        self.rejection_reasons.iter().map(|r| r.to_code()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted_result() {
        let result = Classification::accepted(
            "/bin/cc".to_string(),
            "cc".to_string(),
            ToolKind::Compiler,
        );
        assert!(result.accepted);
        assert!(result.is_compiler());
        assert!(!result.is_cache_wrapper());
        assert_eq!(result.tool.as_deref(), Some("cc"));
    }

    #[test]
    fn test_rejected_result() {
        let result = Classification::rejected(
            "ld".to_string(),
            RejectionReason::UnknownTool("ld".to_string()),
        );
        assert!(!result.accepted);
        assert!(result.tool.is_none());
        assert_eq!(result.rejection_reason_codes(), vec!["UNKNOWN_TOOL:ld"]);
    }

    #[test]
    fn test_serialization_omits_empty_fields() {
        let result = Classification::rejected(
            "ld".to_string(),
            RejectionReason::UnknownTool("ld".to_string()),
        );
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("tool").is_none());
        assert_eq!(json["rejection_reasons"][0]["type"], "UNKNOWN_TOOL");
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&ToolKind::CacheWrapper).unwrap();
        assert_eq!(json, "\"cache_wrapper\"");
        assert_eq!(ToolKind::Compiler.as_str(), "compiler");
    }
}
