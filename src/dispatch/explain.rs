//! Explain output for dispatch decisions
//!
//! Structured JSON and human-readable rendering of what the shim would do
//! for an invocation, without launching anything.

use serde::Serialize;

use super::{DispatchPlan, Invocation, PlanMode};
use crate::error::DispatchError;

/// Error section of an explanation
#[derive(Debug, Clone, Serialize)]
pub struct ExplainError {
    pub code: String,
    pub message: String,
    pub exit_code: i32,
}

/// Explanation of a dispatch decision
#[derive(Debug, Clone, Serialize)]
pub struct ExplainOutput {
    /// Name the shim was invoked as
    pub identity: String,

    /// Arguments as received
    pub input_args: Vec<String>,

    /// Whether a plan was produced
    pub resolved: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<DispatchPlan>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ExplainError>,
}

impl ExplainOutput {
    pub fn from_result(invocation: &Invocation, result: &Result<DispatchPlan, DispatchError>) -> Self {
        let input_args = invocation
            .args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        match result {
            Ok(plan) => Self {
                identity: invocation.identity_lossy(),
                input_args,
                resolved: true,
                plan: Some(plan.clone()),
                error: None,
            },
            Err(err) => Self {
                identity: invocation.identity_lossy(),
                input_args,
                resolved: false,
                plan: None,
                error: Some(ExplainError {
                    code: err.code().to_string(),
                    message: err.to_string(),
                    exit_code: err.exit_code(),
                }),
            },
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_human(&self) -> String {
        let mut lines = Vec::new();

        let mut invoked = vec![self.identity.clone()];
        invoked.extend(self.input_args.iter().cloned());
        lines.push(format!("Invocation: {}", invoked.join(" ")));
        lines.push(String::new());

        match (&self.plan, &self.error) {
            (Some(plan), _) => {
                lines.push(format!("Decision: {}", Self::describe_mode(plan.mode)));
                lines.push(format!("Tool: {}", plan.tool));
                lines.push(format!("Strategy: {}", plan.strategy));
                lines.push(format!("Command: {}", plan.command_line()));

                if !plan.overlay.is_empty() {
                    lines.push("Environment:".to_string());
                    for op in plan.overlay.ops() {
                        lines.push(format!("  {}", Self::describe_op(op)));
                    }
                }
                if !plan.excluded_dirs.is_empty() {
                    lines.push("Excluded from search path:".to_string());
                    for dir in &plan.excluded_dirs {
                        lines.push(format!("  - {}", dir.display()));
                    }
                }
            }
            (None, Some(err)) => {
                lines.push(format!("Decision: FAIL ({})", err.code));
                lines.push(format!("Reason: {}", err.message));
                lines.push(format!("Exit status: {}", err.exit_code));
            }
            (None, None) => lines.push("Decision: unknown".to_string()),
        }

        lines.join("\n")
    }

    fn describe_mode(mode: PlanMode) -> &'static str {
        match mode {
            PlanMode::ForwardToCache => "forward to cache",
            PlanMode::DelegateToCompiler => "run real compiler",
            PlanMode::CacheDirect => "run cache directly",
        }
    }

    fn describe_op(op: &crate::env::EnvOp) -> String {
        use crate::env::EnvOp;

        match op {
            EnvOp::Set { key, value, reason } => match reason {
                Some(r) => format!("{}={} ({})", key, value.to_string_lossy(), r),
                None => format!("{}={}", key, value.to_string_lossy()),
            },
            EnvOp::Unset { key, .. } => format!("unset {}", key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Strategy;
    use crate::env::EnvOverlay;
    use std::ffi::OsString;
    use std::path::PathBuf;

    fn plan() -> DispatchPlan {
        DispatchPlan {
            tool: "cc".to_string(),
            strategy: Strategy::PathExclusion,
            mode: PlanMode::DelegateToCompiler,
            target: PathBuf::from("/usr/bin/cc"),
            args: vec![OsString::from("-c"), OsString::from("a.c")],
            overlay: EnvOverlay::new().with_set("PATH", "/usr/bin", "shim directories removed"),
            excluded_dirs: vec![PathBuf::from("/opt/shim/bin")],
        }
    }

    #[test]
    fn test_human_resolved() {
        let inv = Invocation::from_strs("cc", &["-c", "a.c"]);
        let output = ExplainOutput::from_result(&inv, &Ok(plan()));
        let human = output.to_human();
        assert!(human.contains("Invocation: cc -c a.c"));
        assert!(human.contains("Decision: run real compiler"));
        assert!(human.contains("Command: /usr/bin/cc -c a.c"));
        assert!(human.contains("PATH=/usr/bin (shim directories removed)"));
        assert!(human.contains("  - /opt/shim/bin"));
    }

    #[test]
    fn test_json_failure() {
        let inv = Invocation::from_strs("ld", &["-o", "x"]);
        let err = DispatchError::InvalidTool {
            identity: "ld".to_string(),
            pid: 1,
        };
        let output = ExplainOutput::from_result(&inv, &Err(err));
        assert!(!output.resolved);

        let json: serde_json::Value = serde_json::from_str(&output.to_json().unwrap()).unwrap();
        assert_eq!(json["error"]["code"], "INVALID_TOOL");
        assert_eq!(json["error"]["exit_code"], 99);
        assert!(json.get("plan").is_none());
        assert!(output.to_human().contains("Decision: FAIL (INVALID_TOOL)"));
    }
}
