//! Process replacement
//!
//! The single effectful step: run a [`DispatchPlan`]. On Unix the shim's
//! process image is replaced, so the delegate's exit status is what the
//! caller sees. Elsewhere the delegate is spawned and its status forwarded.

use log::debug;
use std::convert::Infallible;
use std::process::Command;

use crate::dispatch::DispatchPlan;
use crate::error::DispatchError;

/// Build the command for a plan: target, arguments, inherited environment
/// plus the plan's overlay.
pub fn build_command(plan: &DispatchPlan) -> Command {
    let mut command = Command::new(&plan.target);
    command.args(&plan.args);
    plan.overlay.apply_to_command(&mut command);
    command
}

/// Run a plan. Only returns on failure.
pub fn launch(plan: &DispatchPlan) -> Result<Infallible, DispatchError> {
    let mut command = build_command(plan);
    debug!("exec {} ({})", plan.command_line(), plan.mode.as_str());

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;

        let source = command.exec();
        Err(DispatchError::Launch {
            command: plan.target.to_string_lossy().into_owned(),
            source,
        })
    }

    #[cfg(not(unix))]
    {
        let status = command.status().map_err(|source| DispatchError::Launch {
            command: plan.target.to_string_lossy().into_owned(),
            source,
        })?;
        std::process::exit(status.code().unwrap_or(crate::error::EXIT_CODE_FAILURE))
    }
}
