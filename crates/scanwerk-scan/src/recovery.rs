// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanner recovery after a failed pass.
//
// The network scanner regularly gives up mid-stack. Running the scan tool's
// backend self-test (`scanimage -T`) afterwards tends to get it talking
// again. This is best effort: its own outcome is logged and otherwise
// ignored, and nothing is retried automatically.

use tracing::{debug, info};

use crate::runner::{CommandRunner, ToolCommand};

/// `<scan_tool> -d <device> -T`
pub fn reset_command(scan_tool: &str, device: &str) -> ToolCommand {
    ToolCommand::new(scan_tool).args(["-d", device, "-T"])
}

/// Issue the diagnostic reset, discarding its output.
///
/// Returns whether the reset itself reported success, for logging only.
pub fn attempt_recovery<R: CommandRunner>(runner: &R, scan_tool: &str, device: &str) -> bool {
    let cmd = reset_command(scan_tool, device);
    info!(device, "issuing scanner diagnostic reset");
    match runner.output(&cmd) {
        Ok(out) => {
            debug!(code = ?out.status.code, "diagnostic reset finished");
            out.status.success()
        }
        Err(e) => {
            debug!(error = %e, "diagnostic reset could not run");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedRunner;

    #[test]
    fn reset_targets_the_device() {
        let cmd = reset_command("scanimage", "pixma:MX920");
        assert_eq!(cmd.program, "scanimage");
        assert_eq!(cmd.args, vec!["-d", "pixma:MX920", "-T"]);
    }

    #[test]
    fn failed_reset_is_swallowed() {
        let runner = ScriptedRunner::new().unlaunchable("scanimage");
        assert!(!attempt_recovery(&runner, "scanimage", "dev"));
        assert_eq!(runner.calls().len(), 1);
    }
}
