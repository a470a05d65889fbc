// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Gamma table generation via `gamma4scanimage`.

use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::types::GammaParams;
use tracing::debug;

use crate::runner::{CommandRunner, ToolCommand};

/// `<tool> <gamma> <black> <white> <max>`
pub fn gamma_command(tool: &str, params: &GammaParams) -> ToolCommand {
    ToolCommand::new(tool).args([
        params.gamma.to_string(),
        params.black.to_string(),
        params.white.to_string(),
        params.max_level.to_string(),
    ])
}

/// Run the generator and return the table string for `--gamma-table`.
pub fn generate_gamma_table<R: CommandRunner>(
    runner: &R,
    tool: &str,
    params: &GammaParams,
) -> Result<String> {
    let output = runner.output(&gamma_command(tool, params))?;
    if !output.status.success() {
        return Err(ScanwerkError::GammaTable(format!(
            "{tool} exited with {:?}: {}",
            output.status.code,
            output.stderr.trim()
        )));
    }
    let table = output.stdout.trim().to_string();
    if table.is_empty() {
        return Err(ScanwerkError::GammaTable(format!("{tool} printed no table")));
    }
    debug!(len = table.len(), "gamma table ready");
    Ok(table)
}
