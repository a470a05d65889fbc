// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Data directory resolution.

use std::path::PathBuf;

use scanwerk_core::error::Result;

/// Return the application data directory, creating it if needed.
///
/// `$XDG_DATA_HOME/scanwerk`, else `~/.local/share/scanwerk`.
pub fn data_dir() -> Result<PathBuf> {
    let dir = base_dir().join("scanwerk");
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

fn base_dir() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(xdg);
    }
    if let Some(home) = std::env::var_os("HOME") {
        return PathBuf::from(home).join(".local").join("share");
    }
    // Last resort
    std::env::temp_dir()
}
