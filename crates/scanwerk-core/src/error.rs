// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Scanwerk.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all Scanwerk operations.
#[derive(Debug, Error)]
pub enum ScanwerkError {
    // -- Scanner device --
    #[error("scanner returned an error (exit code {})", describe_exit(.exit_code))]
    ScannerFault { exit_code: Option<i32> },

    // -- External tools --
    #[error("failed to launch {tool}: {source}")]
    ToolLaunch {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("gamma table generation failed: {0}")]
    GammaTable(String),

    // -- Job preconditions --
    #[error("invalid page count: {0}")]
    InvalidPageCount(String),

    #[error("unsupported resolution: {0} dpi")]
    UnsupportedResolution(u32),

    #[error("scan session is not ready for that: {0}")]
    InvalidState(String),

    // -- Reassembly --
    #[error("expected batch file is missing: {}", .path.display())]
    MissingBatchFile { path: PathBuf },

    // -- Output --
    #[error("PDF assembly failed: {0}")]
    AssemblyFailed(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- Delivery --
    #[error("no recipient selected")]
    NoRecipient,

    // -- Configuration / persistence --
    #[error("configuration error: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn describe_exit(code: &Option<i32>) -> String {
    code.map_or_else(|| "none".to_string(), |c| c.to_string())
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScanwerkError>;
