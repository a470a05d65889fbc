// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the control panel.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Nothing here retries on its own; `retriable` only tells the panel whether
// to offer "Try again".

use crate::error::ScanwerkError;

/// What the scanner says when it gives up mid-stack.
pub const SCANNER_FAULT_MESSAGE: &str = "The scanner returned an error, it does that.";

/// How to get going again after a scanner fault.
pub const SCANNER_FAULT_SUGGESTION: &str = "Please eject page and reload on top of remaining stack, reboot the scanner, then try again.";

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Likely to work if simply tried again.
    Transient,
    /// User must do something (reload paper, power-cycle, fix a setting).
    ActionRequired,
    /// Cannot be fixed by retrying: broken install, corrupt image, bad config.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether trying the same thing again can succeed.
    pub retriable: bool,
    /// Severity level (colours the notice title).
    pub severity: Severity,
}

/// Convert a `ScanwerkError` into a `HumanError`.
pub fn humanize_error(err: &ScanwerkError) -> HumanError {
    match err {
        ScanwerkError::ScannerFault { .. } => HumanError {
            message: SCANNER_FAULT_MESSAGE.into(),
            suggestion: SCANNER_FAULT_SUGGESTION.into(),
            retriable: true,
            severity: Severity::ActionRequired,
        },

        ScanwerkError::ToolLaunch { tool, .. } => HumanError {
            message: format!("Couldn't start {tool}."),
            suggestion: format!("Make sure {tool} is installed and on your PATH, or change the tool in Settings."),
            retriable: false,
            severity: Severity::Permanent,
        },

        ScanwerkError::GammaTable(_) => HumanError {
            message: "The brightness table couldn't be prepared.".into(),
            suggestion: "Check that gamma4scanimage is installed and the gamma settings are sensible.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        ScanwerkError::InvalidPageCount(_) => HumanError {
            message: "The number of sheets isn't valid.".into(),
            suggestion: "Use the + and - buttons to pick how many sheets are in the feeder.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanwerkError::UnsupportedResolution(dpi) => HumanError {
            message: format!("The scanner can't scan at {dpi} dpi."),
            suggestion: "Pick one of the resolution buttons.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanwerkError::InvalidState(_) => HumanError {
            message: "That step isn't available right now.".into(),
            suggestion: "Finish or restart the current scan first.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanwerkError::MissingBatchFile { path } => HumanError {
            message: "Some scanned pages are missing.".into(),
            suggestion: format!(
                "The scanner produced fewer pages than expected ({} not found). Check the sheet count and scan again.",
                path.display()
            ),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanwerkError::AssemblyFailed(_) => HumanError {
            message: "The PDF couldn't be put together.".into(),
            suggestion: "One of the scanned pages may be damaged. Scan the document again.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        ScanwerkError::ImageError(_) => HumanError {
            message: "A scanned page couldn't be read.".into(),
            suggestion: "The page image may be damaged or empty. Scan the document again.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        ScanwerkError::NoRecipient => HumanError {
            message: "No recipient selected.".into(),
            suggestion: "Choose who to send the scan to, then try again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanwerkError::Config(detail) => HumanError {
            message: "The settings look wrong.".into(),
            suggestion: format!("Open Settings and check them. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanwerkError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError {
                message: "A file or folder couldn't be found.".into(),
                suggestion: "Check that the scans folder exists and try again.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            std::io::ErrorKind::PermissionDenied => HumanError {
                message: "The app doesn't have permission to write there.".into(),
                suggestion: "Check the permissions of the scans folder, or choose another one in Settings.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            _ => HumanError {
                message: "There was a problem reading or writing a file.".into(),
                suggestion: "Try again. If this keeps happening, your disk may be full.".into(),
                retriable: true,
                severity: Severity::Transient,
            },
        },

        ScanwerkError::Serialization(_) => HumanError {
            message: "The app had an internal data problem.".into(),
            suggestion: "Try again. If this keeps happening, reset the settings.".into(),
            retriable: true,
            severity: Severity::Transient,
        },
    }
}
