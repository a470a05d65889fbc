// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Global application state — reactive signals for the Dioxus UI.

use scanwerk_core::human_errors::{HumanError, Severity, humanize_error};
use scanwerk_core::types::{DeliveryOutcome, ScanRecord, ScanSource};
use scanwerk_core::{AppConfig, ControlPanel, ScanwerkError};

use crate::services::app_services::AppServices;

/// The one modal dialog that may be open over the panel.
///
/// While anything other than `Closed` is showing, the panel underneath is
/// inert, so at most one scan can be in flight.
#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    Closed,
    /// "Scan from ..." was pressed; OK starts the scan.
    ConfirmStart(ScanSource),
    /// A pass is running on the blocking worker.
    Scanning(ScanSource),
    /// Front pass done; OK runs the back pass.
    AwaitingFlip(&'static str),
    /// Outcome of the last job, dismissed with OK.
    Notice(Notice),
}

/// Text for a `Modal::Notice`.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub title: String,
    pub message: String,
    pub suggestion: Option<String>,
    /// `None` for a finished job.
    pub severity: Option<Severity>,
    /// Offer "Try again" from this source.
    pub retry: Option<ScanSource>,
}

impl Notice {
    /// A failed scan from `source`.
    pub fn from_error(err: &ScanwerkError, source: ScanSource) -> Self {
        let HumanError {
            message,
            suggestion,
            retriable,
            severity,
        } = humanize_error(err);
        Self {
            title: "Scan failed".into(),
            message,
            suggestion: Some(suggestion),
            severity: Some(severity),
            retry: retriable.then_some(source),
        }
    }

    pub fn from_record(record: &ScanRecord) -> Self {
        let name = record
            .output
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| record.output.display().to_string());
        let suggestion = match &record.delivery {
            DeliveryOutcome::Kept => None,
            DeliveryOutcome::Delivered { destination, .. } => Some(format!("Sent to {destination}.")),
            DeliveryOutcome::Failed { reason, .. } => {
                Some(format!("Delivery failed ({reason}); the PDF was kept."))
            }
        };
        Self {
            title: "Scan complete".into(),
            message: format!("{} page(s) saved as {name}.", record.pages),
            suggestion,
            severity: None,
            retry: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity.is_some()
    }

    pub fn title_color(&self) -> &'static str {
        match self.severity {
            None => "#34c759",
            Some(Severity::Transient) => "#007aff",
            Some(Severity::ActionRequired) => "#ff9500",
            Some(Severity::Permanent) => "#ff3b30",
        }
    }
}

/// Shared state accessible to all pages via `use_context`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application settings.
    pub config: AppConfig,
    /// Panel selections for the next job.
    pub panel: ControlPanel,
    pub modal: Modal,
    /// Most recent finished job, shown under the controls.
    pub last_record: Option<ScanRecord>,
}

impl AppState {
    /// Create initial state from the backend services.
    pub fn new(svc: &AppServices) -> Self {
        let config = svc.config();
        let panel = ControlPanel::new(config.recipients.clone());
        Self {
            config,
            panel,
            modal: Modal::Closed,
            last_record: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.modal != Modal::Closed
    }
}

impl Default for AppState {
    fn default() -> Self {
        let config = AppConfig::default();
        Self {
            panel: ControlPanel::new(config.recipients.clone()),
            config,
            modal: Modal::Closed,
            last_record: None,
        }
    }
}
