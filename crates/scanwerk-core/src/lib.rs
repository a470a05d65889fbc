// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanwerk — Core types, control panel model, and error definitions shared
// across all crates.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod panel;
pub mod types;

pub use config::{AppConfig, AssemblerKind, DeliveryMethod};
pub use error::ScanwerkError;
pub use panel::ControlPanel;
pub use types::*;
