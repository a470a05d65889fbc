// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanwerk Scan — drives scanimage, renumbers duplex batches, assembles the
// PDF and delivers it.  Every external tool goes through the `CommandRunner`
// seam so the whole flow can run against a scripted scanner in tests.

pub mod assemble;
pub mod delivery;
pub mod gamma;
pub mod orchestrator;
pub mod reassembly;
pub mod recovery;
pub mod runner;
pub mod session;
pub mod workspace;

#[cfg(test)]
mod test_support;

pub use assemble::OutputAssembler;
pub use orchestrator::{PassOutcome, ScanOrchestrator, ScanPass};
pub use reassembly::{Rename, RenamePlan};
pub use runner::{CommandRunner, SystemRunner, ToolCommand};
pub use session::{FLIP_PROMPT, ScanSession, SessionState, SessionStep};
pub use workspace::ScanWorkspace;
