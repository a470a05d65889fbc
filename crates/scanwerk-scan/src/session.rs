// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// One scan job from first pass to finished PDF.
//
// Lifecycle:
//
//   AwaitingFrontPass --begin--> AwaitingFlipConfirmation (two-sided feeder)
//                            \-> Done (glass, one-sided feeder)
//   AwaitingFlipConfirmation --confirm_flip--> AwaitingBackPass -> Renumbering -> Done
//
// A scanner fault in any pass ends the session in `Faulted`; any other error
// ends it in `Failed`. Both are terminal: the user starts a fresh job.

use chrono::Utc;
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::types::{ScanJob, ScanRecord, ScanSource};
use scanwerk_document::hash_file;
use tracing::{info, instrument, warn};

use crate::delivery::check_delivery;
use crate::orchestrator::{PassOutcome, ScanOrchestrator, ScanPass};
use crate::runner::CommandRunner;

/// Shown after the front pass of a two-sided job.
pub const FLIP_PROMPT: &str =
    "Now turn over the stack, and we will scan the back sides of those pages in reverse.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingFrontPass,
    AwaitingFlipConfirmation,
    AwaitingBackPass,
    Renumbering,
    Done,
    /// The scanner failed a pass.
    Faulted,
    /// Anything else went wrong.
    Failed,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Faulted | Self::Failed)
    }
}

/// What the caller has to do next.
#[derive(Debug, Clone)]
pub enum SessionStep {
    /// Ask the user to flip the stack, then call `confirm_flip`.
    AwaitingFlip { prompt: &'static str },
    Finished(ScanRecord),
    ScannerFault { exit_code: Option<i32> },
}

/// Drives one `ScanJob` through its passes.
#[derive(Debug)]
pub struct ScanSession {
    job: ScanJob,
    state: SessionState,
    gamma_table: Option<String>,
}

impl ScanSession {
    pub fn new(job: ScanJob) -> Self {
        Self {
            job,
            state: SessionState::AwaitingFrontPass,
            gamma_table: None,
        }
    }

    pub fn job(&self) -> &ScanJob {
        &self.job
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Prepare the work directory and run the first pass.
    #[instrument(skip_all, fields(job = %self.job.id, source = self.job.source.label()))]
    pub fn begin<R: CommandRunner>(&mut self, orch: &ScanOrchestrator<R>) -> Result<SessionStep> {
        self.expect_state(SessionState::AwaitingFrontPass, "begin")?;
        let result = self.run_first_pass(orch);
        self.settle(result)
    }

    /// The user has turned the stack over: run the back pass and finish.
    #[instrument(skip_all, fields(job = %self.job.id))]
    pub fn confirm_flip<R: CommandRunner>(
        &mut self,
        orch: &ScanOrchestrator<R>,
    ) -> Result<SessionStep> {
        self.expect_state(SessionState::AwaitingFlipConfirmation, "confirm_flip")?;
        self.state = SessionState::AwaitingBackPass;
        let result = self.run_back_pass(orch);
        self.settle(result)
    }

    fn run_first_pass<R: CommandRunner>(&mut self, orch: &ScanOrchestrator<R>) -> Result<SessionStep> {
        check_delivery(orch.delivery_method(), self.job.recipient.as_deref())?;
        let table = orch.prepare(&self.job)?;
        let pass = match self.job.source {
            ScanSource::Flatbed => ScanPass::Glass,
            ScanSource::Feeder => ScanPass::Front,
        };
        let outcome = orch.run_pass(&self.job, pass, &table)?;
        self.gamma_table = Some(table);

        match outcome {
            PassOutcome::ScannerFault { exit_code } => Ok(SessionStep::ScannerFault { exit_code }),
            PassOutcome::Completed { .. } if self.job.is_duplex() => {
                self.state = SessionState::AwaitingFlipConfirmation;
                info!("front pass done, waiting for the stack to be flipped");
                Ok(SessionStep::AwaitingFlip {
                    prompt: FLIP_PROMPT,
                })
            }
            PassOutcome::Completed { .. } => self.finish(orch).map(SessionStep::Finished),
        }
    }

    fn run_back_pass<R: CommandRunner>(&mut self, orch: &ScanOrchestrator<R>) -> Result<SessionStep> {
        let table = self
            .gamma_table
            .clone()
            .ok_or_else(|| ScanwerkError::InvalidState("no gamma table from the front pass".into()))?;
        match orch.run_pass(&self.job, ScanPass::Back, &table)? {
            PassOutcome::ScannerFault { exit_code } => Ok(SessionStep::ScannerFault { exit_code }),
            PassOutcome::Completed { .. } => self.finish(orch).map(SessionStep::Finished),
        }
    }

    /// Renumber, assemble, fingerprint and deliver.
    fn finish<R: CommandRunner>(&mut self, orch: &ScanOrchestrator<R>) -> Result<ScanRecord> {
        self.state = SessionState::Renumbering;
        let pages = orch.renumber(&self.job)?;
        let pdf = orch.assemble(&self.job, pages)?;
        let document_hash = hash_file(&pdf)?;
        let delivery = orch.deliver(&self.job, &pdf)?;
        info!(pages, output = %pdf.display(), hash = %document_hash, "scan job complete");
        Ok(ScanRecord {
            job_id: self.job.id,
            output: pdf,
            pages,
            document_hash,
            delivery,
            completed_at: Utc::now(),
        })
    }

    /// Record where `result` leaves the session.
    fn settle(&mut self, result: Result<SessionStep>) -> Result<SessionStep> {
        match &result {
            Ok(SessionStep::AwaitingFlip { .. }) => {}
            Ok(SessionStep::Finished(_)) => self.state = SessionState::Done,
            Ok(SessionStep::ScannerFault { .. }) => self.state = SessionState::Faulted,
            Err(e) => {
                warn!(error = %e, "scan job failed");
                self.state = SessionState::Failed;
            }
        }
        result
    }

    fn expect_state(&self, expected: SessionState, op: &str) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(ScanwerkError::InvalidState(format!(
                "{op} called while {:?}",
                self.state
            )))
        }
    }
}
