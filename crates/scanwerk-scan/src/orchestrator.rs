// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan orchestration.
//
// Turns a `ScanJob` into scanimage invocations, one per pass, and owns the
// stages that follow a successful scan: renumbering, PDF assembly and
// delivery. Passes block until scanimage exits; callers in async contexts
// run them on a blocking worker.

use std::path::PathBuf;

use scanwerk_core::config::{AppConfig, DeliveryMethod};
use scanwerk_core::error::Result;
use scanwerk_core::human_errors::{SCANNER_FAULT_MESSAGE, SCANNER_FAULT_SUGGESTION};
use scanwerk_core::types::{BACK_BATCH_BASE, DeliveryOutcome, FRONT_BATCH_BASE, ScanJob};
use tracing::{info, instrument, warn};

use crate::assemble::OutputAssembler;
use crate::delivery;
use crate::gamma::generate_gamma_table;
use crate::reassembly::RenamePlan;
use crate::recovery::attempt_recovery;
use crate::runner::{CommandRunner, ToolCommand};
use crate::workspace::{BATCH_PATTERN, ScanWorkspace};

/// One scanimage invocation within a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPass {
    /// Single page from the flatbed.
    Glass,
    /// Feeder pass over the front sides (or the only pass of a one-sided job).
    Front,
    /// Feeder pass over the flipped stack.
    Back,
}

impl ScanPass {
    /// First batch index the pass writes.
    pub fn batch_start(&self) -> u32 {
        match self {
            Self::Glass => 1,
            Self::Front => FRONT_BATCH_BASE + 1,
            Self::Back => BACK_BATCH_BASE + 1,
        }
    }

    /// Pages the pass is expected to produce.
    pub fn batch_count(&self, job: &ScanJob) -> u32 {
        match self {
            Self::Glass => 1,
            Self::Front | Self::Back => job.sheets(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Glass => "glass",
            Self::Front => "front",
            Self::Back => "back",
        }
    }
}

/// How a pass ended, short of an outright error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// scanimage exited 0 and should have written `pages` batch files.
    Completed { pages: u32 },
    /// scanimage failed. The recovery reset has already been issued.
    ScannerFault { exit_code: Option<i32> },
}

/// Drives the external tools for scan jobs in one work directory.
pub struct ScanOrchestrator<R: CommandRunner> {
    runner: R,
    workspace: ScanWorkspace,
    scan_tool: String,
    gamma_tool: String,
    assembler: OutputAssembler,
    delivery: DeliveryMethod,
}

impl<R: CommandRunner> ScanOrchestrator<R> {
    /// Validate `config` and open its work directory.
    pub fn from_config(config: &AppConfig, runner: R) -> Result<Self> {
        config.validate()?;
        let workspace = ScanWorkspace::open(config.resolved_work_dir()?)?;
        Ok(Self {
            runner,
            workspace,
            scan_tool: config.scan_tool.clone(),
            gamma_tool: config.gamma_tool.clone(),
            assembler: OutputAssembler::from_config(config),
            delivery: config.delivery.clone(),
        })
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn workspace(&self) -> &ScanWorkspace {
        &self.workspace
    }

    pub fn delivery_method(&self) -> &DeliveryMethod {
        &self.delivery
    }

    /// Clear stale batch files and produce the gamma table for `job`.
    #[instrument(skip_all, fields(job = %job.id))]
    pub fn prepare(&self, job: &ScanJob) -> Result<String> {
        self.workspace.purge_batches()?;
        generate_gamma_table(&self.runner, &self.gamma_tool, &job.gamma)
    }

    /// The scanimage command for `pass`, run from the work directory.
    pub fn scan_command(&self, job: &ScanJob, pass: ScanPass, gamma_table: &str) -> ToolCommand {
        let mut cmd = ToolCommand::new(&self.scan_tool)
            .niced(job.nice)
            .current_dir(self.workspace.dir())
            .args(["-d", job.device.as_str()]);
        if let Some(source) = job.source.sane_source() {
            cmd = cmd.args(["--source", source]);
        }
        cmd.args([
            "--format=pnm".to_string(),
            format!("--batch={BATCH_PATTERN}"),
            format!("--batch-start={}", pass.batch_start()),
            format!("--batch-count={}", pass.batch_count(job)),
            "--resolution".to_string(),
            format!("{}dpi", job.resolution.dpi()),
            "--custom-gamma=yes".to_string(),
            "--gamma-table".to_string(),
            gamma_table.to_string(),
            "-x".to_string(),
            job.geometry.width_mm.to_string(),
            "-y".to_string(),
            job.geometry.height_mm.to_string(),
        ])
    }

    /// Run one pass and wait for it.
    ///
    /// A scanner failure is not an `Err`: it is logged, the diagnostic reset
    /// is issued, and `PassOutcome::ScannerFault` comes back. Only a scan
    /// tool that cannot be started at all is an error.
    #[instrument(skip(self, job, gamma_table), fields(job = %job.id, pass = pass.label()))]
    pub fn run_pass(&self, job: &ScanJob, pass: ScanPass, gamma_table: &str) -> Result<PassOutcome> {
        let cmd = self.scan_command(job, pass, gamma_table);
        info!(command = %cmd, "starting scan pass");
        let status = self.runner.run(&cmd)?;

        if status.success() {
            let pages = pass.batch_count(job);
            info!(pages, "scan pass completed");
            return Ok(PassOutcome::Completed { pages });
        }

        warn!(
            exit_code = ?status.code,
            "{} {}",
            SCANNER_FAULT_MESSAGE,
            SCANNER_FAULT_SUGGESTION
        );
        attempt_recovery(&self.runner, &self.scan_tool, &job.device);
        Ok(PassOutcome::ScannerFault {
            exit_code: status.code,
        })
    }

    /// Move the job's batch files to their final positions.
    pub fn renumber(&self, job: &ScanJob) -> Result<u32> {
        RenamePlan::for_job(job).apply(&self.workspace)
    }

    /// Build the output PDF from pages `1..=pages` and return its path.
    pub fn assemble(&self, job: &ScanJob, pages: u32) -> Result<PathBuf> {
        let inputs = self.workspace.page_paths(pages);
        let out = self.workspace.output_path(&job.output_file_name());
        self.assembler
            .assemble(&self.runner, &inputs, job.resolution.dpi(), &out)?;
        Ok(out)
    }

    /// Hand the PDF to the configured delivery method.
    pub fn deliver(&self, job: &ScanJob, pdf: &std::path::Path) -> Result<DeliveryOutcome> {
        delivery::deliver(&self.runner, &self.delivery, pdf, job.recipient.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedRunner;
    use scanwerk_core::types::{PageCount, Resolution, ScanSource, Sides};

    fn orchestrator(dir: &std::path::Path, runner: ScriptedRunner) -> ScanOrchestrator<ScriptedRunner> {
        let config = AppConfig {
            work_dir: Some(dir.to_path_buf()),
            ..Default::default()
        };
        ScanOrchestrator::from_config(&config, runner).unwrap()
    }

    fn feeder_job(sheets: u32) -> ScanJob {
        ScanJob::new("pixma:MX920_jonesscanner", ScanSource::Feeder)
            .with_sides(Sides::TwoSided)
            .with_resolution(Resolution::Dpi300)
            .with_page_count(PageCount::new(sheets).unwrap())
    }

    #[test]
    fn feeder_front_pass_command_line() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator(dir.path(), ScriptedRunner::new());
        let cmd = orch.scan_command(&feeder_job(3), ScanPass::Front, "TABLE");

        assert_eq!(cmd.program, "scanimage");
        assert_eq!(cmd.nice, Some(18));
        assert_eq!(cmd.current_dir.as_deref(), Some(dir.path()));
        assert_eq!(
            cmd.args,
            vec![
                "-d",
                "pixma:MX920_jonesscanner",
                "--source",
                "Automatic Document Feeder",
                "--format=pnm",
                "--batch=out%d.pnm",
                "--batch-start=1001",
                "--batch-count=3",
                "--resolution",
                "300dpi",
                "--custom-gamma=yes",
                "--gamma-table",
                "TABLE",
                "-x",
                "216",
                "-y",
                "280",
            ]
        );
    }

    #[test]
    fn glass_pass_has_no_source_and_scans_one_page() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator(dir.path(), ScriptedRunner::new());
        let job = ScanJob::new("dev", ScanSource::Flatbed);
        let cmd = orch.scan_command(&job, ScanPass::Glass, "T");
        assert!(!cmd.args.iter().any(|a| a == "--source"));
        assert_eq!(cmd.flag_value("--batch-start"), Some("1"));
        assert_eq!(cmd.flag_value("--batch-count"), Some("1"));
        assert_eq!(cmd.flag_value("--resolution"), Some("75dpi"));
    }

    #[test]
    fn back_pass_starts_at_2001() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator(dir.path(), ScriptedRunner::new());
        let cmd = orch.scan_command(&feeder_job(5), ScanPass::Back, "T");
        assert_eq!(cmd.flag_value("--batch-start"), Some("2001"));
        assert_eq!(cmd.flag_value("--batch-count"), Some("5"));
    }

    #[test]
    fn prepare_purges_and_returns_table() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("out1001.pnm"), b"old").unwrap();
        let orch = orchestrator(dir.path(), ScriptedRunner::new());
        let table = orch.prepare(&feeder_job(1)).unwrap();
        assert_eq!(table, ScriptedRunner::GAMMA_TABLE);
        assert!(!dir.path().join("out1001.pnm").exists());
    }

    #[test]
    fn successful_pass_reports_expected_pages() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator(dir.path(), ScriptedRunner::new());
        let outcome = orch.run_pass(&feeder_job(2), ScanPass::Front, "T").unwrap();
        assert_eq!(outcome, PassOutcome::Completed { pages: 2 });
        assert!(dir.path().join("out1001.pnm").exists());
        assert!(dir.path().join("out1002.pnm").exists());
    }

    #[test]
    fn scanner_fault_issues_reset_and_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator(dir.path(), ScriptedRunner::new().scan_exits([7]));
        let outcome = orch.run_pass(&feeder_job(2), ScanPass::Front, "T").unwrap();
        assert_eq!(outcome, PassOutcome::ScannerFault { exit_code: Some(7) });

        let scans = orch.runner().calls_to("scanimage");
        assert_eq!(scans.len(), 2);
        assert_eq!(scans[1].args, vec!["-d", "pixma:MX920_jonesscanner", "-T"]);
    }

    #[test]
    fn unlaunchable_scanner_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator(dir.path(), ScriptedRunner::new().unlaunchable("scanimage"));
        assert!(orch.run_pass(&feeder_job(1), ScanPass::Front, "T").is_err());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            work_dir: Some(dir.path().to_path_buf()),
            device: " ".into(),
            ..Default::default()
        };
        assert!(ScanOrchestrator::from_config(&config, ScriptedRunner::new()).is_err());
    }
}
