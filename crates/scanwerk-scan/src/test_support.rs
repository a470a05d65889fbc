// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scripted stand-ins for the external tools, used by the unit tests.
//
// `ScriptedRunner` records every command and imitates just enough of each
// tool: scanimage writes `out<n>.pnm` files whose content names their batch
// index, img2pdf concatenates its inputs so tests can read back page order.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::PathBuf;

use scanwerk_core::error::{Result, ScanwerkError};

use crate::runner::{CommandRunner, ToolCommand, ToolOutput, ToolStatus};

/// Header written by the scripted img2pdf, followed by one line per page.
pub const SCRIPTED_PDF_HEADER: &str = "%PDF-scripted";

#[derive(Default)]
pub struct ScriptedRunner {
    calls: RefCell<Vec<ToolCommand>>,
    scan_exits: RefCell<VecDeque<i32>>,
    failing: Vec<String>,
    unlaunchable: Vec<String>,
    short_by: u32,
}

impl ScriptedRunner {
    pub const GAMMA_TABLE: &'static str = "[0]0-[100]0-[2000]4095-[4095]4095";

    pub fn new() -> Self {
        Self::default()
    }

    /// Exit codes for successive scan passes; unlisted passes succeed.
    pub fn scan_exits(self, codes: impl IntoIterator<Item = i32>) -> Self {
        self.scan_exits.borrow_mut().extend(codes);
        self
    }

    /// Make every invocation of `tool` exit with status 1.
    pub fn fail_tool(mut self, tool: &str) -> Self {
        self.failing.push(tool.to_string());
        self
    }

    /// Make `tool` impossible to start.
    pub fn unlaunchable(mut self, tool: &str) -> Self {
        self.unlaunchable.push(tool.to_string());
        self
    }

    /// Each scan pass writes `n` fewer pages than requested.
    pub fn short_by(mut self, n: u32) -> Self {
        self.short_by = n;
        self
    }

    pub fn calls(&self) -> Vec<ToolCommand> {
        self.calls.borrow().clone()
    }

    pub fn calls_to(&self, program: &str) -> Vec<ToolCommand> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.program == program)
            .cloned()
            .collect()
    }

    /// Scan passes only; the `-T` reset is excluded.
    pub fn scan_passes(&self) -> Vec<ToolCommand> {
        self.calls_to("scanimage")
            .into_iter()
            .filter(|c| !c.args.iter().any(|a| a == "-T"))
            .collect()
    }

    fn execute(&self, cmd: &ToolCommand) -> Result<ToolOutput> {
        self.calls.borrow_mut().push(cmd.clone());

        if self.unlaunchable.contains(&cmd.program) {
            return Err(ScanwerkError::ToolLaunch {
                tool: cmd.program.clone(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            });
        }
        if self.failing.contains(&cmd.program) {
            return Ok(finished(1, "", "scripted failure"));
        }

        match cmd.program.as_str() {
            "scanimage" if cmd.args.iter().any(|a| a == "-T") => Ok(finished(0, "", "")),
            "scanimage" => self.scan(cmd),
            "gamma4scanimage" => Ok(finished(0, &format!("{}\n", Self::GAMMA_TABLE), "")),
            "img2pdf" => self.img2pdf(cmd),
            _ => Ok(finished(0, "", "")),
        }
    }

    fn scan(&self, cmd: &ToolCommand) -> Result<ToolOutput> {
        let code = self.scan_exits.borrow_mut().pop_front().unwrap_or(0);
        if code != 0 {
            return Ok(finished(code, "", "scanimage: sane_read: Error during device I/O"));
        }
        let start: u32 = parse_flag(cmd, "--batch-start");
        let count: u32 = parse_flag::<u32>(cmd, "--batch-count").saturating_sub(self.short_by);
        let dir = cmd.current_dir.clone().unwrap_or_else(|| PathBuf::from("."));
        for index in start..start + count {
            std::fs::write(dir.join(format!("out{index}.pnm")), format!("batch {index}"))?;
        }
        Ok(finished(0, "", ""))
    }

    fn img2pdf(&self, cmd: &ToolCommand) -> Result<ToolOutput> {
        let Some(split) = cmd.args.iter().position(|a| a == "-o") else {
            return Ok(finished(2, "", "img2pdf: no output given"));
        };
        let mut pdf = String::from(SCRIPTED_PDF_HEADER);
        for input in &cmd.args[..split] {
            match std::fs::read_to_string(input) {
                Ok(content) => {
                    pdf.push('\n');
                    pdf.push_str(&content);
                }
                Err(_) => return Ok(finished(1, "", &format!("cannot read {input}"))),
            }
        }
        std::fs::write(&cmd.args[split + 1], pdf)?;
        Ok(finished(0, "", ""))
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, command: &ToolCommand) -> Result<ToolStatus> {
        self.execute(command).map(|out| out.status)
    }

    fn output(&self, command: &ToolCommand) -> Result<ToolOutput> {
        self.execute(command)
    }
}

/// Batch indices named by the lines of a scripted PDF, in page order.
pub fn scripted_page_order(pdf: &str) -> Vec<u32> {
    pdf.lines()
        .skip(1)
        .filter_map(|line| line.strip_prefix("batch ")?.parse().ok())
        .collect()
}

fn finished(code: i32, stdout: &str, stderr: &str) -> ToolOutput {
    ToolOutput {
        status: ToolStatus::from_code(code),
        stdout: stdout.to_string(),
        stderr: stderr.to_string(),
    }
}

fn parse_flag<T: std::str::FromStr + Default>(cmd: &ToolCommand, flag: &str) -> T {
    cmd.flag_value(flag)
        .and_then(|v| v.parse().ok())
        .unwrap_or_default()
}
