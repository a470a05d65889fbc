// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// External tool invocation.
//
// Every child process Scanwerk starts (scanimage, gamma4scanimage, img2pdf,
// scp, ssh, mail) is described as a `ToolCommand` and launched through the
// `CommandRunner` trait. `SystemRunner` is the real implementation; tests
// substitute a scripted runner that fabricates scan output.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use scanwerk_core::error::{Result, ScanwerkError};
use tracing::{debug, warn};

/// A fully described external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    /// The tool itself, e.g. `scanimage`.
    pub program: String,
    pub args: Vec<String>,
    /// Run under `nice -n <n>` when set.
    pub nice: Option<i8>,
    pub current_dir: Option<PathBuf>,
    /// Text fed to the tool's stdin.
    pub stdin: Option<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            nice: None,
            current_dir: None,
            stdin: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn niced(mut self, nice: i8) -> Self {
        self.nice = Some(nice);
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    /// Value following `flag` in the arguments, for `--flag=value` or `flag value`.
    pub fn flag_value(&self, flag: &str) -> Option<&str> {
        let prefixed = format!("{flag}=");
        let mut iter = self.args.iter();
        while let Some(arg) = iter.next() {
            if let Some(value) = arg.strip_prefix(&prefixed) {
                return Some(value);
            }
            if arg == flag {
                return iter.next().map(String::as_str);
            }
        }
        None
    }

    /// Program and arguments as actually executed, including the nice wrapper.
    pub fn argv(&self) -> (String, Vec<String>) {
        match self.nice {
            Some(n) => {
                let mut args = vec!["-n".to_string(), n.to_string(), self.program.clone()];
                args.extend(self.args.iter().cloned());
                ("nice".to_string(), args)
            }
            None => (self.program.clone(), self.args.clone()),
        }
    }
}

impl std::fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (program, args) = self.argv();
        write!(f, "{program}")?;
        for arg in args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " {arg:?}")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Exit status of a finished tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolStatus {
    /// `None` when the process was killed by a signal.
    pub code: Option<i32>,
}

impl ToolStatus {
    pub const SUCCESS: ToolStatus = ToolStatus { code: Some(0) };

    pub fn from_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Exit status plus captured output.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub status: ToolStatus,
    pub stdout: String,
    pub stderr: String,
}

/// Launches external tools and waits for them.
///
/// Both methods block until the child exits. An `Err` means the tool could
/// not be started at all; a tool that ran and failed is an `Ok` with a
/// non-success status.
pub trait CommandRunner {
    /// Run with stdout/stderr inherited, so progress shows on the console.
    fn run(&self, command: &ToolCommand) -> Result<ToolStatus>;

    /// Run with stdout/stderr captured.
    fn output(&self, command: &ToolCommand) -> Result<ToolOutput>;
}

/// Runs tools as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    fn command(&self, tool: &ToolCommand) -> Command {
        let (program, args) = tool.argv();
        let mut cmd = Command::new(program);
        cmd.args(args);
        if let Some(dir) = &tool.current_dir {
            cmd.current_dir(dir);
        }
        cmd.stdin(if tool.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });
        cmd
    }

    fn launch_error(tool: &ToolCommand, source: std::io::Error) -> ScanwerkError {
        ScanwerkError::ToolLaunch {
            tool: tool.program.clone(),
            source,
        }
    }

    /// Write the tool's stdin; if that fails the child is killed and reaped.
    fn feed_stdin(tool: &ToolCommand, child: &mut std::process::Child) -> Result<()> {
        if let (Some(input), Some(mut pipe)) = (&tool.stdin, child.stdin.take())
            && let Err(e) = pipe.write_all(input.as_bytes())
        {
            warn!(command = %tool, error = %e, "could not feed tool, stopping it");
            drop(pipe);
            let _ = child.kill();
            let _ = child.wait();
            return Err(e.into());
        }
        // The pipe was dropped above, so the tool sees EOF.
        Ok(())
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, tool: &ToolCommand) -> Result<ToolStatus> {
        debug!(command = %tool, "running tool");
        let mut child = self
            .command(tool)
            .spawn()
            .map_err(|e| Self::launch_error(tool, e))?;
        Self::feed_stdin(tool, &mut child)?;
        let status = child.wait()?;
        Ok(ToolStatus {
            code: status.code(),
        })
    }

    fn output(&self, tool: &ToolCommand) -> Result<ToolOutput> {
        debug!(command = %tool, "running tool (captured)");
        let mut child = self
            .command(tool)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Self::launch_error(tool, e))?;
        Self::feed_stdin(tool, &mut child)?;
        let output = child.wait_with_output()?;
        Ok(ToolOutput {
            status: ToolStatus {
                code: output.status.code(),
            },
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
