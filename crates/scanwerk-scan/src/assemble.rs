// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Output assembly: ordered page files in, one PDF out.

use std::path::{Path, PathBuf};

use scanwerk_core::config::{AppConfig, AssemblerKind};
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_document::PdfWriter;
use tracing::{info, instrument};

use crate::runner::{CommandRunner, ToolCommand};

/// The configured way of turning pages into a PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputAssembler {
    /// `<tool> <pages...> -o <out>`
    Img2Pdf { tool: String },
    /// In-process via `PdfWriter`.
    Native,
}

impl OutputAssembler {
    pub fn from_config(config: &AppConfig) -> Self {
        match config.assembler {
            AssemblerKind::Img2Pdf => Self::Img2Pdf {
                tool: config.assembly_tool.clone(),
            },
            AssemblerKind::Native => Self::Native,
        }
    }

    /// Write `pages`, in order, to the PDF at `out`.
    ///
    /// The output must exist afterwards; anything else is `AssemblyFailed`.
    #[instrument(skip(self, runner, pages), fields(pages = pages.len(), out = %out.display()))]
    pub fn assemble<R: CommandRunner>(
        &self,
        runner: &R,
        pages: &[PathBuf],
        dpi: u32,
        out: &Path,
    ) -> Result<()> {
        if pages.is_empty() {
            return Err(ScanwerkError::AssemblyFailed("no pages to assemble".into()));
        }
        match self {
            Self::Img2Pdf { tool } => {
                let cmd = assembly_command(tool, pages, out);
                let output = runner.output(&cmd)?;
                if !output.status.success() {
                    return Err(ScanwerkError::AssemblyFailed(format!(
                        "{tool} exited with {:?}: {}",
                        output.status.code,
                        output.stderr.trim()
                    )));
                }
            }
            Self::Native => {
                let mut writer = PdfWriter::new();
                if let Some(name) = out.file_stem().and_then(|s| s.to_str()) {
                    writer.set_title(name);
                }
                writer.write_pages_to_file(pages, dpi, out)?;
            }
        }
        if !out.is_file() {
            return Err(ScanwerkError::AssemblyFailed(format!(
                "{} was not written",
                out.display()
            )));
        }
        info!("PDF assembled");
        Ok(())
    }
}

fn assembly_command(tool: &str, pages: &[PathBuf], out: &Path) -> ToolCommand {
    ToolCommand::new(tool)
        .args(pages.iter().map(|p| p.display().to_string()))
        .arg("-o")
        .arg(out.display().to_string())
}
