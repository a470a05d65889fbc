// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The scan work directory.
//
// scanimage writes batch files `out<index>.pnm` here, renumbering happens
// here, and finished PDFs land here. Only one Scanwerk instance may use a
// given directory at a time; nothing below locks it.

use std::path::{Path, PathBuf};

use scanwerk_core::error::Result;
use tracing::{debug, info};

/// `--batch` pattern handed to scanimage, relative to the work directory.
pub const BATCH_PATTERN: &str = "out%d.pnm";

/// Work directory holding batch files and output PDFs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanWorkspace {
    dir: PathBuf,
}

impl ScanWorkspace {
    /// Use `dir`, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of batch file `index`, matching what `BATCH_PATTERN` produces.
    pub fn batch_path(&self, index: u32) -> PathBuf {
        self.dir.join(format!("out{index}.pnm"))
    }

    /// Final page files `out1.pnm ..= out<pages>.pnm`, in page order.
    pub fn page_paths(&self, pages: u32) -> Vec<PathBuf> {
        (1..=pages).map(|n| self.batch_path(n)).collect()
    }

    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    /// Delete every batch file left over from earlier jobs.
    ///
    /// Returns how many were removed. PDFs and unrelated files are untouched.
    pub fn purge_batches(&self) -> Result<usize> {
        let mut removed = 0;
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if is_batch_file(name) && entry.file_type()?.is_file() {
                std::fs::remove_file(entry.path())?;
                debug!(file = name, "removed stale batch file");
                removed += 1;
            }
        }
        if removed > 0 {
            info!(removed, dir = %self.dir.display(), "purged stale batch files");
        }
        Ok(removed)
    }
}

/// `out<digits>.pnm`
fn is_batch_file(name: &str) -> bool {
    name.strip_prefix("out")
        .and_then(|rest| rest.strip_suffix(".pnm"))
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}
