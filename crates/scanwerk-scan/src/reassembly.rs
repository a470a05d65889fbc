// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page renumbering after feeder passes.
//
// A feeder pass writes its pages as batch files starting above a fixed base
// (1001.. for the front pass, 2001.. for the back pass). Renumbering moves
// them to their final positions 1..=pages.
//
// Two-sided jobs interleave the passes. The user turns the whole stack over
// between passes, so the back pass sees the sheets last-to-first: the back of
// sheet n is back-pass file 2000 + N - n.

use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::types::{BACK_BATCH_BASE, FRONT_BATCH_BASE, PageCount, ScanJob, ScanSource};
use tracing::{debug, info, instrument};

use crate::workspace::ScanWorkspace;

/// Move batch file `from` to final page position `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rename {
    pub from: u32,
    pub to: u32,
}

/// Every rename a finished job needs, computed before anything is touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamePlan {
    renames: Vec<Rename>,
    pages: u32,
}

impl RenamePlan {
    /// One feeder pass: `1000 + n + 1` becomes `n + 1`.
    pub fn single_sided(sheets: PageCount) -> Self {
        let n_sheets = sheets.get();
        let renames = (0..n_sheets)
            .map(|n| Rename {
                from: FRONT_BATCH_BASE + n + 1,
                to: n + 1,
            })
            .collect();
        Self {
            renames,
            pages: n_sheets,
        }
    }

    /// Two feeder passes: front `1000 + n + 1` becomes `2n + 1`, back
    /// `2000 + N - n` becomes `2n + 2`.
    pub fn duplex(sheets: PageCount) -> Self {
        let n_sheets = sheets.get();
        let mut renames = Vec::with_capacity(2 * n_sheets as usize);
        for n in 0..n_sheets {
            renames.push(Rename {
                from: FRONT_BATCH_BASE + n + 1,
                to: 2 * n + 1,
            });
            renames.push(Rename {
                from: BACK_BATCH_BASE + n_sheets - n,
                to: 2 * n + 2,
            });
        }
        Self {
            renames,
            pages: 2 * n_sheets,
        }
    }

    /// The plan for `job`. Glass scans already land on page 1.
    pub fn for_job(job: &ScanJob) -> Self {
        match job.source {
            ScanSource::Flatbed => Self {
                renames: Vec::new(),
                pages: 1,
            },
            ScanSource::Feeder if job.is_duplex() => Self::duplex(job.page_count),
            ScanSource::Feeder => Self::single_sided(job.page_count),
        }
    }

    pub fn renames(&self) -> &[Rename] {
        &self.renames
    }

    /// Pages in the finished document.
    pub fn pages(&self) -> u32 {
        self.pages
    }

    /// Source batch index for each final position, in page order.
    ///
    /// Positions the plan does not rename keep their own index.
    pub fn final_order(&self) -> Vec<u32> {
        (1..=self.pages)
            .map(|pos| {
                self.renames
                    .iter()
                    .find(|r| r.to == pos)
                    .map_or(pos, |r| r.from)
            })
            .collect()
    }

    /// Carry out the plan in `workspace` and return the final page count.
    ///
    /// Every source file is checked first. If any is missing nothing is
    /// renamed and the job fails with `MissingBatchFile`.
    #[instrument(skip_all, fields(renames = self.renames.len(), pages = self.pages))]
    pub fn apply(&self, workspace: &ScanWorkspace) -> Result<u32> {
        if let Some(missing) = self
            .renames
            .iter()
            .map(|r| workspace.batch_path(r.from))
            .find(|path| !path.is_file())
        {
            return Err(ScanwerkError::MissingBatchFile { path: missing });
        }

        for rename in &self.renames {
            let from = workspace.batch_path(rename.from);
            let to = workspace.batch_path(rename.to);
            std::fs::rename(&from, &to)?;
            debug!(from = rename.from, to = rename.to, "renumbered page");
        }

        info!(pages = self.pages, "pages renumbered");
        Ok(self.pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanwerk_core::types::Sides;

    fn count(n: u32) -> PageCount {
        PageCount::new(n).unwrap()
    }

    #[test]
    fn duplex_three_sheets_interleaves_reversed_backs() {
        let plan = RenamePlan::duplex(count(3));
        assert_eq!(plan.pages(), 6);
        assert_eq!(plan.final_order(), vec![1001, 2003, 1002, 2002, 1003, 2001]);
    }

    #[test]
    fn duplex_positions_follow_formula_for_many_sizes() {
        for n in [1, 2, 5, 17, 100] {
            let plan = RenamePlan::duplex(count(n));
            let order = plan.final_order();
            assert_eq!(order.len(), 2 * n as usize);
            for k in 0..n {
                assert_eq!(order[(2 * k) as usize], 1000 + k + 1);
                assert_eq!(order[(2 * k + 1) as usize], 2000 + n - k);
            }
        }
    }

    #[test]
    fn single_sided_is_an_order_preserving_bijection() {
        for n in [1, 4, 30] {
            let plan = RenamePlan::single_sided(count(n));
            assert_eq!(plan.pages(), n);
            let expected: Vec<u32> = (1..=n).map(|i| 1000 + i).collect();
            assert_eq!(plan.final_order(), expected);
            let mut targets: Vec<u32> = plan.renames().iter().map(|r| r.to).collect();
            targets.sort_unstable();
            assert_eq!(targets, (1..=n).collect::<Vec<_>>());
        }
    }

    #[test]
    fn glass_job_needs_no_renames() {
        let job = ScanJob::new("dev", ScanSource::Flatbed);
        let plan = RenamePlan::for_job(&job);
        assert!(plan.renames().is_empty());
        assert_eq!(plan.final_order(), vec![1]);
    }

    #[test]
    fn for_job_picks_duplex_only_for_two_sided_feeder() {
        let job = ScanJob::new("dev", ScanSource::Feeder)
            .with_sides(Sides::TwoSided)
            .with_page_count(count(2));
        assert_eq!(RenamePlan::for_job(&job), RenamePlan::duplex(count(2)));
        let job = job.with_sides(Sides::OneSided);
        assert_eq!(RenamePlan::for_job(&job), RenamePlan::single_sided(count(2)));
    }

    #[test]
    fn largest_duplex_job_never_targets_a_batch_index() {
        let plan = RenamePlan::duplex(count(scanwerk_core::types::MAX_SHEETS));
        let max_target = plan.renames().iter().map(|r| r.to).max().unwrap();
        assert!(max_target <= FRONT_BATCH_BASE);
    }

    #[test]
    fn apply_moves_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let ws = ScanWorkspace::open(dir.path()).unwrap();
        for i in [1001, 1002, 2001, 2002] {
            std::fs::write(ws.batch_path(i), format!("batch {i}")).unwrap();
        }
        let pages = RenamePlan::duplex(count(2)).apply(&ws).unwrap();
        assert_eq!(pages, 4);
        let contents: Vec<String> = ws
            .page_paths(4)
            .iter()
            .map(|p| std::fs::read_to_string(p).unwrap())
            .collect();
        assert_eq!(contents, ["batch 1001", "batch 2002", "batch 1002", "batch 2001"]);
        assert!(!ws.batch_path(1001).exists());
    }

    #[test]
    fn missing_source_aborts_before_any_rename() {
        let dir = tempfile::tempdir().unwrap();
        let ws = ScanWorkspace::open(dir.path()).unwrap();
        for i in [1001, 1002, 1003, 2001, 2002] {
            std::fs::write(ws.batch_path(i), b"page").unwrap();
        }
        let err = RenamePlan::duplex(count(3)).apply(&ws).unwrap_err();
        match err {
            ScanwerkError::MissingBatchFile { path } => assert_eq!(path, ws.batch_path(2003)),
            other => panic!("unexpected error: {other}"),
        }
        assert!(ws.batch_path(1001).exists());
        assert!(!ws.batch_path(1).exists());
    }
}
