// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for duplex renumbering: planning the renames for a
// full feeder stack, and applying a plan to real files in a temp directory.

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};

use scanwerk_core::types::{MAX_SHEETS, PageCount};
use scanwerk_scan::{RenamePlan, ScanWorkspace};

/// Plan and order the largest duplex job the panel accepts.
fn bench_plan_full_stack(c: &mut Criterion) {
    let sheets = PageCount::new(MAX_SHEETS).unwrap();
    c.bench_function("duplex_plan_499_sheets", |b| {
        b.iter(|| {
            let plan = RenamePlan::duplex(black_box(sheets));
            black_box(plan.final_order())
        })
    });
}

/// Rename a 50-sheet duplex batch on disk.
fn bench_apply_plan(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let workspace = ScanWorkspace::open(dir.path()).unwrap();
    let plan = RenamePlan::duplex(PageCount::new(50).unwrap());

    c.bench_function("duplex_apply_50_sheets", |b| {
        b.iter_batched(
            || {
                workspace.purge_batches().unwrap();
                for rename in plan.renames() {
                    std::fs::write(workspace.batch_path(rename.from), b"P5\n1 1\n255\n\0").unwrap();
                }
            },
            |()| black_box(plan.apply(&workspace).unwrap()),
            BatchSize::PerIteration,
        )
    });
}

criterion_group!(benches, bench_plan_full_stack, bench_apply_plan);
criterion_main!(benches);
