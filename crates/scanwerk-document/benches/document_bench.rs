// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the in-process PDF assembler.
// Assembles a short stack of synthetic greyscale PNM pages, the format
// scanimage writes in batch mode.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use scanwerk_document::PdfWriter;

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Benchmark assembling four 200x260 greyscale pages at 75 dpi.
///
/// Roughly a letter-size page at the panel's default resolution, scaled down
/// so one iteration stays in the millisecond range.
fn bench_assemble_pages(c: &mut Criterion) {
    let dir = tempfile::tempdir().expect("tempdir");
    let (width, height) = (200u32, 260u32);
    let pages: Vec<_> = (1..=4)
        .map(|n| {
            let mut data = format!("P5\n{width} {height}\n255\n").into_bytes();
            data.extend((0..width * height).map(|i| ((i + n) % 251) as u8));
            let path = dir.path().join(format!("out{n}.pnm"));
            std::fs::write(&path, data).expect("write page");
            path
        })
        .collect();

    let writer = PdfWriter::new();
    c.bench_function("assemble_pages (4 x 200x260 pnm)", |b| {
        b.iter(|| {
            let pdf = writer.assemble_pages(black_box(&pages), 75).expect("assemble");
            black_box(pdf);
        });
    });
}

criterion_group!(benches, bench_assemble_pages);
criterion_main!(benches);
