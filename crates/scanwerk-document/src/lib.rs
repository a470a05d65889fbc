// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scanwerk-document — Turning scanned page images into a PDF.
//
// Provides the in-process PDF assembler (one scanned image per page, page size
// taken from the scan resolution) and SHA-256 fingerprinting of the result.

pub mod integrity;
pub mod pdf;

// Re-export the primary structs so callers can use `scanwerk_document::PdfWriter` etc.
pub use integrity::{hash_bytes, hash_file};
pub use pdf::writer::PdfWriter;
