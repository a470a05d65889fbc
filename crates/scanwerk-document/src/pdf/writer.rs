// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — assemble scanned page images into one document using
// `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`.

use std::path::Path;

use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use scanwerk_core::error::ScanwerkError;
use tracing::{debug, info, instrument};

/// Millimetres per inch, for converting scan pixels to page size.
const MM_PER_INCH: f32 = 25.4;

/// Builds a multi-page PDF with one scanned image per page.
///
/// Each page is exactly the size of the scanned area: pixel dimensions divided
/// by the scan resolution. Nothing is scaled, cropped, or recompressed beyond
/// what `printpdf` does when embedding the pixels.
pub struct PdfWriter {
    /// Title metadata embedded in the PDF /Info dictionary.
    title: Option<String>,
}

impl PdfWriter {
    pub fn new() -> Self {
        Self { title: None }
    }

    /// Set a title for the PDF metadata.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Decode every page in order and return the serialised PDF.
    ///
    /// `dpi` is the resolution the pages were scanned at.
    #[instrument(skip(self, pages), fields(pages = pages.len(), dpi))]
    pub fn assemble_pages<P: AsRef<Path>>(
        &self,
        pages: &[P],
        dpi: u32,
    ) -> Result<Vec<u8>, ScanwerkError> {
        if pages.is_empty() {
            return Err(ScanwerkError::AssemblyFailed("no pages to assemble".into()));
        }
        if dpi == 0 {
            return Err(ScanwerkError::AssemblyFailed("scan resolution of 0 dpi".into()));
        }

        let title = self.title.as_deref().unwrap_or("Scanwerk Scan");
        info!(title, "Assembling scanned pages into PDF");

        let mut doc = PdfDocument::new(title);
        let mut pdf_pages: Vec<PdfPage> = Vec::with_capacity(pages.len());

        for path in pages {
            let path = path.as_ref();
            let raw = load_page(path)?;
            let page_w = Mm(raw.width as f32 / dpi as f32 * MM_PER_INCH);
            let page_h = Mm(raw.height as f32 / dpi as f32 * MM_PER_INCH);

            let xobject_id = doc.add_image(&raw);

            // At the scan dpi the image covers the page exactly.
            let ops = vec![Op::UseXobject {
                id: xobject_id,
                transform: XObjectTransform {
                    translate_x: Some(Pt(0.0)),
                    translate_y: Some(Pt(0.0)),
                    scale_x: None,
                    scale_y: None,
                    dpi: Some(dpi as f32),
                    rotate: None,
                },
            }];

            debug!(
                page = %path.display(),
                width_mm = page_w.0,
                height_mm = page_h.0,
                "Page placed"
            );
            pdf_pages.push(PdfPage::new(page_w, page_h, ops));
        }

        doc.with_pages(pdf_pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);
        debug!(bytes = output.len(), warnings = warnings.len(), "PDF serialised");

        Ok(output)
    }

    // -- File output convenience ----------------------------------------------

    /// Assemble the pages and write the PDF to `out`.
    pub fn write_pages_to_file<P: AsRef<Path>>(
        &self,
        pages: &[P],
        dpi: u32,
        out: impl AsRef<Path>,
    ) -> Result<(), ScanwerkError> {
        let bytes = self.assemble_pages(pages, dpi)?;
        std::fs::write(out.as_ref(), &bytes)?;
        info!("Wrote scan PDF to {}", out.as_ref().display());
        Ok(())
    }
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode one scanned page into RGB pixels for embedding.
fn load_page(path: &Path) -> Result<RawImage, ScanwerkError> {
    // Sniff the format from the content: scanimage's `.pnm` is not an
    // extension every decoder registers.
    let dynamic_image = ::image::ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|err| {
            ScanwerkError::ImageError(format!("failed to open {}: {}", path.display(), err))
        })?
        .decode()
        .map_err(|err| {
            ScanwerkError::ImageError(format!("failed to decode {}: {}", path.display(), err))
        })?;

    let width = dynamic_image.width() as usize;
    let height = dynamic_image.height() as usize;
    if width == 0 || height == 0 {
        return Err(ScanwerkError::ImageError(format!(
            "{} has no pixels",
            path.display()
        )));
    }

    let rgb_image = dynamic_image.to_rgb8();
    Ok(RawImage {
        pixels: RawImageData::U8(rgb_image.into_raw()),
        width,
        height,
        data_format: RawImageFormat::RGB8,
        tag: Vec::new(),
    })
}
