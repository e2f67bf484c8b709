//! PDF report writer built on `printpdf` 0.8.
//!
//! printpdf 0.8 builds documents from `PdfPage` values holding `Vec<Op>`
//! operation lists; `PdfDocument::save()` serialises them.

use super::{persist_bytes, ReportAssembler, ReportSummary};
use crate::core::composer::ComposedPage;
use crate::core::renderer::DEFAULT_DPI;
use crate::error::ReportError;
use chrono::Utc;
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use std::path::Path;
use tracing::{debug, instrument};

const MM_PER_INCH: f32 = 25.4;
const TITLE: &str = "Side-by-side comparison";

/// One full-bleed image per page; page size is the image size at `dpi`
#[derive(Debug, Clone)]
pub struct PdfReport {
    dpi: f32,
}

impl PdfReport {
    pub fn new(dpi: f32) -> Self {
        Self { dpi }
    }

    fn pixels_to_mm(&self, pixels: u32) -> Mm {
        Mm(pixels as f32 / self.dpi * MM_PER_INCH)
    }

    /// Serialise the pages to PDF bytes
    #[instrument(skip(self, pages), fields(pages = pages.len(), dpi = self.dpi))]
    pub fn to_bytes(&self, pages: &[ComposedPage]) -> Result<Vec<u8>, ReportError> {
        if pages.is_empty() {
            return Err(ReportError::Empty);
        }

        let mut doc = PdfDocument::new(TITLE);
        let mut pdf_pages = Vec::with_capacity(pages.len());

        for page in pages {
            let raw = RawImage {
                pixels: RawImageData::U8(page.pixels().to_vec()),
                width: page.width() as usize,
                height: page.height() as usize,
                data_format: RawImageFormat::RGB8,
                tag: Vec::new(),
            };
            let xobject_id = doc.add_image(&raw);

            let ops = vec![Op::UseXobject {
                id: xobject_id,
                transform: XObjectTransform {
                    translate_x: Some(Pt(0.0)),
                    translate_y: Some(Pt(0.0)),
                    scale_x: None,
                    scale_y: None,
                    dpi: Some(self.dpi),
                    rotate: None,
                },
            }];

            pdf_pages.push(PdfPage::new(
                self.pixels_to_mm(page.width()),
                self.pixels_to_mm(page.height()),
                ops,
            ));
        }

        doc.with_pages(pdf_pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);
        debug!(bytes = output.len(), warnings = warnings.len(), "PDF serialised");

        Ok(output)
    }
}

impl Default for PdfReport {
    fn default() -> Self {
        Self::new(DEFAULT_DPI)
    }
}

impl ReportAssembler for PdfReport {
    fn write(&self, pages: &[ComposedPage], output: &Path) -> Result<ReportSummary, ReportError> {
        let bytes = self.to_bytes(pages)?;
        persist_bytes(&bytes, output)?;

        Ok(ReportSummary {
            output: output.to_path_buf(),
            pages: pages.len(),
            bytes_written: bytes.len() as u64,
            generated_at: Utc::now(),
        })
    }
}
