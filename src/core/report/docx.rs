//! Word report writer built on `docx-rs`.
//!
//! Layout: US Letter landscape, half-inch margins, one centred image per
//! paragraph scaled to 9.5 inches wide, no paragraph spacing, and a page
//! break between images.

use super::{persist_bytes, ReportAssembler, ReportSummary};
use crate::core::composer::ComposedPage;
use crate::error::ReportError;
use chrono::Utc;
use docx_rs::{
    AlignmentType, BreakType, Docx, LineSpacing, PageMargin, PageOrientationType, Paragraph, Pic,
    Run,
};
use image::ImageFormat;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, instrument};

const TWIPS_PER_INCH: u32 = 1440;
const EMU_PER_INCH: u64 = 914_400;

/// Letter, landscape
const PAGE_WIDTH_TWIPS: u32 = 11 * TWIPS_PER_INCH;
const PAGE_HEIGHT_TWIPS: u32 = 17 * TWIPS_PER_INCH / 2;
const MARGIN_TWIPS: i32 = (TWIPS_PER_INCH / 2) as i32;

/// Displayed width of every page image (9.5 inches)
const IMAGE_WIDTH_EMU: u64 = EMU_PER_INCH * 19 / 2;

/// Landscape Word document with one composed page per sheet
#[derive(Debug, Clone, Default)]
pub struct DocxReport;

impl DocxReport {
    pub fn new() -> Self {
        Self
    }

    /// Displayed size in EMU: fixed width, height keeps the aspect ratio
    fn image_extent(width: u32, height: u32) -> (u32, u32) {
        let height_emu = (IMAGE_WIDTH_EMU * height as u64)
            .checked_div(width as u64)
            .unwrap_or(0);
        (
            IMAGE_WIDTH_EMU as u32,
            u32::try_from(height_emu).unwrap_or(u32::MAX),
        )
    }

    /// Serialise the pages to DOCX bytes
    #[instrument(skip(self, pages), fields(pages = pages.len()))]
    pub fn to_bytes(&self, pages: &[ComposedPage]) -> Result<Vec<u8>, ReportError> {
        if pages.is_empty() {
            return Err(ReportError::Empty);
        }

        let mut doc = Docx::new()
            .page_size(PAGE_WIDTH_TWIPS, PAGE_HEIGHT_TWIPS)
            .page_orient(PageOrientationType::Landscape)
            .page_margin(
                PageMargin::new()
                    .top(MARGIN_TWIPS)
                    .bottom(MARGIN_TWIPS)
                    .left(MARGIN_TWIPS)
                    .right(MARGIN_TWIPS),
            );

        let last = pages.len() - 1;
        for (index, page) in pages.iter().enumerate() {
            let mut png = Cursor::new(Vec::new());
            page.as_image()
                .write_to(&mut png, ImageFormat::Png)
                .map_err(|e| ReportError::Encode {
                    reason: format!("page {}: {}", index + 1, e),
                })?;

            let (width_emu, height_emu) = Self::image_extent(page.width(), page.height());
            let pic = Pic::new_with_dimensions(png.into_inner(), page.width(), page.height())
                .size(width_emu, height_emu);

            let mut paragraph = Paragraph::new()
                .align(AlignmentType::Center)
                .line_spacing(LineSpacing::new().before(0).after(0))
                .add_run(Run::new().add_image(pic));
            if index != last {
                paragraph = paragraph.add_run(Run::new().add_break(BreakType::Page));
            }
            doc = doc.add_paragraph(paragraph);
        }

        let mut output = Cursor::new(Vec::new());
        doc.build()
            .pack(&mut output)
            .map_err(|e| ReportError::Encode {
                reason: e.to_string(),
            })?;
        let bytes = output.into_inner();
        debug!(bytes = bytes.len(), "DOCX serialised");

        Ok(bytes)
    }
}

impl ReportAssembler for DocxReport {
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
