//! PDF rendering through pdfium.

use super::{scale_factor, PageRenderer, RasterBitmap};
use crate::error::RenderError;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Renders PDF pages with a pdfium shared library
///
/// The library is bound on each call. pdfium serialises access internally,
/// so concurrent workers queue up inside the binding rather than here.
#[derive(Debug, Clone, Default)]
pub struct PdfiumRenderer {
    /// Directory holding the platform pdfium library; `None` = system search path
    library_dir: Option<PathBuf>,
}

impl PdfiumRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load pdfium from `dir` instead of the system search path
    pub fn with_library_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            library_dir: Some(dir.into()),
        }
    }

    fn bind(&self) -> Result<Pdfium, RenderError> {
        let bindings = match &self.library_dir {
            Some(dir) => {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
            }
            None => Pdfium::bind_to_system_library(),
        }
        .map_err(|e| RenderError::Backend {
            reason: e.to_string(),
        })?;

        Ok(Pdfium::new(bindings))
    }
}

impl PageRenderer for PdfiumRenderer {
    fn render(&self, path: &Path, page_index: usize, dpi: f32) -> Result<RasterBitmap, RenderError> {
        let pdfium = self.bind()?;

        let document = pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| RenderError::Open {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let page = document
            .pages()
            .iter()
            .nth(page_index)
            .ok_or_else(|| RenderError::PageMissing {
                path: path.to_path_buf(),
                page_index,
            })?;

        let config = PdfRenderConfig::new()
            .scale_page_by_factor(scale_factor(dpi))
            .set_clear_color(PdfColor::WHITE);

        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| RenderError::Decode {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let decode_error = |reason: &str| RenderError::Decode {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };
        let width = u32::try_from(bitmap.width()).map_err(|_| decode_error("negative width"))?;
        let height = u32::try_from(bitmap.height()).map_err(|_| decode_error("negative height"))?;

        debug!(path = %path.display(), width, height, dpi, "Rendered PDF page");

        RasterBitmap::from_rgba_over_white(width, height, &bitmap.as_rgba_bytes())
            .ok_or_else(|| decode_error("bitmap size does not match its pixel buffer"))
    }
}
