//! # Renderer Module
//!
//! Turns one page of a document into an RGB bitmap.
//!
//! ## Contract
//! - No transparency: alpha is flattened onto white
//! - Deterministic scale: the page's 72 DPI coordinate space is magnified by
//!   `dpi / 72` in both directions, so output size depends only on the page
//!   size and the DPI
//!
//! ## Backends
//! - [`PdfiumRenderer`] - PDF pages through a pdfium shared library
//! - [`RasterRenderer`] - raster image files treated as one-page documents

mod pdfium;
mod raster;

pub use pdfium::PdfiumRenderer;
pub use raster::RasterRenderer;

use crate::error::RenderError;
use image::{Rgb, RgbImage};
use std::path::Path;

/// Resolution of a page's native coordinate space
pub const NATIVE_DPI: f32 = 72.0;

/// Default render resolution
pub const DEFAULT_DPI: f32 = 150.0;

/// Magnification applied to native page coordinates for a target DPI
pub fn scale_factor(dpi: f32) -> f32 {
    dpi / NATIVE_DPI
}

/// Renders document pages
///
/// Implementations are shared by all render workers, hence `Send + Sync`.
pub trait PageRenderer: Send + Sync {
    /// Render page `page_index` (0-based) of `path` at `dpi`
    fn render(&self, path: &Path, page_index: usize, dpi: f32) -> Result<RasterBitmap, RenderError>;
}

/// An opaque RGB bitmap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBitmap {
    image: RgbImage,
}

impl RasterBitmap {
    pub fn new(image: RgbImage) -> Self {
        Self { image }
    }

    /// A bitmap filled with one colour
    pub fn filled(width: u32, height: u32, color: [u8; 3]) -> Self {
        Self::new(RgbImage::from_pixel(width, height, Rgb(color)))
    }

    /// Wrap packed RGB bytes; `None` if the buffer length does not fit the size
    pub fn from_rgb(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        RgbImage::from_raw(width, height, pixels).map(Self::new)
    }

    /// Build from packed RGBA bytes, compositing every pixel over white
    pub fn from_rgba_over_white(width: u32, height: u32, rgba: &[u8]) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        if rgba.len() != expected {
            return None;
        }

        let rgb = rgba
            .chunks_exact(4)
            .flat_map(|px| {
                let alpha = px[3] as u32;
                let blend = move |c: u8| ((c as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
                [blend(px[0]), blend(px[1]), blend(px[2])]
            })
            .collect();

        Self::from_rgb(width, height, rgb)
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Packed RGB bytes, row-major
    pub fn pixels(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn as_image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }
}
