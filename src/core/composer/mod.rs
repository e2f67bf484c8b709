//! # Composer Module
//!
//! Places two rendered pages side by side on one white canvas.
//!
//! ```text
//! +-----------+----------------+
//! |           |                |
//! |   left    |     right      |
//! |           |                |
//! |           +----------------+
//! |           |     white      |
//! +-----------+----------------+
//! ```
//!
//! Neither input is scaled or cropped. The canvas is as wide as both inputs
//! together and as tall as the taller one.

use crate::core::renderer::RasterBitmap;
use crate::error::ComposeError;
use image::imageops;
use image::{Rgb, RgbImage};

/// Canvas background
pub const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// The side-by-side image for one pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPage {
    image: RgbImage,
}

impl ComposedPage {
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

/// Compose `left` and `right` into one page
///
/// Pure and deterministic: the same inputs always give the same bytes.
pub fn compose(left: RasterBitmap, right: RasterBitmap) -> Result<ComposedPage, ComposeError> {
    let width = left.width().checked_add(right.width());
    let height = left.height().max(right.height());

    let width = match width {
        Some(w) if (w as u64) * (height as u64) * 3 <= isize::MAX as u64 => w,
        _ => {
            return Err(ComposeError::CanvasTooLarge {
                width: left.width() as u64 + right.width() as u64,
                height: height as u64,
            })
        }
    };

    let mut canvas = RgbImage::from_pixel(width, height, BACKGROUND);
    imageops::replace(&mut canvas, left.as_image(), 0, 0);
    imageops::replace(&mut canvas, right.as_image(), left.width() as i64, 0);

    Ok(ComposedPage { image: canvas })
}
