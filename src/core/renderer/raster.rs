//! Raster image files as single-page documents.

use super::{scale_factor, PageRenderer, RasterBitmap};
use crate::error::RenderError;
use image::imageops::{self, FilterType};
use image::ImageError;
use std::path::Path;

/// Renders PNG/JPEG/... files, treating their pixels as a 72 DPI page
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterRenderer;

impl RasterRenderer {
    pub fn new() -> Self {
        RasterRenderer
    }
}

impl PageRenderer for RasterRenderer {
    fn render(&self, path: &Path, page_index: usize, dpi: f32) -> Result<RasterBitmap, RenderError> {
        if page_index != 0 {
            return Err(RenderError::PageMissing {
                path: path.to_path_buf(),
                page_index,
            });
        }

        let decoded = image::open(path).map_err(|e| match e {
            ImageError::IoError(io) => RenderError::Open {
                path: path.to_path_buf(),
                reason: io.to_string(),
            },
            other => RenderError::Decode {
                path: path.to_path_buf(),
                reason: other.to_string(),
            },
        })?;

        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        let flat = RasterBitmap::from_rgba_over_white(width, height, rgba.as_raw()).ok_or_else(
            || RenderError::Decode {
                path: path.to_path_buf(),
                reason: "pixel buffer does not match image size".to_string(),
            },
        )?;

        let factor = scale_factor(dpi);
        if (factor - 1.0).abs() < f32::EPSILON {
            return Ok(flat);
        }

        let target_width = ((width as f32 * factor).round() as u32).max(1);
        let target_height = ((height as f32 * factor).round() as u32).max(1);
        let scaled = imageops::resize(flat.as_image(), target_width, target_height, FilterType::Triangle);

        Ok(RasterBitmap::new(scaled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    fn write_png(dir: &TempDir, name: &str, image: &RgbaImage) -> std::path::PathBuf {
        let path = dir.path().join(name);
        image.save(&path).unwrap();
        path
    }

    #[test]
    fn renders_at_native_size_for_72_dpi() {
        let dir = TempDir::new().unwrap();
        let path = write_png(&dir, "page.png", &RgbaImage::from_pixel(4, 3, Rgba([9, 8, 7, 255])));

        let bitmap = RasterRenderer.render(&path, 0, 72.0).unwrap();

        assert_eq!((bitmap.width(), bitmap.height()), (4, 3));
        assert_eq!(&bitmap.pixels()[..3], &[9, 8, 7]);
    }

    #[test]
    fn scales_by_dpi() {
        let dir = TempDir::new().unwrap();
        let path = write_png(&dir, "page.png", &RgbaImage::from_pixel(10, 20, Rgba([0, 0, 0, 255])));

        let bitmap = RasterRenderer.render(&path, 0, 144.0).unwrap();

        assert_eq!((bitmap.width(), bitmap.height()), (20, 40));
    }

    #[test]
    fn rendering_is_deterministic() {
        let dir = TempDir::new().unwrap();
        let mut image = RgbaImage::from_pixel(7, 5, Rgba([200, 10, 10, 255]));
        image.put_pixel(3, 2, Rgba([0, 0, 255, 60]));
        let path = write_png(&dir, "page.png", &image);

        let first = RasterRenderer.render(&path, 0, 150.0).unwrap();
        let second = RasterRenderer.render(&path, 0, 150.0).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn transparent_background_becomes_white() {
        let dir = TempDir::new().unwrap();
        let path = write_png(&dir, "page.png", &RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0])));

        let bitmap = RasterRenderer.render(&path, 0, 72.0).unwrap();

        assert!(bitmap.pixels().iter().all(|&b| b == 255));
    }

    #[test]
    fn second_page_is_missing() {
        let dir = TempDir::new().unwrap();
        let path = write_png(&dir, "page.png", &RgbaImage::new(1, 1));

        let result = RasterRenderer.render(&path, 1, 72.0);

        assert!(matches!(result, Err(RenderError::PageMissing { page_index: 1, .. })));
    }

    #[test]
    fn corrupt_file_is_a_render_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"this is not an image").unwrap();

        assert!(RasterRenderer.render(&path, 0, 72.0).is_err());
    }

    #[test]
    fn missing_file_is_an_open_error() {
        let dir = TempDir::new().unwrap();
        let result = RasterRenderer.render(&dir.path().join("gone.png"), 0, 72.0);
        assert!(matches!(result, Err(RenderError::Open { .. })));
    }
}
