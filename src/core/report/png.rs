//! Numbered PNG sequence writer.

use super::{prepare_parent, ReportAssembler, ReportSummary};
use crate::core::composer::ComposedPage;
use crate::error::ReportError;
use chrono::Utc;
use image::ImageFormat;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Writes `page_001.png`, `page_002.png`, ... into the output directory
#[derive(Debug, Clone, Copy, Default)]
pub struct PngSequenceReport;

impl PngSequenceReport {
    pub fn new() -> Self {
        PngSequenceReport
    }

    /// File name of page `index` (0-based) in a report of `total` pages
    pub fn page_file_name(index: usize, total: usize) -> String {
        let digits = total.to_string().len().max(3);
        format!("page_{:0digits$}.png", index + 1)
    }
}

impl ReportAssembler for PngSequenceReport {
    fn write(&self, pages: &[ComposedPage], output: &Path) -> Result<ReportSummary, ReportError> {
        if pages.is_empty() {
            return Err(ReportError::Empty);
        }

        let io_error = |path: &Path, source: std::io::Error| ReportError::Io {
            path: path.to_path_buf(),
            source,
        };

        let replace_empty_dir = if output.exists() {
            let is_empty_dir = output.is_dir()
                && fs::read_dir(output)
                    .map_err(|e| io_error(output, e))?
                    .next()
                    .is_none();
            if !is_empty_dir {
                return Err(ReportError::OutputExists {
                    path: output.to_path_buf(),
                });
            }
            true
        } else {
            false
        };

        let parent = prepare_parent(output)?;
        let staging = tempfile::Builder::new()
            .prefix(".pages-")
            .tempdir_in(&parent)
            .map_err(|e| io_error(&parent, e))?;

        let mut bytes_written = 0;
        for (index, page) in pages.iter().enumerate() {
            let path = staging
                .path()
                .join(Self::page_file_name(index, pages.len()));
            page.as_image()
                .save_with_format(&path, ImageFormat::Png)
                .map_err(|e| ReportError::Encode {
                    reason: format!("{}: {}", path.display(), e),
                })?;
            bytes_written += fs::metadata(&path).map_err(|e| io_error(&path, e))?.len();
        }

        if replace_empty_dir {
            fs::remove_dir(output).map_err(|e| io_error(output, e))?;
        }
        // After the rename the staging guard points at nothing and its cleanup is a no-op
        fs::rename(staging.path(), output).map_err(|e| io_error(output, e))?;

        debug!(output = %output.display(), pages = pages.len(), "PNG sequence written");

        Ok(ReportSummary {
            output: output.to_path_buf(),
            pages: pages.len(),
            bytes_written,
            generated_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::composer::compose;
    use crate::core::renderer::RasterBitmap;
    use tempfile::TempDir;

    fn page(shade: u8) -> ComposedPage {
        compose(
            RasterBitmap::filled(2, 2, [shade; 3]),
            RasterBitmap::filled(1, 1, [0; 3]),
        )
        .unwrap()
    }

    #[test]
    fn file_names_are_zero_padded() {
        assert_eq!(PngSequenceReport::page_file_name(0, 5), "page_001.png");
        assert_eq!(PngSequenceReport::page_file_name(41, 1200), "page_0042.png");
    }

    #[test]
    fn writes_pages_in_order() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("pages");

        let summary = PngSequenceReport
            .write(&[page(10), page(20)], &output)
            .unwrap();

        assert_eq!(summary.pages, 2);
        let first = image::open(output.join("page_001.png")).unwrap().to_rgb8();
        let second = image::open(output.join("page_002.png")).unwrap().to_rgb8();
        assert_eq!(first.get_pixel(0, 0).0, [10, 10, 10]);
        assert_eq!(second.get_pixel(0, 0).0, [20, 20, 20]);
        assert_eq!(first.dimensions(), (3, 2));
    }

    #[test]
    fn reuses_an_empty_output_directory() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("pages");
        fs::create_dir(&output).unwrap();

        PngSequenceReport.write(&[page(1)], &output).unwrap();

        assert!(output.join("page_001.png").is_file());
    }

    #[test]
    fn refuses_a_non_empty_output_directory() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("pages");
        fs::create_dir(&output).unwrap();
        fs::write(output.join("notes.txt"), b"keep me").unwrap();

        let result = PngSequenceReport.write(&[page(1)], &output);

        assert!(matches!(result, Err(ReportError::OutputExists { .. })));
        assert!(output.join("notes.txt").is_file());
    }
}
