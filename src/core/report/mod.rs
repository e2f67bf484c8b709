//! # Report Module
//!
//! Writes the ordered composed pages as one artifact.
//!
//! ## Formats
//! - **PDF** - one PDF page per composed page, sized to the image at the run's DPI
//! - **DOCX** - landscape Word document, one centred image per page
//! - **PNG** - a directory of numbered PNG files
//!
//! Writers stage their output next to the destination and move it into place
//! only when everything was written, so a failed run leaves no partial report.

mod docx;
mod pdf;
mod png;

pub use docx::DocxReport;
pub use pdf::PdfReport;
pub use png::PngSequenceReport;

use crate::core::composer::ComposedPage;
use crate::error::ReportError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Writes composed pages, in sequence order, to `output`
pub trait ReportAssembler: Send + Sync {
    fn write(&self, pages: &[ComposedPage], output: &Path) -> Result<ReportSummary, ReportError>;
}

/// What a writer produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub output: PathBuf,
    pub pages: usize,
    pub bytes_written: u64,
    pub generated_at: DateTime<Utc>,
}

/// Available report formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Pdf,
    Docx,
    Png,
}

impl ReportFormat {
    /// Writer for this format; `dpi` sets the physical page size of PDF output
    pub fn assembler(self, dpi: f32) -> Box<dyn ReportAssembler> {
        match self {
            ReportFormat::Pdf => Box::new(PdfReport::new(dpi)),
            ReportFormat::Docx => Box::new(DocxReport::new()),
            ReportFormat::Png => Box::new(PngSequenceReport::new()),
        }
    }

    /// Default output location when none is given
    pub fn default_output(self) -> PathBuf {
        match self {
            ReportFormat::Pdf => PathBuf::from("comparison_report.pdf"),
            ReportFormat::Docx => PathBuf::from("comparison_report.docx"),
            ReportFormat::Png => PathBuf::from("comparison_pages"),
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Pdf => write!(f, "PDF"),
            ReportFormat::Docx => write!(f, "DOCX"),
            ReportFormat::Png => write!(f, "PNG sequence"),
        }
    }
}

/// Directory the output lands in, created if missing
fn prepare_parent(output: &Path) -> Result<PathBuf, ReportError> {
    let parent = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent).map_err(|source| ReportError::Io {
        path: parent.clone(),
        source,
    })?;
    Ok(parent)
}

/// Write `bytes` to a temporary file beside `output`, then rename it over `output`
fn persist_bytes(bytes: &[u8], output: &Path) -> Result<(), ReportError> {
    let parent = prepare_parent(output)?;

    let io_error = |path: &Path, source: std::io::Error| ReportError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut staged = NamedTempFile::new_in(&parent).map_err(|e| io_error(&parent, e))?;
    staged
        .write_all(bytes)
        .and_then(|_| staged.as_file().sync_all())
        .map_err(|e| io_error(staged.path(), e))?;
    staged
        .persist(output)
        .map_err(|e| io_error(output, e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn prepare_parent_creates_missing_directories() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("a/b/report.pdf");

        let parent = prepare_parent(&output).unwrap();

        assert!(parent.is_dir());
        assert_eq!(parent, dir.path().join("a/b"));
    }

    #[test]
    fn bare_file_name_uses_current_directory() {
        assert_eq!(prepare_parent(Path::new("report.pdf")).unwrap(), PathBuf::from("."));
    }

    #[test]
    fn format_defaults() {
        assert_eq!(ReportFormat::Pdf.default_output(), PathBuf::from("comparison_report.pdf"));
        assert_eq!(ReportFormat::Docx.default_output(), PathBuf::from("comparison_report.docx"));
        assert_eq!(ReportFormat::Png.to_string(), "PNG sequence");
    }

    #[test]
    fn persisted_bytes_replace_existing_file() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("report.bin");
        std::fs::write(&output, b"old").unwrap();

        persist_bytes(b"new contents", &output).unwrap();

        assert_eq!(std::fs::read(&output).unwrap(), b"new contents");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
