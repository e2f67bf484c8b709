//! Integration tests for the comparison pipeline.
//!
//! These run the whole flow on real files, using raster images as one-page
//! documents so no pdfium library is needed:
//! - Both matching policies against real directories
//! - Fatal conditions (missing directory, count mismatch, no usable pairs)
//! - Failure isolation and page order
//! - Report writing

use assert_fs::prelude::*;
use image::{Rgb, RgbImage};
use pdf_pair_compare::core::composer::ComposedPage;
use pdf_pair_compare::core::matcher::{DocumentFilter, MatchPolicy, MatchWarning};
use pdf_pair_compare::core::pipeline::{assemble_report, Pipeline};
use pdf_pair_compare::core::renderer::RasterRenderer;
use pdf_pair_compare::core::report::{
    PdfReport, PngSequenceReport, ReportAssembler, ReportFormat, ReportSummary,
};
use pdf_pair_compare::error::{ComparisonError, MatchError, ReportError};
use pdf_pair_compare::events::{null_sender, Event, EventChannel, RenderEvent};
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

/// Counts calls and never writes anything
#[derive(Default)]
struct CountingAssembler {
    calls: AtomicUsize,
}

impl ReportAssembler for CountingAssembler {
    fn write(&self, pages: &[ComposedPage], output: &Path) -> Result<ReportSummary, ReportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ReportSummary {
            output: output.to_path_buf(),
            pages: pages.len(),
            bytes_written: 0,
            generated_at: chrono::Utc::now(),
        })
    }
}

fn write_page(dir: &Path, name: &str, width: u32, height: u32, color: [u8; 3]) {
    RgbImage::from_pixel(width, height, Rgb(color))
        .save(dir.join(name))
        .unwrap();
}

fn image_pipeline(original: &Path, revised: &Path, policy: MatchPolicy) -> Pipeline {
    Pipeline::builder()
        .original_dir(original)
        .revised_dir(revised)
        .policy(policy)
        .filter(DocumentFilter::images())
        .dpi(72.0)
        .threads(4)
        .renderer(Box::new(RasterRenderer::new()))
        .build()
}

#[test]
fn key_policy_pairs_shared_prefixes_only() {
    let original = TempDir::new().unwrap();
    let revised = TempDir::new().unwrap();
    write_page(original.path(), "001_intro.png", 4, 4, [255, 0, 0]);
    write_page(original.path(), "002_terms.png", 4, 4, [255, 0, 0]);
    write_page(revised.path(), "001_intro_v2.png", 4, 4, [0, 0, 255]);
    write_page(revised.path(), "003_annex.png", 4, 4, [0, 0, 255]);

    let result = image_pipeline(
        original.path(),
        revised.path(),
        MatchPolicy::KeyPrefix { width: 3 },
    )
    .run()
    .unwrap();

    assert_eq!(result.total_pairs, 1);
    assert_eq!(result.pages.len(), 1);
    assert_eq!(result.warnings.len(), 2);
    assert!(result
        .warnings
        .iter()
        .all(|w| matches!(w, MatchWarning::UnmatchedKey { .. })));
}

#[test]
fn composed_page_geometry_end_to_end() {
    let original = TempDir::new().unwrap();
    let revised = TempDir::new().unwrap();
    write_page(original.path(), "001.png", 300, 400, [255, 0, 0]);
    write_page(revised.path(), "001.png", 500, 200, [0, 0, 255]);

    let result = image_pipeline(original.path(), revised.path(), MatchPolicy::Strict)
        .run()
        .unwrap();

    let page = result.pages[0].as_image();
    assert_eq!(page.dimensions(), (800, 400));
    assert_eq!(page.get_pixel(299, 399).0, [255, 0, 0]);
    assert_eq!(page.get_pixel(300, 0).0, [0, 0, 255]);
    assert_eq!(page.get_pixel(799, 199).0, [0, 0, 255]);
    assert_eq!(page.get_pixel(799, 200).0, [255, 255, 255]);
}

#[test]
fn strict_policy_rejects_uneven_directories() {
    let original = TempDir::new().unwrap();
    let revised = TempDir::new().unwrap();
    write_page(original.path(), "a.png", 1, 1, [0, 0, 0]);
    write_page(original.path(), "b.png", 1, 1, [0, 0, 0]);
    write_page(revised.path(), "a.png", 1, 1, [0, 0, 0]);

    let result = image_pipeline(original.path(), revised.path(), MatchPolicy::Strict).run();

    assert!(matches!(
        result,
        Err(ComparisonError::Match(MatchError::CountMismatch {
            original: 2,
            revised: 1
        }))
    ));
}

#[test]
fn missing_directory_is_fatal() {
    let revised = TempDir::new().unwrap();

    let result = image_pipeline(
        Path::new("/nonexistent/path/that/does/not/exist"),
        revised.path(),
        MatchPolicy::Strict,
    )
    .run();

    assert!(matches!(
        result,
        Err(ComparisonError::Match(MatchError::DirectoryNotFound { .. }))
    ));
}

#[test]
fn corrupt_document_only_drops_its_pair() {
    let original = TempDir::new().unwrap();
    let revised = TempDir::new().unwrap();
    for (i, name) in ["001.png", "002.png", "003.png"].iter().enumerate() {
        let width = (i as u32 + 1) * 10;
        write_page(original.path(), name, width, 5, [10, 10, 10]);
        write_page(revised.path(), name, width, 5, [20, 20, 20]);
    }
    fs::write(revised.path().join("002.png"), b"this is not a valid image file").unwrap();

    let (sender, receiver) = EventChannel::new();
    let result = image_pipeline(
        original.path(),
        revised.path(),
        MatchPolicy::KeyPrefix { width: 3 },
    )
    .run_with_events(&sender)
    .unwrap();

    let widths: Vec<_> = result.pages.iter().map(|p| p.width()).collect();
    assert_eq!(widths, vec![20, 60]);
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].key.as_str(), "002");

    drop(sender);
    let failed = receiver
        .iter()
        .filter(|e| matches!(e, Event::Render(RenderEvent::PairFailed { .. })))
        .count();
    assert_eq!(failed, 1);
}

#[test]
fn every_pair_failing_is_no_usable_pairs() {
    let original = TempDir::new().unwrap();
    let revised = TempDir::new().unwrap();
    for name in ["001.png", "002.png"] {
        fs::write(original.path().join(name), b"garbage").unwrap();
        fs::write(revised.path().join(name), b"garbage").unwrap();
    }

    let result = image_pipeline(original.path(), revised.path(), MatchPolicy::Strict).run();

    assert!(matches!(
        result,
        Err(ComparisonError::NoUsablePairs { total: 2 })
    ));
}

#[test]
fn assembler_is_not_called_when_nothing_rendered() {
    let original = TempDir::new().unwrap();
    let revised = TempDir::new().unwrap();
    fs::write(original.path().join("001.png"), b"garbage").unwrap();
    fs::write(revised.path().join("001.png"), b"garbage").unwrap();
    let assembler = CountingAssembler::default();
    let output = revised.path().join("report.pdf");

    let result = image_pipeline(original.path(), revised.path(), MatchPolicy::Strict)
        .run()
        .and_then(|r| assemble_report(&r.pages, &assembler, &output, &null_sender()));

    assert!(matches!(result, Err(ComparisonError::NoUsablePairs { .. })));
    assert_eq!(assembler.calls.load(Ordering::SeqCst), 0);
    assert!(!output.exists());
}

#[test]
fn empty_directories_are_no_usable_pairs() {
    let original = TempDir::new().unwrap();
    let revised = TempDir::new().unwrap();

    let result = image_pipeline(original.path(), revised.path(), MatchPolicy::Strict).run();

    assert!(matches!(
        result,
        Err(ComparisonError::NoUsablePairs { total: 0 })
    ));
}

#[test]
fn many_pairs_keep_key_order() {
    let original = TempDir::new().unwrap();
    let revised = TempDir::new().unwrap();
    for i in 0..24u32 {
        let name = format!("{:03}_doc.png", i);
        write_page(original.path(), &name, i + 1, 3, [0, 0, 0]);
        write_page(revised.path(), &name, 1, 3, [0, 0, 0]);
    }

    let result = image_pipeline(
        original.path(),
        revised.path(),
        MatchPolicy::KeyPrefix { width: 3 },
    )
    .run()
    .unwrap();

    let widths: Vec<_> = result.pages.iter().map(|p| p.width()).collect();
    let expected: Vec<_> = (0..24u32).map(|i| i + 2).collect();
    assert_eq!(widths, expected);
}

#[test]
fn pdf_report_is_written() {
    let original = TempDir::new().unwrap();
    let revised = TempDir::new().unwrap();
    write_page(original.path(), "001.png", 30, 20, [255, 0, 0]);
    write_page(revised.path(), "001.png", 30, 20, [0, 255, 0]);
    let out = TempDir::new().unwrap();
    let output = out.path().join("reports/comparison.pdf");

    let result = image_pipeline(original.path(), revised.path(), MatchPolicy::Strict)
        .run()
        .unwrap();
    let summary = assemble_report(
        &result.pages,
        &PdfReport::new(result.dpi),
        &output,
        &null_sender(),
    )
    .unwrap();

    assert_eq!(summary.pages, 1);
    assert!(fs::read(&output).unwrap().starts_with(b"%PDF"));
}

#[test]
fn docx_report_is_written_through_run_and_write() {
    let original = TempDir::new().unwrap();
    let revised = TempDir::new().unwrap();
    for name in ["001.png", "002.png"] {
        write_page(original.path(), name, 30, 20, [255, 0, 0]);
        write_page(revised.path(), name, 30, 20, [0, 255, 0]);
    }
    let out = TempDir::new().unwrap();
    let output = out.path().join("comparison.docx");
    let assembler = ReportFormat::Docx.assembler(72.0);

    let run = image_pipeline(original.path(), revised.path(), MatchPolicy::Strict)
        .run_and_write(assembler.as_ref(), &output, &null_sender())
        .unwrap();

    assert_eq!(run.report.pages, 2);
    assert_eq!(run.result.total_pairs, 2);
    let bytes = fs::read(&output).unwrap();
    assert!(bytes.starts_with(b"PK"));
    assert_eq!(bytes.len() as u64, run.report.bytes_written);
}

#[test]
fn hidden_documents_are_compared_unless_excluded() {
    let original = TempDir::new().unwrap();
    let revised = TempDir::new().unwrap();
    write_page(original.path(), ".001.png", 4, 4, [9, 9, 9]);
    write_page(original.path(), "002.png", 4, 4, [9, 9, 9]);
    write_page(revised.path(), "001.png", 4, 4, [9, 9, 9]);
    write_page(revised.path(), "002.png", 4, 4, [9, 9, 9]);

    let result = image_pipeline(original.path(), revised.path(), MatchPolicy::Strict)
        .run()
        .unwrap();
    assert_eq!(result.pages.len(), 2);

    let excluded = Pipeline::builder()
        .original_dir(original.path())
        .revised_dir(revised.path())
        .policy(MatchPolicy::Strict)
        .filter(DocumentFilter::images())
        .include_hidden(false)
        .renderer(Box::new(RasterRenderer::new()))
        .build()
        .run();
    assert!(matches!(
        excluded,
        Err(ComparisonError::Match(MatchError::CountMismatch {
            original: 1,
            revised: 2
        }))
    ));
}

#[test]
fn png_report_is_written_in_order() {
    let original = TempDir::new().unwrap();
    let revised = TempDir::new().unwrap();
    write_page(original.path(), "001.png", 2, 2, [1, 1, 1]);
    write_page(original.path(), "002.png", 2, 2, [2, 2, 2]);
    write_page(revised.path(), "001.png", 2, 2, [0, 0, 0]);
    write_page(revised.path(), "002.png", 2, 2, [0, 0, 0]);
    let out = assert_fs::TempDir::new().unwrap();

    let result = image_pipeline(original.path(), revised.path(), MatchPolicy::Strict)
        .run()
        .unwrap();
    assemble_report(
        &result.pages,
        &PngSequenceReport::new(),
        &out.path().join("pages"),
        &null_sender(),
    )
    .unwrap();

    let pages = out.child("pages");
    pages.child("page_001.png").assert(predicate::path::is_file());
    pages.child("page_002.png").assert(predicate::path::is_file());
    pages.child("page_003.png").assert(predicate::path::missing());

    let second = image::open(pages.child("page_002.png").path()).unwrap().to_rgb8();
    assert_eq!(second.get_pixel(0, 0).0, [2, 2, 2]);
}
