//! # CLI Module
//!
//! Command-line interface for the side-by-side comparison.
//!
//! ## Usage
//! ```bash
//! # Pair by 3-digit prefix and write a PDF report
//! pair-compare compare ./original_docs ./revised_docs -o output/report.pdf
//!
//! # Pair by sorted position instead
//! pair-compare compare ./original ./revised --policy strict
//!
//! # Numbered PNG pages, rendered at 200 DPI with 4 workers
//! pair-compare compare ./original ./revised --format png --dpi 200 --threads 4
//!
//! # Word document, ignoring dot-files
//! pair-compare compare ./original ./revised --format docx --exclude-hidden
//!
//! # Only show which files would be paired
//! pair-compare pairs ./original_docs ./revised_docs
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use pdf_pair_compare::core::matcher::{DocumentFilter, MatchOutcome, MatchPolicy};
use pdf_pair_compare::core::pipeline::{ComparisonRun, Pipeline, PipelineResult};
use pdf_pair_compare::core::renderer::{PageRenderer, PdfiumRenderer, RasterRenderer, DEFAULT_DPI};
use pdf_pair_compare::core::report::{ReportFormat, ReportSummary};
use pdf_pair_compare::error::Result;
use pdf_pair_compare::events::{Event, EventChannel, PipelineEvent, RenderEvent};
use std::path::PathBuf;
use std::thread;

/// PDF Pair Compare - original and revised first pages, side by side
#[derive(Parser, Debug)]
#[command(name = "pair-compare")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render every pair side by side and write the report
    Compare {
        /// Directory with the original documents (left side)
        original: PathBuf,

        /// Directory with the revised documents (right side)
        revised: PathBuf,

        /// Report path (a directory for --format png)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        matching: MatchArgs,

        /// Render resolution
        #[arg(long, default_value_t = DEFAULT_DPI)]
        dpi: f32,

        /// Report format
        #[arg(short, long, default_value = "pdf")]
        format: Format,

        /// Number of render workers (default: one per CPU)
        #[arg(long)]
        threads: Option<usize>,

        /// Directory containing the pdfium library (default: system search path)
        #[arg(long)]
        pdfium_dir: Option<PathBuf>,

        /// Output format
        #[arg(long, default_value = "pretty")]
        output_format: OutputFormat,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// List the pairs that would be compared, without rendering
    Pairs {
        /// Directory with the original documents
        original: PathBuf,

        /// Directory with the revised documents
        revised: PathBuf,

        #[command(flatten)]
        matching: MatchArgs,

        /// Output format
        #[arg(long, default_value = "pretty")]
        output_format: OutputFormat,
    },
}

#[derive(Args, Debug)]
struct MatchArgs {
    /// How documents are paired
    #[arg(short, long, default_value = "key")]
    policy: Policy,

    /// Number of leading digits forming the key (key policy)
    #[arg(long, default_value_t = 3)]
    key_width: usize,

    /// Kind of input documents
    #[arg(long, default_value = "pdf")]
    input: InputKind,

    /// Skip hidden files (names starting with .)
    #[arg(long)]
    exclude_hidden: bool,
}

impl MatchArgs {
    fn policy(&self) -> MatchPolicy {
        match self.policy {
            Policy::Strict => MatchPolicy::Strict,
            Policy::Key => MatchPolicy::KeyPrefix {
                width: self.key_width,
            },
        }
    }

    fn filter(&self) -> DocumentFilter {
        match self.input {
            InputKind::Pdf => DocumentFilter::new(),
            InputKind::Image => DocumentFilter::images(),
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Policy {
    /// Sort both sides by name and pair by position (counts must match)
    Strict,
    /// Pair files sharing a leading numeric prefix (default)
    Key,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum InputKind {
    /// PDF documents, rendered with pdfium
    Pdf,
    /// Raster images (PNG, JPEG, ...), treated as 72 DPI pages
    Image,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    /// One PDF page per pair
    Pdf,
    /// Landscape Word document, one image per page
    Docx,
    /// A directory of numbered PNG files
    Png,
}

impl From<Format> for ReportFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Pdf => ReportFormat::Pdf,
            Format::Docx => ReportFormat::Docx,
            Format::Png => ReportFormat::Png,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Compare {
            original,
            revised,
            output,
            matching,
            dpi,
            format,
            threads,
            pdfium_dir,
            output_format,
            verbose,
        } => {
            pdf_pair_compare::init_tracing(if verbose { "info" } else { "error" });

            let renderer: Box<dyn PageRenderer> = match matching.input {
                InputKind::Pdf => match pdfium_dir {
                    Some(dir) => Box::new(PdfiumRenderer::with_library_dir(dir)),
                    None => Box::new(PdfiumRenderer::new()),
                },
                InputKind::Image => Box::new(RasterRenderer::new()),
            };

            let mut builder = Pipeline::builder()
                .original_dir(original)
                .revised_dir(revised)
                .policy(matching.policy())
                .filter(matching.filter())
                .include_hidden(!matching.exclude_hidden)
                .dpi(dpi)
                .renderer(renderer);
            if let Some(threads) = threads {
                builder = builder.threads(threads);
            }

            let format = ReportFormat::from(format);
            let output = output.unwrap_or_else(|| format.default_output());

            run_compare(builder.build(), format, output, output_format, verbose)
        }
        Commands::Pairs {
            original,
            revised,
            matching,
            output_format,
        } => {
            pdf_pair_compare::init_tracing("error");

            let pipeline = Pipeline::builder()
                .original_dir(original)
                .revised_dir(revised)
                .policy(matching.policy())
                .filter(matching.filter())
                .include_hidden(!matching.exclude_hidden)
                .build();

            let outcome = pipeline.match_only()?;
            match output_format {
                OutputFormat::Pretty => print_pretty_pairs(&Term::stdout(), &outcome),
                OutputFormat::Json => print_json_pairs(&outcome),
            }
            Ok(())
        }
    }
}

fn run_compare(
    pipeline: Pipeline,
    format: ReportFormat,
    output: PathBuf,
    output_format: OutputFormat,
    verbose: bool,
) -> Result<()> {
    let term = Term::stderr();

    if matches!(output_format, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("PDF Pair Compare").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    let (sender, receiver) = EventChannel::new();

    let progress = if matches!(output_format, OutputFormat::Pretty) {
        let pb = ProgressBar::new(0);
        if let Ok(bar_style) =
            ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(bar_style.progress_chars("█▓░"));
        }
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            let Some(ref pb) = progress_clone else {
                continue;
            };
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    pb.set_message(format!("{}", phase));
                }
                Event::Render(RenderEvent::Started { total_pairs }) => {
                    pb.set_length(total_pairs as u64);
                }
                Event::Render(RenderEvent::Progress(p)) => {
                    pb.set_position(p.completed as u64);
                    if verbose {
                        pb.set_message(format!("Rendering {}", p.key));
                    }
                }
                Event::Render(RenderEvent::PairFailed { key, message, .. }) => {
                    pb.println(format!("  {} pair {}: {}", style("✗").red(), key, message));
                }
                Event::Report(_) | Event::Pipeline(PipelineEvent::Error { .. }) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    let assembler = format.assembler(pipeline.config().dpi);
    let outcome = pipeline.run_and_write(assembler.as_ref(), &output, &sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let ComparisonRun { result, report } = outcome?;

    match output_format {
        OutputFormat::Pretty => print_pretty_results(&term, &result, &report, format),
        OutputFormat::Json => print_json_results(&result, &report),
    }

    Ok(())
}

fn print_pretty_results(
    term: &Term,
    result: &PipelineResult,
    report: &ReportSummary,
    format: ReportFormat,
) {
    term.write_line(&format!(
        "{} Comparison Complete",
        style("✓").green().bold()
    ))
    .ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} pairs matched ({} files) in {:.1}s",
        style(result.total_pairs).cyan(),
        result.total_pairs * 2,
        result.duration_ms as f64 / 1000.0
    ))
    .ok();

    term.write_line(&format!(
        "  {} pages composed at {} DPI",
        style(result.pages.len()).cyan(),
        result.dpi
    ))
    .ok();

    if !result.failures.is_empty() {
        term.write_line(&format!(
            "  {} pairs failed and were left out",
            style(result.failures.len()).red()
        ))
        .ok();
    }

    if !result.warnings.is_empty() {
        term.write_line("").ok();
        term.write_line(&format!("{}", style("Matching warnings:").bold().underlined()))
            .ok();
        for warning in &result.warnings {
            term.write_line(&format!("  {} {}", style("!").yellow(), warning))
                .ok();
        }
    }

    if !result.failures.is_empty() {
        term.write_line("").ok();
        term.write_line(&format!("{}", style("Failed pairs:").bold().underlined()))
            .ok();
        for failure in &result.failures {
            term.write_line(&format!(
                "  {} #{} {} - {}",
                style("✗").red(),
                failure.index + 1,
                style(&failure.key).bold(),
                failure.message
            ))
            .ok();
        }
    }

    term.write_line("").ok();
    term.write_line(&format!(
        "  {} report written to {} ({})",
        format,
        style(report.output.display()).green(),
        format_bytes(report.bytes_written)
    ))
    .ok();
}

fn print_json_results(result: &PipelineResult, report: &ReportSummary) {
    let output = serde_json::json!({
        "summary": result.summary(),
        "dpi": result.dpi,
        "warnings": result.warnings.iter().map(|w| w.to_string()).collect::<Vec<_>>(),
        "failures": result.failures,
        "report": report,
    });

    println!("{:#}", output);
}

fn print_pretty_pairs(term: &Term, outcome: &MatchOutcome) {
    for pair in &outcome.pairs {
        term.write_line(&format!(
            "  {}  {}  {}  {}",
            style(&pair.key).bold(),
            pair.original.display(),
            style("↔").dim(),
            pair.revised.display()
        ))
        .ok();
    }

    for warning in &outcome.warnings {
        term.write_line(&format!("  {} {}", style("!").yellow(), warning))
            .ok();
    }

    term.write_line("").ok();
    term.write_line(&format!(
        "  {} pairs, {} warnings",
        style(outcome.pairs.len()).cyan(),
        style(outcome.warnings.len()).yellow()
    ))
    .ok();
}

fn print_json_pairs(outcome: &MatchOutcome) {
    let output = serde_json::json!({
        "pairs": outcome.pairs,
        "warnings": outcome.warnings.iter().map(|w| w.to_string()).collect::<Vec<_>>(),
    });

    println!("{:#}", output);
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
