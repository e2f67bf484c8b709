//! Pipeline execution implementation.

use crate::core::composer::{compose, ComposedPage};
use crate::core::matcher::{
    DocumentFilter, DocumentPair, MatchOutcome, MatchPolicy, MatchWarning, PairKey, PairMatcher,
};
use crate::core::renderer::{PageRenderer, PdfiumRenderer, DEFAULT_DPI};
use crate::core::report::{ReportAssembler, ReportSummary};
use crate::error::{ComparisonError, RenderError};
use crate::events::{
    null_sender, Event, EventSender, MatchEvent, PipelineEvent, PipelinePhase, PipelineSummary,
    RenderEvent, RenderProgress, ReportEvent,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Only the first page of every document is compared
pub const FIRST_PAGE: usize = 0;

/// A pair whose page could not be produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairFailure {
    /// Position of the pair in the matched list
    pub index: usize,
    pub key: PairKey,
    pub original: PathBuf,
    pub revised: PathBuf,
    pub message: String,
}

/// Output of the render-and-compose stage
#[derive(Debug, Default)]
pub struct ProcessOutcome {
    /// Composed pages in pair order, failed pairs left out
    pub pages: Vec<ComposedPage>,
    /// Failed pairs in pair order
    pub failures: Vec<PairFailure>,
}

/// Result of pipeline execution
#[derive(Debug)]
pub struct PipelineResult {
    /// Composed pages in report order
    pub pages: Vec<ComposedPage>,
    /// Pairs produced by the matcher
    pub total_pairs: usize,
    /// Pairs that were dropped (non-fatal)
    pub failures: Vec<PairFailure>,
    /// Matching warnings (non-fatal)
    pub warnings: Vec<MatchWarning>,
    /// Resolution every page was rendered at
    pub dpi: f32,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl PipelineResult {
    pub fn summary(&self) -> PipelineSummary {
        PipelineSummary {
            total_pairs: self.total_pairs,
            composed_pages: self.pages.len(),
            failed_pairs: self.failures.len(),
            warnings: self.warnings.len(),
            duration_ms: self.duration_ms,
        }
    }
}

/// Configuration for the pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory with the original documents (left side)
    pub original_dir: PathBuf,
    /// Directory with the revised documents (right side)
    pub revised_dir: PathBuf,
    /// How documents are paired
    pub policy: MatchPolicy,
    /// Render resolution, applied to every page
    pub dpi: f32,
    /// Worker count (None = one per CPU)
    pub threads: Option<usize>,
    /// Which files take part
    pub filter: DocumentFilter,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            original_dir: PathBuf::new(),
            revised_dir: PathBuf::new(),
            policy: MatchPolicy::default(),
            dpi: DEFAULT_DPI,
            threads: None,
            filter: DocumentFilter::default(),
        }
    }
}

impl PipelineConfig {
    fn validate(&self) -> Result<(), ComparisonError> {
        if !self.dpi.is_finite() || self.dpi <= 0.0 {
            return Err(ComparisonError::Config(format!(
                "DPI must be a positive number, got {}",
                self.dpi
            )));
        }
        if self.threads == Some(0) {
            return Err(ComparisonError::Config(
                "thread count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for pipeline configuration
pub struct PipelineBuilder {
    config: PipelineConfig,
    renderer: Option<Box<dyn PageRenderer>>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            renderer: None,
        }
    }

    /// Set the original (left side) directory
    pub fn original_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.original_dir = dir.into();
        self
    }

    /// Set the revised (right side) directory
    pub fn revised_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.revised_dir = dir.into();
        self
    }

    /// Set the matching policy
    pub fn policy(mut self, policy: MatchPolicy) -> Self {
        self.config.policy = policy;
        self
    }

    /// Set the render resolution
    pub fn dpi(mut self, dpi: f32) -> Self {
        self.config.dpi = dpi;
        self
    }

    /// Limit the number of render workers
    pub fn threads(mut self, threads: usize) -> Self {
        self.config.threads = Some(threads);
        self
    }

    /// Set the document filter
    pub fn filter(mut self, filter: DocumentFilter) -> Self {
        self.config.filter = filter;
        self
    }

    /// Include or skip hidden files (included unless turned off)
    pub fn include_hidden(mut self, include: bool) -> Self {
        self.config.filter = self.config.filter.with_hidden(include);
        self
    }

    /// Set the page renderer
    pub fn renderer(mut self, renderer: Box<dyn PageRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Pipeline {
        Pipeline {
            config: self.config,
            renderer: self
                .renderer
                .unwrap_or_else(|| Box::new(PdfiumRenderer::new())),
        }
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A finished run: composed pages plus the report written from them
#[derive(Debug)]
pub struct ComparisonRun {
    /// Pipeline output; `duration_ms` covers the report write too
    pub result: PipelineResult,
    pub report: ReportSummary,
}

/// The comparison pipeline: match, then render and compose every pair
pub struct Pipeline {
    config: PipelineConfig,
    renderer: Box<dyn PageRenderer>,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Pair the documents without rendering anything
    pub fn match_only(&self) -> Result<MatchOutcome, ComparisonError> {
        let matcher = PairMatcher::new(self.config.filter.clone());
        Ok(matcher.match_dirs(
            &self.config.original_dir,
            &self.config.revised_dir,
            &self.config.policy,
        )?)
    }

    /// Run the pipeline without events
    pub fn run(&self) -> Result<PipelineResult, ComparisonError> {
        self.run_with_events(&null_sender())
    }

    /// Run the pipeline with event reporting
    pub fn run_with_events(
        &self,
        events: &EventSender,
    ) -> Result<PipelineResult, ComparisonError> {
        let result = self.execute(events);
        if let Err(ref e) = result {
            events.send(Event::Pipeline(PipelineEvent::Error {
                message: e.to_string(),
            }));
        }
        result
    }

    /// Run the pipeline and write the report
    ///
    /// The assembler is never called when no pair produced a page.
    pub fn run_and_write(
        &self,
        assembler: &dyn ReportAssembler,
        output: &Path,
        events: &EventSender,
    ) -> Result<ComparisonRun, ComparisonError> {
        let start_time = Instant::now();
        let mut result = self.run_with_events(events)?;

        let report = assemble_report(&result.pages, assembler, output, events).inspect_err(|e| {
            events.send(Event::Pipeline(PipelineEvent::Error {
                message: e.to_string(),
            }));
        })?;

        result.duration_ms = start_time.elapsed().as_millis() as u64;
        Ok(ComparisonRun { result, report })
    }

    fn execute(&self, events: &EventSender) -> Result<PipelineResult, ComparisonError> {
        let start_time = Instant::now();
        self.config.validate()?;

        events.send(Event::Pipeline(PipelineEvent::Started));

        // Phase 1: Matching. Any error here stops the run before work is dispatched.
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Matching,
        }));
        events.send(Event::Match(MatchEvent::Started {
            original_dir: self.config.original_dir.clone(),
            revised_dir: self.config.revised_dir.clone(),
        }));

        let MatchOutcome { pairs, warnings } = self.match_only()?;

        for warning in &warnings {
            events.send(Event::Match(MatchEvent::Warning {
                message: warning.to_string(),
            }));
        }
        events.send(Event::Match(MatchEvent::Completed {
            total_pairs: pairs.len(),
        }));
        info!(
            pairs = pairs.len(),
            files = pairs.len() * 2,
            warnings = warnings.len(),
            "Matched documents"
        );

        // Phase 2: Render and compose
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Rendering,
        }));

        let pool = build_pool(self.config.threads)?;
        let outcome = pool.install(|| {
            process_pairs(&pairs, self.renderer.as_ref(), self.config.dpi, events)
        });

        if outcome.pages.is_empty() {
            return Err(ComparisonError::NoUsablePairs { total: pairs.len() });
        }

        let result = PipelineResult {
            pages: outcome.pages,
            total_pairs: pairs.len(),
            failures: outcome.failures,
            warnings,
            dpi: self.config.dpi,
            duration_ms: start_time.elapsed().as_millis() as u64,
        };

        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: result.summary(),
        }));

        Ok(result)
    }
}

fn build_pool(threads: Option<usize>) -> Result<rayon::ThreadPool, ComparisonError> {
    let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("render-{i}"));
    if let Some(threads) = threads {
        builder = builder.num_threads(threads);
    }
    builder
        .build()
        .map_err(|e| ComparisonError::Config(format!("failed to start worker pool: {e}")))
}

/// Index-addressed holders for composed pages, one per pair
///
/// Workers receive disjoint `&mut` slots, so no locking is involved. A slot
/// stays `None` when its pair fails.
struct ResultSlots {
    slots: Vec<Option<ComposedPage>>,
}

impl ResultSlots {
    fn with_len(len: usize) -> Self {
        Self {
            slots: std::iter::repeat_with(|| None).take(len).collect(),
        }
    }

    /// Drop the empty slots, keeping pair order
    fn compact(self) -> Vec<ComposedPage> {
        self.slots.into_iter().flatten().collect()
    }
}

/// Render and compose every pair on the current rayon pool
///
/// Each pair is an independent unit of work. Completion order does not matter:
/// page `i` of the output is always the `i`-th successful pair. A failing pair
/// is logged, reported as an event, and left out; it never affects its siblings.
pub fn process_pairs(
    pairs: &[DocumentPair],
    renderer: &dyn PageRenderer,
    dpi: f32,
    events: &EventSender,
) -> ProcessOutcome {
    let total = pairs.len();
    let completed = AtomicUsize::new(0);
    let mut slots = ResultSlots::with_len(total);

    events.send(Event::Render(RenderEvent::Started { total_pairs: total }));

    let failures: Vec<PairFailure> = slots
        .slots
        .par_iter_mut()
        .zip(pairs.par_iter())
        .enumerate()
        .filter_map(|(index, (slot, pair))| {
            let result = panic::catch_unwind(AssertUnwindSafe(|| render_pair(pair, renderer, dpi)))
                .unwrap_or_else(|_| {
                    Err(RenderError::Backend {
                        reason: "renderer panicked".to_string(),
                    }
                    .into())
                });

            let current = completed.fetch_add(1, Ordering::SeqCst) + 1;
            events.send(Event::Render(RenderEvent::Progress(RenderProgress {
                completed: current,
                total,
                key: pair.key.to_string(),
            })));

            match result {
                Ok(page) => {
                    debug!(index, key = %pair.key, width = page.width(), height = page.height(), "Composed pair");
                    *slot = Some(page);
                    None
                }
                Err(e) => {
                    warn!(index, key = %pair.key, error = %e, "Pair failed, leaving it out of the report");
                    events.send(Event::Render(RenderEvent::PairFailed {
                        index,
                        key: pair.key.to_string(),
                        message: e.to_string(),
                    }));
                    Some(PairFailure {
                        index,
                        key: pair.key.clone(),
                        original: pair.original.clone(),
                        revised: pair.revised.clone(),
                        message: e.to_string(),
                    })
                }
            }
        })
        .collect();

    let pages = slots.compact();

    events.send(Event::Render(RenderEvent::Completed {
        composed: pages.len(),
        failed: failures.len(),
    }));

    ProcessOutcome { pages, failures }
}

fn render_pair(
    pair: &DocumentPair,
    renderer: &dyn PageRenderer,
    dpi: f32,
) -> Result<ComposedPage, ComparisonError> {
    let left = renderer.render(&pair.original, FIRST_PAGE, dpi)?;
    let right = renderer.render(&pair.revised, FIRST_PAGE, dpi)?;
    Ok(compose(left, right)?)
}

/// Hand the composed pages to a report writer
pub fn assemble_report(
    pages: &[ComposedPage],
    assembler: &dyn ReportAssembler,
    output: &Path,
    events: &EventSender,
) -> Result<ReportSummary, ComparisonError> {
    events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
        phase: PipelinePhase::Assembling,
    }));
    events.send(Event::Report(ReportEvent::Started {
        pages: pages.len(),
        output: output.to_path_buf(),
    }));

    let summary = assembler.write(pages, output)?;

    info!(
        output = %summary.output.display(),
        pages = summary.pages,
        bytes = summary.bytes_written,
        "Report written"
    );
    events.send(Event::Report(ReportEvent::Completed {
        output: summary.output.clone(),
        bytes_written: summary.bytes_written,
    }));

    Ok(summary)
}
