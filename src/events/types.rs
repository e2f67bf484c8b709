//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the comparison pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Matching phase events
    Match(MatchEvent),
    /// Render-and-compose phase events
    Render(RenderEvent),
    /// Report assembly events
    Report(ReportEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events during the matching phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MatchEvent {
    /// Matching has started
    Started {
        original_dir: PathBuf,
        revised_dir: PathBuf,
    },
    /// A non-fatal problem was found; the affected file is left out
    Warning { message: String },
    /// Matching completed
    Completed { total_pairs: usize },
}

/// Events during the render-and-compose phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RenderEvent {
    /// Processing has started
    Started { total_pairs: usize },
    /// A pair finished (successfully or not)
    Progress(RenderProgress),
    /// A pair failed; its page is omitted from the report
    PairFailed {
        index: usize,
        key: String,
        message: String,
    },
    /// All pairs have been processed
    Completed { composed: usize, failed: usize },
}

/// Progress information during rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderProgress {
    /// Number of pairs finished so far
    pub completed: usize,
    /// Total number of pairs
    pub total: usize,
    /// Key of the pair that just finished
    pub key: String,
}

/// Events during report assembly
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReportEvent {
    /// Writing has started
    Started { pages: usize, output: PathBuf },
    /// The report was written
    Completed { output: PathBuf, bytes_written: u64 },
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started
    Started,
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// Pipeline completed successfully
    Completed { summary: PipelineSummary },
    /// Pipeline encountered a fatal error
    Error { message: String },
}

/// Phases of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Matching,
    Rendering,
    Assembling,
}

/// Summary of pipeline results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Pairs produced by the matcher
    pub total_pairs: usize,
    /// Pages that made it into the result
    pub composed_pages: usize,
    /// Pairs that failed to render or compose
    pub failed_pairs: usize,
    /// Non-fatal matching warnings
    pub warnings: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Matching => write!(f, "Matching"),
            PipelinePhase::Rendering => write!(f, "Rendering"),
            PipelinePhase::Assembling => write!(f, "Assembling"),
        }
    }
}
