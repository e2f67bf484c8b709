//! # Core Module
//!
//! The UI-agnostic comparison engine.
//!
//! ## Modules
//! - `matcher` - Discovers documents and pairs them
//! - `renderer` - Rasterizes one document page
//! - `composer` - Places two pages side by side
//! - `pipeline` - Orchestrates matching and parallel per-pair processing
//! - `report` - Writes the composed pages as one artifact

pub mod composer;
pub mod matcher;
pub mod pipeline;
pub mod renderer;
pub mod report;

// Re-export commonly used types
pub use composer::{compose, ComposedPage};
pub use matcher::{DocumentFilter, DocumentPair, MatchOutcome, MatchPolicy, MatchWarning, PairKey};
pub use pipeline::{PairFailure, Pipeline, PipelineResult};
pub use renderer::{PageRenderer, RasterBitmap};
pub use report::{ReportAssembler, ReportFormat, ReportSummary};
