//! # Pipeline Module
//!
//! Orchestrates the full comparison workflow.
//!
//! ## Pipeline Stages
//! 1. **Match** - Pair original and revised documents
//! 2. **Render** - Rasterize the first page of both documents of every pair
//! 3. **Compose** - Put the two pages side by side
//! 4. **Assemble** - Write the composed pages as one report
//!
//! ## Parallelism
//! Stages 2 and 3 run per pair on a bounded rayon pool. Results land in
//! index-addressed slots, so report order is pair order no matter which
//! worker finishes first.

mod executor;

pub use executor::{
    assemble_report, process_pairs, ComparisonRun, PairFailure, Pipeline, PipelineBuilder, PipelineConfig,
    PipelineResult, ProcessOutcome, FIRST_PAGE,
};
