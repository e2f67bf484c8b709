//! # Error Module
//!
//! Error types for the pair comparison engine.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, pair keys, what went wrong
//! - **Fatal vs. isolated** - matching and assembly errors stop the run,
//!   render errors only cost the pair they happened in

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum ComparisonError {
    #[error("Matching error: {0}")]
    Match(#[from] MatchError),

    #[error("Rendering error: {0}")]
    Render(#[from] RenderError),

    #[error("Composition error: {0}")]
    Compose(#[from] ComposeError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("No usable pairs: all {total} pair(s) failed or none were matched")]
    NoUsablePairs { total: usize },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors that occur while discovering and pairing documents
#[derive(Error, Debug)]
pub enum MatchError {
    /// The directory is missing, is not a directory, or cannot be listed
    #[error("Directory not found or unreadable: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Listing started but an entry could not be read
    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Document counts differ (original: {original}, revised: {revised}). \
         Strict pairing needs the same number of files on both sides."
    )]
    CountMismatch { original: usize, revised: usize },

    #[error("Invalid key width: {width} (must be at least 1)")]
    InvalidKeyWidth { width: usize },
}

/// Errors that occur while rasterizing a document page
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to open document {path}: {reason}")]
    Open { path: PathBuf, reason: String },

    #[error("Document {path} has no page {page_index}")]
    PageMissing { path: PathBuf, page_index: usize },

    #[error("Renderer backend unavailable: {reason}")]
    Backend { reason: String },

    #[error("Failed to decode page of {path}: {reason}")]
    Decode { path: PathBuf, reason: String },
}

/// Errors that occur while composing two bitmaps
#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("Composed canvas would exceed the maximum size ({width} x {height})")]
    CanvasTooLarge { width: u64, height: u64 },
}

/// Errors that occur while writing the report artifact
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write report to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode report page: {reason}")]
    Encode { reason: String },

    #[error("Output already exists and is not empty: {path}")]
    OutputExists { path: PathBuf },

    #[error("No pages to write")]
    Empty,
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, ComparisonError>;
