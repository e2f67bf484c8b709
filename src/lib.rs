//! # PDF Pair Compare
//!
//! Pairs documents from an "original" and a "revised" directory and renders the
//! first page of each pair side by side, one pair per report page.
//!
//! ## Core Philosophy
//! - **Deterministic order** - report pages follow pair order, never completion order
//! - **Isolated failures** - a document that will not render costs one page, not the run
//! - **Juxtaposition only** - pages are shown next to each other, not diffed
//!
//! ## Architecture
//! - `core` - Matching, rendering, composition, orchestration and report writing
//! - `events` - Event-driven progress reporting
//! - `error` - Error taxonomy
//! - `cli` - Command-line interface (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{ComparisonError, Result};

/// Initialize tracing for the library
///
/// `RUST_LOG` wins when set; otherwise `default_directive` (e.g. `"warn"`) applies.
/// Output goes to stderr so it never mixes with JSON on stdout.
/// Calling this twice is harmless.
pub fn init_tracing(default_directive: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
