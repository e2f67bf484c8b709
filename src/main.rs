//! # pair-compare CLI
//!
//! Command-line interface for the side-by-side document comparison.
//!
//! ## Usage
//! ```bash
//! pair-compare compare ./original_docs ./revised_docs -o report.pdf
//! pair-compare compare ./original ./revised --policy strict --dpi 200
//! pair-compare pairs ./original_docs ./revised_docs
//! ```

mod cli;

use std::process::ExitCode;

fn main() -> ExitCode {
    match cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", console::style("error:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
