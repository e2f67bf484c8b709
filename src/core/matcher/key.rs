//! Pair key extraction.
//!
//! A file takes part in key pairing only when its name starts with a
//! fixed-width run of ASCII digits. The prefix becomes its [`PairKey`].

use crate::error::MatchError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Token that decides which files belong together
///
/// Keys compare as strings. Keys from one extractor all have the same
/// width, so string order equals numeric order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PairKey(String);

impl PairKey {
    /// Key for the pair at `index` under positional pairing (1-based, padded)
    pub fn positional(index: usize) -> Self {
        PairKey(format!("#{:03}", index + 1))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of parsing one file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedKey {
    Valid(PairKey),
    Invalid,
}

/// Extracts a fixed-width numeric prefix from file names
#[derive(Debug, Clone)]
pub struct KeyExtractor {
    pattern: Regex,
    width: usize,
}

impl KeyExtractor {
    /// Default prefix width
    pub const DEFAULT_WIDTH: usize = 3;

    pub fn new(width: usize) -> Result<Self, MatchError> {
        if width == 0 {
            return Err(MatchError::InvalidKeyWidth { width });
        }
        let pattern = Regex::new(&format!(r"^([0-9]{{{width}}})"))
            .map_err(|_| MatchError::InvalidKeyWidth { width })?;
        Ok(Self { pattern, width })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Parse the key out of a bare file name (no directory part)
    pub fn parse(&self, file_name: &str) -> ParsedKey {
        match self.pattern.captures(file_name).and_then(|c| c.get(1)) {
            Some(prefix) => ParsedKey::Valid(PairKey(prefix.as_str().to_string())),
            None => ParsedKey::Invalid,
        }
    }
}
