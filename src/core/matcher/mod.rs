//! # Matcher Module
//!
//! Discovers documents in the original and revised directories and pairs them.
//!
//! ## Policies
//! - **Strict** - sort both sides by file name and zip them; the counts must agree
//! - **KeyPrefix** - pair files whose names share a fixed-width numeric prefix
//!
//! Both policies return pairs in a deterministic order that does not depend on
//! the order the filesystem lists entries in. That order becomes the page order
//! of the report.
//!
//! ## Example
//! ```rust,ignore
//! let matcher = PairMatcher::new(DocumentFilter::new());
//! let outcome = matcher.match_dirs(original, revised, &MatchPolicy::KeyPrefix { width: 3 })?;
//! for pair in &outcome.pairs {
//!     println!("{} -> {} / {}", pair.key, pair.original.display(), pair.revised.display());
//! }
//! ```

mod filter;
mod key;

pub use filter::DocumentFilter;
pub use key::{KeyExtractor, PairKey, ParsedKey};

use crate::error::MatchError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// One original document matched to one revised document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentPair {
    pub key: PairKey,
    pub original: PathBuf,
    pub revised: PathBuf,
}

/// How files on the two sides are paired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPolicy {
    /// Zip the sorted file lists position by position
    Strict,
    /// Pair by a leading numeric prefix of `width` digits
    KeyPrefix { width: usize },
}

impl Default for MatchPolicy {
    fn default() -> Self {
        MatchPolicy::KeyPrefix {
            width: KeyExtractor::DEFAULT_WIDTH,
        }
    }
}

/// Which input directory a file came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Original,
    Revised,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Original => write!(f, "original"),
            Side::Revised => write!(f, "revised"),
        }
    }
}

/// A non-fatal matching problem. The affected file is left out of the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchWarning {
    /// The file name does not start with a valid key
    InvalidKey { side: Side, file: PathBuf },
    /// The key exists on one side only
    UnmatchedKey {
        side: Side,
        key: PairKey,
        file: PathBuf,
    },
    /// Two files on the same side share a key; the later one (in name order) is kept
    DuplicateKey {
        side: Side,
        key: PairKey,
        kept: PathBuf,
        discarded: PathBuf,
    },
}

impl fmt::Display for MatchWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchWarning::InvalidKey { side, file } => write!(
                f,
                "skipping {} file without a key prefix: {}",
                side,
                file.display()
            ),
            MatchWarning::UnmatchedKey { side, key, file } => write!(
                f,
                "key {} only exists in the {} set: {}",
                key,
                side,
                file.display()
            ),
            MatchWarning::DuplicateKey {
                side,
                key,
                kept,
                discarded,
            } => write!(
                f,
                "duplicate key {} in the {} set: using {}, ignoring {}",
                key,
                side,
                kept.display(),
                discarded.display()
            ),
        }
    }
}

/// Pairs plus the warnings collected while building them
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub pairs: Vec<DocumentPair>,
    pub warnings: Vec<MatchWarning>,
}

/// Lists both directories and pairs their documents
#[derive(Debug, Clone, Default)]
pub struct PairMatcher {
    filter: DocumentFilter,
}

impl PairMatcher {
    pub fn new(filter: DocumentFilter) -> Self {
        Self { filter }
    }

    /// List, filter and pair the documents of two directories
    pub fn match_dirs(
        &self,
        original_dir: &Path,
        revised_dir: &Path,
        policy: &MatchPolicy,
    ) -> Result<MatchOutcome, MatchError> {
        let original = self.list_documents(original_dir)?;
        let revised = self.list_documents(revised_dir)?;

        debug!(
            original = original.len(),
            revised = revised.len(),
            ?policy,
            "Listed documents"
        );

        let outcome = pair_documents(original, revised, policy)?;
        for warning in &outcome.warnings {
            warn!("{}", warning);
        }
        Ok(outcome)
    }

    /// Supported files directly inside `dir`, sorted by file name
    ///
    /// A path that is missing, not a directory, or cannot be opened for
    /// listing is `DirectoryNotFound`.
    pub fn list_documents(&self, dir: &Path) -> Result<Vec<PathBuf>, MatchError> {
        if !dir.is_dir() || std::fs::read_dir(dir).is_err() {
            return Err(MatchError::DirectoryNotFound {
                path: dir.to_path_buf(),
            });
        }

        let mut documents = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| MatchError::ReadDirectory {
                path: dir.to_path_buf(),
                source: e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("directory walk failed")),
            })?;

            let path = entry.path();
            // is_file follows symlinks; broken links are skipped
            if path.is_file() && self.filter.should_include(path) {
                documents.push(path.to_path_buf());
            }
        }

        documents.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(documents)
    }
}

/// Pair two already-sorted document lists under `policy`
///
/// Pure with respect to the filesystem, so both policies can be tested
/// without touching disk.
pub fn pair_documents(
    original: Vec<PathBuf>,
    revised: Vec<PathBuf>,
    policy: &MatchPolicy,
) -> Result<MatchOutcome, MatchError> {
    match policy {
        MatchPolicy::Strict => pair_positionally(original, revised),
        MatchPolicy::KeyPrefix { width } => {
            let extractor = KeyExtractor::new(*width)?;
            Ok(pair_by_key(original, revised, &extractor))
        }
    }
}

fn pair_positionally(
    original: Vec<PathBuf>,
    revised: Vec<PathBuf>,
) -> Result<MatchOutcome, MatchError> {
    if original.len() != revised.len() {
        return Err(MatchError::CountMismatch {
            original: original.len(),
            revised: revised.len(),
        });
    }

    let pairs = original
        .into_iter()
        .zip(revised)
        .enumerate()
        .map(|(index, (original, revised))| DocumentPair {
            key: PairKey::positional(index),
            original,
            revised,
        })
        .collect();

    Ok(MatchOutcome {
        pairs,
        warnings: Vec::new(),
    })
}

fn pair_by_key(
    original: Vec<PathBuf>,
    revised: Vec<PathBuf>,
    extractor: &KeyExtractor,
) -> MatchOutcome {
    let mut warnings = Vec::new();
    let mut original_by_key = index_by_key(Side::Original, original, extractor, &mut warnings);
    let mut revised_by_key = index_by_key(Side::Revised, revised, extractor, &mut warnings);

    let keys: BTreeSet<PairKey> = original_by_key
        .keys()
        .chain(revised_by_key.keys())
        .cloned()
        .collect();

    let mut pairs = Vec::new();
    for key in keys {
        match (original_by_key.remove(&key), revised_by_key.remove(&key)) {
            (Some(original), Some(revised)) => pairs.push(DocumentPair {
                key,
                original,
                revised,
            }),
            (Some(file), None) => warnings.push(MatchWarning::UnmatchedKey {
                side: Side::Original,
                key,
                file,
            }),
            (None, Some(file)) => warnings.push(MatchWarning::UnmatchedKey {
                side: Side::Revised,
                key,
                file,
            }),
            (None, None) => {}
        }
    }

    MatchOutcome { pairs, warnings }
}

fn index_by_key(
    side: Side,
    files: Vec<PathBuf>,
    extractor: &KeyExtractor,
    warnings: &mut Vec<MatchWarning>,
) -> BTreeMap<PairKey, PathBuf> {
    let mut by_key = BTreeMap::new();

    for file in files {
        let parsed = file
            .file_name()
            .and_then(|n| n.to_str())
            .map(|name| extractor.parse(name))
            .unwrap_or(ParsedKey::Invalid);

        let key = match parsed {
            ParsedKey::Valid(key) => key,
            ParsedKey::Invalid => {
                warnings.push(MatchWarning::InvalidKey { side, file });
                continue;
            }
        };

        if let Some(discarded) = by_key.insert(key.clone(), file.clone()) {
            warnings.push(MatchWarning::DuplicateKey {
                side,
                key,
                kept: file,
                discarded,
            });
        }
    }

    by_key
}
