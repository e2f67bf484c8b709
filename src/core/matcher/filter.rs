//! File filtering logic for the matcher.

use std::collections::HashSet;
use std::path::Path;

/// Decides which directory entries take part in pairing
#[derive(Debug, Clone)]
pub struct DocumentFilter {
    /// Lowercase file extensions to include
    extensions: HashSet<String>,
    /// Whether to include hidden files (starting with .)
    include_hidden: bool,
}

impl DocumentFilter {
    /// Create a filter that accepts PDF documents
    pub fn new() -> Self {
        Self::with_extension_list(&["pdf"])
    }

    /// Create a filter that accepts common raster image formats
    pub fn images() -> Self {
        Self::with_extension_list(&["png", "jpg", "jpeg", "bmp", "tif", "tiff", "webp"])
    }

    fn with_extension_list(extensions: &[&str]) -> Self {
        Self {
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
            include_hidden: true,
        }
    }

    /// Include or skip hidden files (starting with .); included by default
    pub fn with_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Override the list of extensions to accept
    ///
    /// Matching is case-insensitive; a leading dot is ignored.
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    /// Check if a file should be included
    pub fn should_include(&self, path: &Path) -> bool {
        if !self.include_hidden {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.starts_with('.') {
                    return false;
                }
            }
        }

        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => self.extensions.contains(&ext.to_lowercase()),
            None => false,
        }
    }
}

impl Default for DocumentFilter {
    fn default() -> Self {
        Self::new()
    }
}
