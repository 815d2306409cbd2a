//! File filtering logic for the scanner.

use std::collections::HashSet;
use std::path::Path;

/// Extensions accepted by default (lowercase, no dot)
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "heic", "webp", "tiff", "tif", "gif", "bmp", "raw", "cr2", "nef",
    "arw", "dng",
];

/// Filters files to determine if they are supported images
#[derive(Debug, Clone)]
pub struct ImageFilter {
    /// File extensions to include
    extensions: HashSet<String>,
    /// Whether to include hidden files
    include_hidden: bool,
}

impl ImageFilter {
    /// Create a new filter with default supported extensions
    pub fn new() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            include_hidden: false,
        }
    }

    /// Include hidden files (starting with .)
    pub fn with_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Override the list of extensions to accept
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions.into_iter().map(|e| e.to_lowercase()).collect();
        self
    }

    /// Check if a file should be included
    pub fn should_include(&self, path: &Path) -> bool {
        if !self.include_hidden && is_hidden(path) {
            return false;
        }

        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.contains(&ext.to_lowercase()))
    }
}

impl Default for ImageFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether the last path component starts with a dot
pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| name.starts_with('.'))
}
