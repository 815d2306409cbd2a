//! Directory walking implementation using walkdir.

use super::filter::{is_hidden, ImageFilter};
use super::{PhotoFile, PhotoScanner, ScanResult};
use crate::core::workspace::DEFAULT_DUPLICATES_FOLDER;
use crate::error::ScanError;
use crate::events::{Event, EventSender, ScanEvent};
use std::io::ErrorKind;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

/// Configuration for the directory scanner
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
    /// Whether to include hidden files and directories
    pub include_hidden: bool,
    /// Maximum directory depth (None = unlimited)
    pub max_depth: Option<usize>,
    /// Custom extensions to include (None = use defaults)
    pub extensions: Option<Vec<String>>,
    /// Top-level folders never scanned (the duplicates folder)
    pub excluded_folders: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            include_hidden: false,
            max_depth: None,
            extensions: None,
            excluded_folders: vec![DEFAULT_DUPLICATES_FOLDER.to_string()],
        }
    }
}

/// Scanner implementation using the walkdir crate
pub struct WalkDirScanner {
    config: ScanConfig,
    filter: ImageFilter,
}

impl WalkDirScanner {
    /// Create a new scanner with the given configuration
    pub fn new(config: ScanConfig) -> Self {
        let mut filter = ImageFilter::new().with_hidden(config.include_hidden);

        if let Some(ref extensions) = config.extensions {
            filter = filter.with_extensions(extensions.clone());
        }

        Self { config, filter }
    }

    /// Whether to descend into a directory entry
    fn keep_directory(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return true;
        }
        if !self.config.include_hidden && is_hidden(entry.path()) {
            return false;
        }
        if entry.depth() == 1 {
            let name = entry.file_name().to_string_lossy();
            if self.config.excluded_folders.iter().any(|f| *f == name) {
                return false;
            }
        }
        true
    }

    fn walk_error(error: walkdir::Error) -> ScanError {
        let path = error.path().map(|p| p.to_path_buf()).unwrap_or_default();

        if error.io_error().map(|e| e.kind()) == Some(ErrorKind::PermissionDenied) {
            ScanError::PermissionDenied { path }
        } else {
            ScanError::ReadDirectory {
                path,
                source: std::io::Error::other(error.to_string()),
            }
        }
    }
}

impl PhotoScanner for WalkDirScanner {
    fn scan(&self, root: &Path) -> Result<ScanResult, ScanError> {
        self.scan_with_events(root, &crate::events::null_sender())
    }

    fn scan_with_events(&self, root: &Path, events: &EventSender) -> Result<ScanResult, ScanError> {
        if !root.is_dir() {
            return Err(ScanError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }

        events.send(Event::Scan(ScanEvent::Started {
            root: root.to_path_buf(),
        }));

        let mut photos = Vec::new();
        let mut errors = Vec::new();

        let mut walker = WalkDir::new(root).follow_links(self.config.follow_symlinks);
        if let Some(depth) = self.config.max_depth {
            walker = walker.max_depth(depth);
        }

        for entry_result in walker.into_iter().filter_entry(|e| self.keep_directory(e)) {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(|p| p.to_path_buf()).unwrap_or_default();
                    let error = Self::walk_error(e);
                    tracing::warn!(error = %error, "Scan error");
                    events.send(Event::Scan(ScanEvent::Error {
                        path,
                        message: error.to_string(),
                    }));
                    errors.push(error);
                    continue;
                }
            };

            if !entry.path().is_file() {
                continue;
            }

            let path = entry.path();
            if !self.filter.should_include(path) {
                continue;
            }

            match entry.metadata() {
                Ok(metadata) => {
                    events.send(Event::Scan(ScanEvent::PhotoFound {
                        path: path.to_path_buf(),
                    }));
                    photos.push(PhotoFile {
                        path: path.to_path_buf(),
                        size: metadata.len(),
                    });
                }
                Err(e) => {
                    let error = Self::walk_error(e);
                    events.send(Event::Scan(ScanEvent::Error {
                        path: path.to_path_buf(),
                        message: error.to_string(),
                    }));
                    errors.push(error);
                }
            }
        }

        photos.sort_by(|a, b| a.path.cmp(&b.path));
        let result = ScanResult { photos, errors };

        tracing::info!(
            root = %root.display(),
            photos = result.photos.len(),
            bytes = result.total_bytes(),
            errors = result.errors.len(),
            "Scan complete"
        );
        events.send(Event::Scan(ScanEvent::Completed {
            total_photos: result.photos.len(),
        }));

        Ok(result)
    }
}
