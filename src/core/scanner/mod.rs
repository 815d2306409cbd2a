//! # Scanner Module
//!
//! Produces the ordered candidate list for a sorting root.
//!
//! ## Supported Formats
//! - JPEG (.jpg, .jpeg)
//! - PNG (.png)
//! - WebP (.webp)
//! - HEIC (.heic) - iPhone photos
//! - GIF (.gif)
//! - BMP (.bmp)
//! - TIFF (.tiff, .tif)
//! - Camera raw (.raw, .cr2, .nef, .arw, .dng)
//!
//! Hidden files and hidden directories are never scanned, which keeps the
//! `.photosorter` state directory and the `.trash` staging area out of the
//! list. Results are sorted by path so a rescan yields the same order.
//!
//! ## Example
//! ```rust,ignore
//! use photo_sorter::core::scanner::{PhotoScanner, ScanConfig, WalkDirScanner};
//!
//! let scanner = WalkDirScanner::new(ScanConfig::default());
//! let result = scanner.scan(Path::new("/Users/me/Photos/2024"))?;
//! ```

mod filter;
mod walker;

pub use filter::ImageFilter;
pub use walker::{ScanConfig, WalkDirScanner};

use crate::error::ScanError;
use crate::events::EventSender;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Represents a discovered photo file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoFile {
    /// Path to the photo file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

/// Result of a scan operation
#[derive(Debug)]
pub struct ScanResult {
    /// Discovered photos, sorted by path
    pub photos: Vec<PhotoFile>,
    /// Errors that occurred during scanning (non-fatal)
    pub errors: Vec<ScanError>,
}

impl ScanResult {
    /// Just the paths, in scan order
    pub fn paths(&self) -> Vec<PathBuf> {
        self.photos.iter().map(|p| p.path.clone()).collect()
    }

    /// Combined size of the discovered photos
    pub fn total_bytes(&self) -> u64 {
        self.photos.iter().map(|p| p.size).sum()
    }
}

/// Trait for photo scanners
///
/// Implement this trait to create custom scanners (e.g., for testing).
pub trait PhotoScanner: Send + Sync {
    /// Scan a sorting root and return discovered photos.
    ///
    /// A missing or non-directory root is an error; unreadable entries
    /// below it are collected in [`ScanResult::errors`].
    fn scan(&self, root: &Path) -> Result<ScanResult, ScanError>;

    /// Scan with progress reporting via events
    fn scan_with_events(&self, root: &Path, events: &EventSender)
        -> Result<ScanResult, ScanError>;
}
