//! The session value: cursor, counters and skipped photos.

use serde::{Deserialize, Serialize};

/// Where a sorting session stands.
///
/// Persisted as `state.json`:
///
/// ```json
/// {
///   "last_index": 12,
///   "sorted_count": 9,
///   "skipped_count": 1,
///   "deleted_count": 1,
///   "duplicate_count": 1,
///   "skipped_files": ["blurry.jpg"]
/// }
/// ```
///
/// The value only moves forward. Every update consumes the state and
/// returns the next one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(rename = "last_index", default)]
    cursor: usize,
    #[serde(default)]
    sorted_count: usize,
    #[serde(default)]
    skipped_count: usize,
    #[serde(default)]
    deleted_count: usize,
    #[serde(default)]
    duplicate_count: usize,
    #[serde(rename = "skipped_files", default)]
    skipped_paths: Vec<String>,
}

impl SessionState {
    /// Zeroed state for a fresh session
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the next candidate to process
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn sorted_count(&self) -> usize {
        self.sorted_count
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped_count
    }

    pub fn deleted_count(&self) -> usize {
        self.deleted_count
    }

    pub fn duplicate_count(&self) -> usize {
        self.duplicate_count
    }

    /// Skipped photos, in the order they were first skipped
    pub fn skipped_paths(&self) -> &[String] {
        &self.skipped_paths
    }

    /// Move past the current candidate
    #[must_use]
    pub fn advance(mut self) -> Self {
        self.cursor += 1;
        self
    }

    #[must_use]
    pub fn record_sorted(mut self) -> Self {
        self.sorted_count += 1;
        self
    }

    /// Count a skip and remember the photo (once)
    #[must_use]
    pub fn record_skipped(mut self, path: impl Into<String>) -> Self {
        self.skipped_count += 1;
        let path = path.into();
        if !self.skipped_paths.contains(&path) {
            self.skipped_paths.push(path);
        }
        self
    }

    #[must_use]
    pub fn record_deleted(mut self) -> Self {
        self.deleted_count += 1;
        self
    }

    #[must_use]
    pub fn record_duplicate(mut self) -> Self {
        self.duplicate_count += 1;
        self
    }

    /// Keep the cursor within a candidate list of `len` entries
    #[must_use]
    pub fn clamped_to(mut self, len: usize) -> Self {
        self.cursor = self.cursor.min(len);
        self
    }
}
