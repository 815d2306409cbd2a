//! In-memory index backend for testing.

use super::{IndexBackend, PhotoRecord};
use crate::error::StoreError;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

/// In-memory index backend
///
/// Useful for testing. Counts writes so tests can check write-through,
/// and can be told to fail writes to exercise error paths.
#[derive(Default)]
pub struct InMemoryIndex {
    records: RwLock<Vec<PhotoRecord>>,
    persist_count: AtomicUsize,
    fail_writes: AtomicBool,
}

impl InMemoryIndex {
    /// Create an empty in-memory index
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an index that already holds `records`
    pub fn with_records(records: Vec<PhotoRecord>) -> Self {
        Self {
            records: RwLock::new(records),
            ..Self::default()
        }
    }

    /// Number of successful `persist` calls so far
    pub fn persist_count(&self) -> usize {
        self.persist_count.load(Ordering::SeqCst)
    }

    /// Make every later `persist` call fail
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Snapshot of what was last persisted
    pub fn stored(&self) -> Vec<PhotoRecord> {
        self.records.read().map(|r| r.clone()).unwrap_or_default()
    }

    fn poisoned() -> StoreError {
        StoreError::Io {
            path: "memory".into(),
            source: std::io::Error::other("index lock poisoned"),
        }
    }
}

impl IndexBackend for InMemoryIndex {
    fn load(&self) -> Result<Vec<PhotoRecord>, StoreError> {
        let records = self.records.read().map_err(|_| Self::poisoned())?;
        Ok(records.clone())
    }

    fn persist(&self, records: &[PhotoRecord]) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Io {
                path: "memory".into(),
                source: std::io::Error::other("simulated write failure"),
            });
        }

        let mut stored = self.records.write().map_err(|_| Self::poisoned())?;
        *stored = records.to_vec();
        self.persist_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
