//! # Store Module
//!
//! The hash index: every photo filed into an event folder, keyed by its
//! root-relative path, with its content digest and optional fingerprint.
//!
//! ## Behaviour
//! - Loaded fully into memory when opened
//! - Written through to the backend after every `put`
//! - Insertion order is kept; a re-added path keeps its original position
//!
//! ## Backends
//! - `JsonIndexFile` - `image_hashes.json` on disk
//! - `InMemoryIndex` - For testing

mod json;
mod memory;
mod traits;

pub use json::JsonIndexFile;
pub use memory::InMemoryIndex;
pub use traits::IndexBackend;

use crate::core::hasher::{ContentDigest, Fingerprint};
use crate::error::StoreError;
use std::collections::HashMap;
use std::path::Path;

/// One entry in the hash index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoRecord {
    /// Path relative to the sorting root, `/`-separated
    pub relative_path: String,
    pub digest: ContentDigest,
    pub fingerprint: Option<Fingerprint>,
}

/// Closest fingerprint match found by [`HashStore::lookup_similar`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimilarMatch {
    pub relative_path: String,
    pub distance: u32,
}

/// In-memory view of the hash index with write-through persistence.
pub struct HashStore {
    backend: Box<dyn IndexBackend>,
    records: Vec<PhotoRecord>,
    by_path: HashMap<String, usize>,
    by_digest: HashMap<ContentDigest, usize>,
}

impl HashStore {
    /// Load the index from `backend`.
    ///
    /// Fails if the backend holds data it cannot parse; an empty or
    /// missing index opens as an empty store.
    pub fn open(backend: Box<dyn IndexBackend>) -> Result<Self, StoreError> {
        let loaded = backend.load()?;

        let mut store = Self {
            backend,
            records: Vec::with_capacity(loaded.len()),
            by_path: HashMap::new(),
            by_digest: HashMap::new(),
        };
        for record in loaded {
            store.insert(record);
        }

        tracing::debug!(
            location = %store.backend.location(),
            entries = store.records.len(),
            "Hash index loaded"
        );
        Ok(store)
    }

    /// Open the JSON index file at `path`
    pub fn open_json(path: &Path) -> Result<Self, StoreError> {
        Self::open(Box::new(JsonIndexFile::new(path)))
    }

    /// Path of the first-inserted entry with this exact digest
    pub fn lookup_exact(&self, digest: &ContentDigest) -> Option<&str> {
        self.by_digest
            .get(digest)
            .map(|&i| self.records[i].relative_path.as_str())
    }

    /// Closest stored fingerprint within `threshold` bits.
    ///
    /// Entries without a fingerprint are ignored. When several entries share
    /// the minimum distance the earliest inserted wins.
    pub fn lookup_similar(&self, fingerprint: &Fingerprint, threshold: u32) -> Option<SimilarMatch> {
        let mut best: Option<(usize, u32)> = None;

        for (i, record) in self.records.iter().enumerate() {
            let Some(stored) = record.fingerprint else {
                continue;
            };
            let distance = fingerprint.distance(&stored);
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((i, distance));
            }
        }

        best.filter(|&(_, distance)| distance <= threshold)
            .map(|(i, distance)| SimilarMatch {
                relative_path: self.records[i].relative_path.clone(),
                distance,
            })
    }

    /// Insert or overwrite the entry for `relative_path`, then persist.
    ///
    /// If persisting fails the in-memory index is left as it was.
    pub fn put(
        &mut self,
        relative_path: &str,
        digest: ContentDigest,
        fingerprint: Option<Fingerprint>,
    ) -> Result<(), StoreError> {
        let record = PhotoRecord {
            relative_path: relative_path.to_string(),
            digest,
            fingerprint,
        };
        let previous = self.insert(record);

        if let Err(e) = self.backend.persist(&self.records) {
            self.rollback(relative_path, previous);
            return Err(e);
        }

        tracing::debug!(path = relative_path, sha256 = %digest, "Registered in hash index");
        Ok(())
    }

    /// Entry for a relative path
    pub fn get(&self, relative_path: &str) -> Option<&PhotoRecord> {
        self.by_path.get(relative_path).map(|&i| &self.records[i])
    }

    /// Entries in insertion order
    pub fn records(&self) -> &[PhotoRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn location(&self) -> String {
        self.backend.location()
    }

    /// Insert without persisting; returns the record that was replaced
    fn insert(&mut self, record: PhotoRecord) -> Option<PhotoRecord> {
        match self.by_path.get(&record.relative_path) {
            Some(&i) => {
                let previous = std::mem::replace(&mut self.records[i], record);
                self.rebuild_digest_index();
                Some(previous)
            }
            None => {
                let i = self.records.len();
                self.by_path.insert(record.relative_path.clone(), i);
                self.by_digest.entry(record.digest).or_insert(i);
                self.records.push(record);
                None
            }
        }
    }

    fn rollback(&mut self, relative_path: &str, previous: Option<PhotoRecord>) {
        match previous {
            Some(previous) => {
                if let Some(&i) = self.by_path.get(relative_path) {
                    self.records[i] = previous;
                }
            }
            None => {
                // A fresh insert is always the last record
                self.records.pop();
                self.by_path.remove(relative_path);
            }
        }
        self.rebuild_digest_index();
    }

    fn rebuild_digest_index(&mut self) {
        self.by_digest.clear();
        for (i, record) in self.records.iter().enumerate() {
            self.by_digest.entry(record.digest).or_insert(i);
        }
    }
}

impl std::fmt::Debug for HashStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashStore")
            .field("location", &self.backend.location())
            .field("entries", &self.records.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn digest(byte: u8) -> ContentDigest {
        ContentDigest::from_bytes([byte; 32])
    }

    fn empty_store() -> HashStore {
        HashStore::open(Box::new(InMemoryIndex::new())).unwrap()
    }

    #[test]
    fn lookup_exact_after_put() {
        let mut store = empty_store();
        store.put("Event1/a.jpg", digest(1), None).unwrap();

        assert_eq!(store.lookup_exact(&digest(1)), Some("Event1/a.jpg"));
        assert_eq!(store.lookup_exact(&digest(2)), None);
    }

    #[test]
    fn lookup_exact_prefers_earliest_entry() {
        let mut store = empty_store();
        store.put("Event1/a.jpg", digest(1), None).unwrap();
        store.put("Event2/a.jpg", digest(1), None).unwrap();

        assert_eq!(store.lookup_exact(&digest(1)), Some("Event1/a.jpg"));
    }

    #[test]
    fn overwrite_replaces_digest_and_keeps_position() {
        let mut store = empty_store();
        store.put("E/a.jpg", digest(1), None).unwrap();
        store.put("E/b.jpg", digest(2), None).unwrap();
        store.put("E/a.jpg", digest(3), None).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.records()[0].relative_path, "E/a.jpg");
        assert_eq!(store.lookup_exact(&digest(1)), None);
        assert_eq!(store.lookup_exact(&digest(3)), Some("E/a.jpg"));
    }

    #[test]
    fn lookup_similar_returns_none_when_all_beyond_threshold() {
        let mut store = empty_store();
        store.put("E/a.jpg", digest(1), Some(Fingerprint::new(0b1111_1111))).unwrap();

        assert_eq!(store.lookup_similar(&Fingerprint::new(0), 5), None);
    }

    #[test]
    fn lookup_similar_returns_globally_closest() {
        let mut store = empty_store();
        store.put("E/far.jpg", digest(1), Some(Fingerprint::new(0b1111))).unwrap();
        store.put("E/near.jpg", digest(2), Some(Fingerprint::new(0b1))).unwrap();
        store.put("E/none.jpg", digest(3), None).unwrap();

        let hit = store.lookup_similar(&Fingerprint::new(0), 5).unwrap();

        assert_eq!(hit.relative_path, "E/near.jpg");
        assert_eq!(hit.distance, 1);
    }

    #[test]
    fn lookup_similar_tie_goes_to_earliest_insert() {
        let mut store = empty_store();
        store.put("E/first.jpg", digest(1), Some(Fingerprint::new(0b0011))).unwrap();
        store.put("E/second.jpg", digest(2), Some(Fingerprint::new(0b1100))).unwrap();

        let hit = store.lookup_similar(&Fingerprint::new(0), 5).unwrap();

        assert_eq!(hit.relative_path, "E/first.jpg");
        assert_eq!(hit.distance, 2);
    }

    #[test]
    fn lookup_similar_threshold_is_inclusive() {
        let mut store = empty_store();
        store.put("E/a.jpg", digest(1), Some(Fingerprint::new(0b111))).unwrap();

        assert!(store.lookup_similar(&Fingerprint::new(0), 3).is_some());
        assert!(store.lookup_similar(&Fingerprint::new(0), 2).is_none());
    }

    #[test]
    fn lookup_similar_ignores_entries_without_fingerprint() {
        let mut store = empty_store();
        store.put("E/a.jpg", digest(1), None).unwrap();

        assert_eq!(store.lookup_similar(&Fingerprint::new(0), 64), None);
    }

    #[test]
    fn put_writes_through_every_time() {
        let backend = Arc::new(InMemoryIndex::new());
        let mut store = HashStore::open(Box::new(backend.clone())).unwrap();

        store.put("E/a.jpg", digest(1), None).unwrap();
        store.put("E/b.jpg", digest(2), None).unwrap();

        assert_eq!(backend.persist_count(), 2);
        assert_eq!(backend.stored().len(), 2);
    }

    #[test]
    fn failed_persist_rolls_back_memory() {
        let backend = Arc::new(InMemoryIndex::new());
        let mut store = HashStore::open(Box::new(backend.clone())).unwrap();
        store.put("E/a.jpg", digest(1), None).unwrap();

        backend.fail_writes(true);
        assert!(store.put("E/b.jpg", digest(2), None).is_err());
        assert!(store.put("E/a.jpg", digest(3), None).is_err());

        assert_eq!(store.len(), 1);
        assert_eq!(store.lookup_exact(&digest(1)), Some("E/a.jpg"));
        assert_eq!(store.lookup_exact(&digest(2)), None);
    }

    #[test]
    fn reopened_json_store_keeps_entries_and_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache").join("image_hashes.json");

        {
            let mut store = HashStore::open_json(&path).unwrap();
            store.put("Zeta/z.jpg", digest(1), Some(Fingerprint::new(0b11))).unwrap();
            store.put("Alpha/a.jpg", digest(2), Some(Fingerprint::new(0b1100))).unwrap();
        }

        let store = HashStore::open_json(&path).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.records()[0].relative_path, "Zeta/z.jpg");
        // Both are distance 2 from zero; insertion order decides
        let hit = store.lookup_similar(&Fingerprint::new(0), 5).unwrap();
        assert_eq!(hit.relative_path, "Zeta/z.jpg");
    }

    #[test]
    fn corrupt_json_store_fails_to_open() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("image_hashes.json");
        std::fs::write(&path, "garbage").unwrap();

        assert!(matches!(
            HashStore::open_json(&path),
            Err(StoreError::CorruptIndex { .. })
        ));
    }

    #[test]
    fn zero_byte_json_store_opens_empty_and_accepts_puts() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("image_hashes.json");
        std::fs::write(&path, "").unwrap();

        let mut store = HashStore::open_json(&path).unwrap();
        assert!(store.is_empty());

        store.put("E/a.jpg", digest(1), None).unwrap();
        assert_eq!(HashStore::open_json(&path).unwrap().len(), 1);
    }
}
