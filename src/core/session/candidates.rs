//! The ordered candidate list and its on-disk snapshot.
//!
//! A session iterates one fixed list. Filing photos changes what a fresh
//! scan would return, so the list is saved when a session starts and reused
//! when it resumes; the cursor then always points at the same photo.

use crate::core::persist::write_json_atomic;
use crate::core::workspace::relative_key;
use crate::error::SessionError;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Photos to sort, as root-relative keys in processing order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateList {
    root: PathBuf,
    entries: Vec<String>,
}

impl CandidateList {
    pub fn new(root: impl Into<PathBuf>, entries: Vec<String>) -> Self {
        Self {
            root: root.into(),
            entries,
        }
    }

    /// Build from absolute scan results
    pub fn from_paths(root: &Path, paths: &[PathBuf]) -> Self {
        let entries = paths.iter().map(|p| relative_key(root, p)).collect();
        Self::new(root, entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Root-relative key of candidate `index`
    pub fn key(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    /// Absolute path of candidate `index`
    pub fn path(&self, index: usize) -> Option<PathBuf> {
        self.key(index).map(|key| {
            key.split('/')
                .fold(self.root.clone(), |acc, part| acc.join(part))
        })
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

/// Location of the saved candidate list
#[derive(Debug, Clone)]
pub struct CandidateSnapshot {
    path: PathBuf,
}

impl CandidateSnapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The saved list, or `None` if no list was saved
    pub fn load(&self, root: &Path) -> Result<Option<CandidateList>, SessionError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(SessionError::Io {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };

        let entries: Vec<String> =
            serde_json::from_str(&text).map_err(|e| SessionError::CorruptState {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
        Ok(Some(CandidateList::new(root, entries)))
    }

    pub fn save(&self, list: &CandidateList) -> Result<(), SessionError> {
        write_json_atomic(&self.path, list.entries()).map_err(|e| SessionError::Io {
            path: self.path.clone(),
            source: e,
        })
    }

    /// Remove the saved list. Returns whether a file was removed.
    pub fn clear(&self) -> Result<bool, SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(SessionError::Io {
                path: self.path.clone(),
                source: e,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn from_paths_stores_relative_keys() {
        let root = Path::new("/photos");
        let list = CandidateList::from_paths(
            root,
            &[root.join("a.jpg"), root.join("trip").join("b.jpg")],
        );

        assert_eq!(list.entries(), ["a.jpg", "trip/b.jpg"]);
        assert_eq!(list.path(1), Some(root.join("trip").join("b.jpg")));
        assert_eq!(list.key(2), None);
    }

    #[test]
    fn snapshot_round_trips() {
        let dir = TempDir::new().unwrap();
        let snapshot = CandidateSnapshot::new(dir.path().join(".photosorter/candidates.json"));
        let list = CandidateList::new(dir.path(), vec!["b.jpg".into(), "a.jpg".into()]);

        snapshot.save(&list).unwrap();

        assert_eq!(snapshot.load(dir.path()).unwrap(), Some(list));
    }

    #[test]
    fn missing_snapshot_is_none() {
        let dir = TempDir::new().unwrap();
        let snapshot = CandidateSnapshot::new(dir.path().join("candidates.json"));

        assert_eq!(snapshot.load(dir.path()).unwrap(), None);
    }

    #[test]
    fn corrupt_snapshot_is_corrupt_state() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("candidates.json");
        fs::write(&path, "{\"not\": \"a list\"}").unwrap();

        assert!(matches!(
            CandidateSnapshot::new(&path).load(dir.path()),
            Err(SessionError::CorruptState { .. })
        ));
    }
}
