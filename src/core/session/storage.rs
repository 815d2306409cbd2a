//! Loading and saving the session file.

use super::SessionState;
use crate::core::persist::write_json_atomic;
use crate::error::SessionError;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Location of a persisted [`SessionState`]
#[derive(Debug, Clone)]
pub struct SessionStorage {
    path: PathBuf,
}

impl SessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load the saved state, or a zeroed state if none was saved.
    ///
    /// A file that exists but does not parse is `CorruptState`; the caller
    /// decides whether to abort or start over.
    pub fn load(&self) -> Result<SessionState, SessionError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(SessionState::new()),
            Err(e) => {
                return Err(SessionError::Io {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };

        serde_json::from_str(&text).map_err(|e| SessionError::CorruptState {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    /// Atomically replace the saved state
    pub fn save(&self, state: &SessionState) -> Result<(), SessionError> {
        write_json_atomic(&self.path, state).map_err(|e| SessionError::Io {
            path: self.path.clone(),
            source: e,
        })?;

        tracing::debug!(
            path = %self.path.display(),
            cursor = state.cursor(),
            "Session saved"
        );
        Ok(())
    }

    /// Remove the saved state. Returns whether a file was removed.
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

    fn storage(dir: &TempDir) -> SessionStorage {
        SessionStorage::new(dir.path().join(".photosorter").join("state.json"))
    }

    fn busy_state() -> SessionState {
        SessionState::new()
            .record_sorted()
            .advance()
            .record_skipped("Misc/blurry.jpg")
            .advance()
            .record_deleted()
            .advance()
            .record_duplicate()
            .advance()
    }

    #[test]
    fn missing_file_loads_zeroed_state() {
        let dir = TempDir::new().unwrap();
        assert_eq!(storage(&dir).load().unwrap(), SessionState::new());
    }

    #[test]
    fn save_then_load_reproduces_every_field() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);
        let state = busy_state();

        storage.save(&state).unwrap();

        assert_eq!(storage.load().unwrap(), state);
    }

    #[test]
    fn zeroed_state_round_trips_with_empty_list() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);

        storage.save(&SessionState::new()).unwrap();
        let text = fs::read_to_string(storage.path()).unwrap();

        assert!(text.contains("\"skipped_files\": []"));
        assert_eq!(storage.load().unwrap(), SessionState::new());
    }

    #[test]
    fn resave_without_changes_is_byte_identical() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);
        storage.save(&busy_state()).unwrap();
        let first = fs::read(storage.path()).unwrap();

        let reloaded = storage.load().unwrap();
        storage.save(&reloaded).unwrap();

        assert_eq!(fs::read(storage.path()).unwrap(), first);
        assert_eq!(storage.load().unwrap(), reloaded);
    }

    #[test]
    fn unparsable_file_is_corrupt_state() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);
        fs::create_dir_all(storage.path().parent().unwrap()).unwrap();
        fs::write(storage.path(), "{\"last_index\": ").unwrap();

        assert!(matches!(
            storage.load(),
            Err(SessionError::CorruptState { .. })
        ));
    }

    #[test]
    fn wrong_field_type_is_corrupt_state() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);
        fs::create_dir_all(storage.path().parent().unwrap()).unwrap();
        fs::write(storage.path(), r#"{"last_index": "seven"}"#).unwrap();

        assert!(matches!(
            storage.load(),
            Err(SessionError::CorruptState { .. })
        ));
    }

    #[test]
    fn clear_removes_file_once() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);
        storage.save(&busy_state()).unwrap();

        assert!(storage.clear().unwrap());
        assert!(!storage.clear().unwrap());
        assert!(!storage.exists());
    }
}
