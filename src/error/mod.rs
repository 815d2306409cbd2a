//! # Error Module
//!
//! User-friendly error types for the photo sorter.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, file names, what went wrong
//! - **Fail closed** on corrupt persisted data - never guess a resume position
//! - **Recovery hints** - suggest how to fix when possible

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum SorterError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Hashing error: {0}")]
    Hash(#[from] HashError),

    #[error("Hash index error: {0}")]
    Store(#[from] StoreError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Folder operation failed: {0}")]
    Folder(#[from] FolderError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur during photo scanning
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while digesting or fingerprinting a photo
#[derive(Error, Debug)]
pub enum HashError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode image {path}: {reason}")]
    DecodeError { path: PathBuf, reason: String },

    #[error("Perceptual fingerprinting unavailable: {reason}")]
    CapabilityUnavailable { reason: String },

    #[error("Invalid {kind} hex value '{value}'")]
    InvalidHex { kind: &'static str, value: String },
}

/// Errors that occur with the persisted hash index
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Hash index at {path} is corrupt ({reason}). Fix or delete this file and try again.")]
    CorruptIndex { path: PathBuf, reason: String },

    #[error("Failed to write hash index {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize hash index: {0}")]
    SerializationFailed(String),
}

/// Errors that occur with the persisted session state
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session state at {path} is corrupt ({reason}). Run `photo-sort reset` to start over.")]
    CorruptState { path: PathBuf, reason: String },

    #[error("Failed to access session file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from creating folders and moving or deleting photos
#[derive(Error, Debug)]
pub enum FolderError {
    #[error("Invalid folder name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Folder already exists: {path}")]
    AlreadyExists { path: PathBuf },

    #[error("Source file not found: {path}")]
    SourceMissing { path: PathBuf },

    #[error("Destination is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Copy verification failed for {path}: source {expected} bytes, destination {actual} bytes")]
    VerifyFailed {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, SorterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_error_includes_path() {
        let error = ScanError::DirectoryNotFound {
            path: PathBuf::from("/photos/2021"),
        };
        assert!(error.to_string().contains("/photos/2021"));
    }

    #[test]
    fn corrupt_state_suggests_reset() {
        let error = SessionError::CorruptState {
            path: PathBuf::from("/photos/.photosorter/state.json"),
            reason: "expected value at line 1".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("state.json"));
        assert!(message.contains("photo-sort reset"));
    }

    #[test]
    fn corrupt_index_suggests_recovery() {
        let error = StoreError::CorruptIndex {
            path: PathBuf::from("/photos/.photosorter/cache/image_hashes.json"),
            reason: "trailing characters".to_string(),
        };
        assert!(error.to_string().contains("delete this file"));
    }

    #[test]
    fn folder_error_converts_to_top_level() {
        let error: SorterError = FolderError::SourceMissing {
            path: PathBuf::from("/photos/a.jpg"),
        }
        .into();
        assert!(matches!(error, SorterError::Folder(_)));
        assert!(error.to_string().contains("/photos/a.jpg"));
    }
}
