//! # Folders Module
//!
//! File-system side effects of sorting: event folders, moves and deletes.
//!
//! ## Rules
//! - Event folders are the visible top-level directories of the root,
//!   except the duplicates folder
//! - A move never overwrites; name clashes get `_1`, `_2`, ... before the
//!   extension
//! - Deleting stages the photo in `.trash`, which is purged at the end of
//!   a session

mod fs_ops;

pub use fs_ops::FsFolderOps;

use crate::error::FolderError;
use std::path::Path;

/// Characters not allowed in a folder name
pub const INVALID_NAME_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Folder operations the sorting workflow needs.
///
/// Folder names are single path components under the sorting root; paths
/// returned are root-relative keys with `/` separators.
pub trait FolderOps: Send + Sync {
    /// Event folder names, sorted
    fn list_event_folders(&self) -> Result<Vec<String>, FolderError>;

    /// Create a new event folder. Returns the cleaned name actually used.
    fn create_folder(&self, name: &str) -> Result<String, FolderError>;

    /// Create `name` if it does not exist yet
    fn ensure_folder(&self, name: &str) -> Result<(), FolderError>;

    /// Move `src` into folder `folder`, returning the root-relative path used
    fn move_to(&self, src: &Path, folder: &str) -> Result<String, FolderError>;

    /// Remove `src` from the photo set
    fn delete(&self, src: &Path) -> Result<(), FolderError>;
}

/// Trim and check a user-supplied folder name
pub fn validate_folder_name(name: &str) -> Result<String, FolderError> {
    let trimmed = name.trim();
    let invalid = |reason: String| FolderError::InvalidName {
        name: name.to_string(),
        reason,
    };

    if trimmed.is_empty() {
        return Err(invalid("folder name cannot be empty".to_string()));
    }
    if let Some(c) = trimmed.chars().find(|c| INVALID_NAME_CHARS.contains(c)) {
        return Err(invalid(format!("contains invalid character '{}'", c)));
    }
    if trimmed == "." || trimmed == ".." {
        return Err(invalid("reserved name".to_string()));
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_name_is_trimmed() {
        assert_eq!(validate_folder_name("  Beach Trip ").unwrap(), "Beach Trip");
    }

    #[test]
    fn empty_name_is_rejected() {
        assert!(matches!(
            validate_folder_name("   "),
            Err(FolderError::InvalidName { .. })
        ));
    }

    #[test]
    fn every_reserved_character_is_rejected() {
        for c in INVALID_NAME_CHARS {
            let name = format!("Trip{}2024", c);
            assert!(validate_folder_name(&name).is_err(), "accepted {:?}", name);
        }
    }

    #[test]
    fn dot_names_are_rejected() {
        assert!(validate_folder_name("..").is_err());
    }
}
