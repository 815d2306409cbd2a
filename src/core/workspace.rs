//! On-disk layout of a sorting root.
//!
//! ```text
//! <root>/
//!   .photosorter/
//!     state.json              session cursor and counters
//!     candidates.json         candidate list the session iterates
//!     cache/image_hashes.json hash index
//!     sorter.log              log file
//!   .trash/                   photos staged for deletion
//!   Duplicates/               default duplicates folder
//!   <Event folders>/
//! ```

use std::path::{Component, Path, PathBuf};

pub const STATE_DIR_NAME: &str = ".photosorter";
pub const TRASH_DIR_NAME: &str = ".trash";
pub const DEFAULT_DUPLICATES_FOLDER: &str = "Duplicates";

/// Paths of every artifact kept under a sorting root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortWorkspace {
    root: PathBuf,
}

impl SortWorkspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn state_dir(&self) -> PathBuf {
        self.root.join(STATE_DIR_NAME)
    }

    pub fn state_file(&self) -> PathBuf {
        self.state_dir().join("state.json")
    }

    pub fn candidates_file(&self) -> PathBuf {
        self.state_dir().join("candidates.json")
    }

    pub fn index_file(&self) -> PathBuf {
        self.state_dir().join("cache").join("image_hashes.json")
    }

    pub fn log_file(&self) -> PathBuf {
        self.state_dir().join("sorter.log")
    }

    pub fn trash_dir(&self) -> PathBuf {
        self.root.join(TRASH_DIR_NAME)
    }

    /// Root-relative, `/`-separated key for `path`
    pub fn relative_key(&self, path: &Path) -> String {
        relative_key(&self.root, path)
    }

    /// Absolute path for a root-relative key
    pub fn resolve(&self, key: &str) -> PathBuf {
        key.split('/')
            .filter(|part| !part.is_empty())
            .fold(self.root.clone(), |acc, part| acc.join(part))
    }
}

/// Root-relative, `/`-separated form of `path`.
///
/// Paths outside `root` are returned whole, with `/` separators.
pub fn relative_key(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_lives_under_state_dir() {
        let workspace = SortWorkspace::new("/photos/2024");

        assert_eq!(
            workspace.state_file(),
            PathBuf::from("/photos/2024/.photosorter/state.json")
        );
        assert_eq!(
            workspace.index_file(),
            PathBuf::from("/photos/2024/.photosorter/cache/image_hashes.json")
        );
        assert_eq!(workspace.trash_dir(), PathBuf::from("/photos/2024/.trash"));
    }

    #[test]
    fn relative_key_uses_forward_slashes() {
        let root = Path::new("/photos");
        let path = root.join("Event1").join("beach.jpg");

        assert_eq!(relative_key(root, &path), "Event1/beach.jpg");
    }

    #[test]
    fn resolve_inverts_relative_key() {
        let workspace = SortWorkspace::new("/photos");
        let path = workspace.resolve("Event1/sub/beach.jpg");

        assert_eq!(path, Path::new("/photos/Event1/sub/beach.jpg"));
        assert_eq!(workspace.relative_key(&path), "Event1/sub/beach.jpg");
    }
}
