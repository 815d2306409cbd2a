//! Folder operations on the local file system.

use super::{validate_folder_name, FolderOps};
use crate::core::workspace::{SortWorkspace, DEFAULT_DUPLICATES_FOLDER};
use crate::error::FolderError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// [`FolderOps`] backed by `std::fs`
#[derive(Debug, Clone)]
pub struct FsFolderOps {
    workspace: SortWorkspace,
    duplicates_folder: String,
}

impl FsFolderOps {
    pub fn new(workspace: SortWorkspace) -> Self {
        Self {
            workspace,
            duplicates_folder: DEFAULT_DUPLICATES_FOLDER.to_string(),
        }
    }

    pub fn with_duplicates_folder(mut self, name: impl Into<String>) -> Self {
        self.duplicates_folder = name.into();
        self
    }

    /// Photos currently staged in `.trash`
    pub fn trash_count(&self) -> usize {
        fs::read_dir(self.workspace.trash_dir())
            .map(|entries| entries.filter_map(|e| e.ok()).count())
            .unwrap_or(0)
    }

    /// Permanently remove everything staged in `.trash`. Returns the number
    /// of entries removed.
    pub fn empty_trash(&self) -> Result<usize, FolderError> {
        let trash = self.workspace.trash_dir();
        let entries = match fs::read_dir(&trash) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(io_error(&trash, e)),
        };

        let mut removed = 0;
        for entry in entries {
            let path = entry.map_err(|e| io_error(&trash, e))?.path();
            let result = if path.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            result.map_err(|e| io_error(&path, e))?;
            removed += 1;
        }

        tracing::info!(removed, "Trash emptied");
        Ok(removed)
    }

    fn folder_path(&self, name: &str) -> PathBuf {
        self.workspace.root().join(name)
    }
}

impl FolderOps for FsFolderOps {
    fn list_event_folders(&self) -> Result<Vec<String>, FolderError> {
        let root = self.workspace.root();
        let entries = fs::read_dir(root).map_err(|e| io_error(root, e))?;

        let mut folders: Vec<String> = entries
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_dir())
            .filter_map(|e| e.file_name().to_str().map(str::to_string))
            .filter(|name| !name.starts_with('.') && *name != self.duplicates_folder)
            .collect();
        folders.sort();

        Ok(folders)
    }

    fn create_folder(&self, name: &str) -> Result<String, FolderError> {
        let name = validate_folder_name(name)?;
        let path = self.folder_path(&name);

        if path.exists() {
            return Err(FolderError::AlreadyExists { path });
        }
        fs::create_dir_all(&path).map_err(|e| io_error(&path, e))?;

        tracing::info!(folder = %name, "CREATED FOLDER");
        Ok(name)
    }

    fn ensure_folder(&self, name: &str) -> Result<(), FolderError> {
        let path = self.folder_path(name);
        if path.is_dir() {
            return Ok(());
        }
        if path.exists() {
            return Err(FolderError::NotADirectory { path });
        }
        fs::create_dir_all(&path).map_err(|e| io_error(&path, e))
    }

    fn move_to(&self, src: &Path, folder: &str) -> Result<String, FolderError> {
        let dest_dir = self.folder_path(folder);
        let dest = move_into(src, &dest_dir)?;
        Ok(self.workspace.relative_key(&dest))
    }

    fn delete(&self, src: &Path) -> Result<(), FolderError> {
        let trash = self.workspace.trash_dir();
        fs::create_dir_all(&trash).map_err(|e| io_error(&trash, e))?;
        let staged = move_into(src, &trash)?;

        tracing::debug!(src = %src.display(), staged = %staged.display(), "Staged for deletion");
        Ok(())
    }
}

fn io_error(path: &Path, source: io::Error) -> FolderError {
    FolderError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Move `src` into `dest_dir` without overwriting; returns the final path
fn move_into(src: &Path, dest_dir: &Path) -> Result<PathBuf, FolderError> {
    if !src.is_file() {
        return Err(FolderError::SourceMissing {
            path: src.to_path_buf(),
        });
    }
    if !dest_dir.is_dir() {
        return Err(FolderError::NotADirectory {
            path: dest_dir.to_path_buf(),
        });
    }

    let file_name = src
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| FolderError::SourceMissing {
            path: src.to_path_buf(),
        })?;
    let dest = unique_destination(dest_dir, &file_name);

    move_file(src, &dest)?;
    Ok(dest)
}

/// First free `name`, `stem_1.ext`, `stem_2.ext`, ... in `dir`
fn unique_destination(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let (stem, ext) = match file_name.rfind('.') {
        Some(dot) if dot > 0 => file_name.split_at(dot),
        _ => (file_name, ""),
    };

    (1..)
        .map(|n| dir.join(format!("{}_{}{}", stem, n, ext)))
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

/// Rename, or copy + verify + remove when the rename crosses filesystems
fn move_file(src: &Path, dest: &Path) -> Result<(), FolderError> {
    if fs::rename(src, dest).is_ok() {
        return Ok(());
    }

    let source_size = fs::metadata(src).map_err(|e| io_error(src, e))?.len();
    fs::copy(src, dest).map_err(|e| io_error(dest, e))?;

    let dest_size = fs::metadata(dest).map_err(|e| io_error(dest, e))?.len();
    if dest_size != source_size {
        // Incomplete copy; keep the source
        let _ = fs::remove_file(dest);
        return Err(FolderError::VerifyFailed {
            path: src.to_path_buf(),
            expected: source_size,
            actual: dest_size,
        });
    }

    fs::remove_file(src).map_err(|e| io_error(src, e))
}
