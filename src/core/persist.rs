//! Crash-safe file replacement.
//!
//! Writers never touch the target file directly. Bytes go to a temporary
//! file in the same directory, are flushed to disk, and the temporary file
//! is renamed over the target. A crash at any point leaves either the old
//! contents or the new contents, never a mix.

use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Atomically replace `path` with `bytes`, creating parent directories.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    // Same directory as the target so the rename never crosses filesystems
    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}

/// Serialize `value` as pretty JSON (trailing newline) and write it atomically.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> io::Result<()> {
    let mut json = serde_json::to_vec_pretty(value).map_err(io::Error::other)?;
    json.push(b'\n');
    write_atomic(path, &json)
}
