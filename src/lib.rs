//! # Photo Sorter
//!
//! Interactively sort a folder of photos into event folders, one photo at a
//! time, without filing the same picture twice.
//!
//! ## Core Philosophy
//! - **Never lose a photo** - deletes are staged and confirmed, moves never overwrite
//! - **Never lose progress** - every decision is saved before the next photo is shown
//! - **Recognise what is already filed** - exact and near-duplicates are routed aside
//!
//! ## Architecture
//! - `core` - The sorting engine (scanner, hashing, index, session, workflow)
//! - `events` - Event-driven progress reporting
//! - `error` - User-friendly error types

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{Result, SorterError};

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

/// Initialize tracing, appending to `log_file`.
///
/// The level defaults to `info` and can be overridden with `RUST_LOG`.
/// Calling this more than once keeps the first subscriber.
pub fn init_tracing(log_file: &Path) -> Result<()> {
    let io_error = |source: std::io::Error| SorterError::Io {
        path: log_file.to_path_buf(),
        source,
    };

    if let Some(parent) = log_file.parent() {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .map_err(io_error)?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    if installed.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }

    Ok(())
}
