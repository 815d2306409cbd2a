//! # photo-sort CLI
//!
//! Command-line interface for the photo sorter.
//!
//! ## Usage
//! ```bash
//! photo-sort sort ~/Pictures/Unsorted
//! photo-sort sort ~/Pictures/Unsorted --threshold 8 --no-preview
//! photo-sort status ~/Pictures/Unsorted
//! photo-sort reset ~/Pictures/Unsorted --index
//! ```

mod cli;

use std::process::ExitCode;

fn main() -> ExitCode {
    match cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
