//! # CLI Module
//!
//! Command-line interface for the photo sorter.
//!
//! ## Usage
//! ```bash
//! # Sort a folder, one photo at a time
//! photo-sort sort ~/Pictures/Unsorted
//!
//! # Stricter near-duplicate matching, ask before routing duplicates
//! photo-sort sort ~/Pictures/Unsorted --threshold 3 --no-auto-duplicates
//!
//! # Show saved progress
//! photo-sort status ~/Pictures/Unsorted
//!
//! # Forget saved progress (and the duplicate history)
//! photo-sort reset ~/Pictures/Unsorted --index
//! ```

mod terminal;

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use photo_sorter::core::folders::FsFolderOps;
use photo_sorter::core::hasher::FingerprintAlgorithm;
use photo_sorter::core::session::{CandidateSnapshot, SessionStorage};
use photo_sorter::core::store::HashStore;
use photo_sorter::core::workflow::{CorruptStatePolicy, Presenter, SortConfig, SortWorkflow};
use photo_sorter::core::workspace::SortWorkspace;
use photo_sorter::error::{Result, ScanError, SorterError};
use photo_sorter::events::{Event, EventChannel, EventReceiver, ScanEvent};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use terminal::TerminalPresenter;

/// Photo Sorter - file photos into event folders, one keystroke at a time
#[derive(Parser, Debug)]
#[command(name = "photo-sort")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "Keys while sorting:\n  1-9  Move to event folder\n  N    Create new event folder\n  S    Skip photo\n  D    Delete photo\n  U    Mark as duplicate\n  Q    Quit and save progress")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sort the photos in a directory interactively
    Sort {
        /// Directory containing the photos to sort
        directory: PathBuf,

        /// Near-duplicate distance threshold (lower = stricter, 0-64)
        #[arg(short, long, default_value = "5")]
        threshold: u32,

        /// Ask before moving duplicates instead of moving them automatically
        #[arg(long)]
        no_auto_duplicates: bool,

        /// Fingerprint algorithm for near-duplicate detection
        #[arg(short, long, default_value = "perceptual")]
        algorithm: Algorithm,

        /// Only detect byte-identical duplicates
        #[arg(long)]
        exact_only: bool,

        /// Do not open photos in the system image viewer
        #[arg(long)]
        no_preview: bool,

        /// Start over if the saved session cannot be read
        #[arg(long)]
        discard_corrupt_state: bool,
    },

    /// Show saved progress for a directory
    Status {
        directory: PathBuf,
    },

    /// Delete the saved session so sorting starts from the first photo
    Reset {
        directory: PathBuf,

        /// Also forget the hash index of filed photos
        #[arg(long)]
        index: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Algorithm {
    /// DCT perceptual hash - robust to resizing and recompression (default)
    Perceptual,
    /// Difference hash - faster, less robust
    Difference,
}

impl From<Algorithm> for FingerprintAlgorithm {
    fn from(algo: Algorithm) -> Self {
        match algo {
            Algorithm::Perceptual => FingerprintAlgorithm::Perceptual,
            Algorithm::Difference => FingerprintAlgorithm::Difference,
        }
    }
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Sort {
            directory,
            threshold,
            no_auto_duplicates,
            algorithm,
            exact_only,
            no_preview,
            discard_corrupt_state,
        } => {
            let config = SortConfig {
                threshold,
                auto_duplicates: !no_auto_duplicates,
                algorithm: algorithm.into(),
                exact_only,
                preview: !no_preview,
                corrupt_state: if discard_corrupt_state {
                    CorruptStatePolicy::StartOver
                } else {
                    CorruptStatePolicy::Abort
                },
                ..SortConfig::default()
            };
            run_sort(&directory, config)
        }
        Commands::Status { directory } => run_status(&directory),
        Commands::Reset { directory, index } => run_reset(&directory, index),
    }
}

fn open_workspace(directory: &Path) -> Result<SortWorkspace> {
    if !directory.is_dir() {
        return Err(ScanError::DirectoryNotFound {
            path: directory.to_path_buf(),
        }
        .into());
    }
    let root = fs::canonicalize(directory).map_err(|source| SorterError::Io {
        path: directory.to_path_buf(),
        source,
    })?;
    Ok(SortWorkspace::new(root))
}

fn run_sort(directory: &Path, config: SortConfig) -> Result<()> {
    let workspace = open_workspace(directory)?;
    config.validate()?;
    photo_sorter::init_tracing(&workspace.log_file())?;

    let term = Term::stderr();
    term.write_line(&format!(
        "{} {}",
        style("Photo Sorter").bold().cyan(),
        style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
    ))
    .ok();

    let mut presenter = TerminalPresenter::new();
    let folders =
        FsFolderOps::new(workspace.clone()).with_duplicates_folder(config.duplicates_folder.clone());

    let staged = folders.trash_count();
    if staged > 0
        && presenter.confirm(&format!(
            "{} photo(s) deleted in a previous session are still in .trash. Remove them permanently?",
            staged
        ))
    {
        let removed = folders.empty_trash()?;
        term.write_line(&format!("Removed {} staged photo(s).", removed)).ok();
    }

    let (sender, receiver) = EventChannel::new();
    let event_thread = thread::spawn(move || show_scan_progress(receiver));

    let workflow = SortWorkflow::builder(workspace.root())
        .config(config)
        .folders(Box::new(folders.clone()))
        .events(sender)
        .build()?;
    let result = workflow.run(&mut presenter);

    // The workflow owned the only sender; the thread ends once it is dropped
    event_thread.join().ok();
    result?;

    let removed = folders.empty_trash()?;
    if removed > 0 {
        term.write_line(&format!(
            "{} Permanently removed {} deleted photo(s).",
            style("✓").green().bold(),
            removed
        ))
        .ok();
    }

    Ok(())
}

/// Spinner while the candidate scan runs
fn show_scan_progress(receiver: EventReceiver) {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} ({pos} photos)")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );

    for event in receiver.iter() {
        match event {
            Event::Scan(ScanEvent::Started { root }) => {
                spinner.enable_steady_tick(Duration::from_millis(100));
                spinner.set_message(format!("Scanning {}", root.display()));
            }
            Event::Scan(ScanEvent::PhotoFound { .. }) => spinner.inc(1),
            Event::Scan(ScanEvent::Completed { .. }) => spinner.finish_and_clear(),
            _ => {}
        }
    }
    spinner.finish_and_clear();
}

fn run_status(directory: &Path) -> Result<()> {
    let workspace = open_workspace(directory)?;
    let state = SessionStorage::new(workspace.state_file()).load()?;
    let candidates = CandidateSnapshot::new(workspace.candidates_file()).load(workspace.root())?;
    let store = HashStore::open_json(&workspace.index_file())?;
    let staged = FsFolderOps::new(workspace.clone()).trash_count();

    println!("{}", style(workspace.root().display()).bold());
    match (state.cursor(), candidates) {
        (0, _) => println!("  Progress:         not started"),
        (cursor, Some(list)) => println!("  Progress:         {}/{}", cursor, list.len()),
        (cursor, None) => println!("  Progress:         {} photos processed", cursor),
    }
    println!("  Photos sorted:    {}", state.sorted_count());
    println!("  Photos skipped:   {}", state.skipped_count());
    println!("  Photos deleted:   {}", state.deleted_count());
    println!("  Duplicates found: {}", state.duplicate_count());
    println!("  Indexed photos:   {}", store.len());
    if staged > 0 {
        println!("  Awaiting removal: {}", staged);
    }

    Ok(())
}

fn run_reset(directory: &Path, index: bool) -> Result<()> {
    let workspace = open_workspace(directory)?;

    let session = SessionStorage::new(workspace.state_file()).clear()?;
    CandidateSnapshot::new(workspace.candidates_file()).clear()?;
    if session {
        println!("Saved session removed.");
    } else {
        println!("No saved session.");
    }

    if index {
        let path = workspace.index_file();
        match fs::remove_file(&path) {
            Ok(()) => println!("Hash index removed."),
            Err(e) if e.kind() == io::ErrorKind::NotFound => println!("No hash index."),
            Err(source) => return Err(SorterError::Io { path, source }),
        }
    }

    Ok(())
}
