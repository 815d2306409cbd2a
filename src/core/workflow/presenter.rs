//! The interaction seam between the workflow and whoever makes decisions.

use crate::core::resolver::DuplicateVerdict;
use crate::events::SessionSummary;
use std::io;
use std::path::Path;

/// The user's choice for one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// File into the event folder at this index of `event_folders`
    MoveToEvent { index: usize },
    /// Create a new event folder, then file into it
    CreateFolder { name: String },
    Skip,
    /// Stage for deletion (the workflow asks for confirmation first)
    Delete,
    /// Route to the duplicates folder
    MarkDuplicate,
    Quit,
}

/// What the presenter is shown for one candidate
#[derive(Debug, Clone, Copy)]
pub struct CandidateContext<'a> {
    pub path: &'a Path,
    pub relative_path: &'a str,
    /// Zero-based position in the candidate list
    pub position: usize,
    pub total: usize,
    pub event_folders: &'a [String],
    pub verdict: &'a DuplicateVerdict,
}

/// A message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Warning(String),
    Error(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::Info(m) | Notice::Warning(m) | Notice::Error(m) => m,
        }
    }
}

/// Renders candidates and collects dispositions.
pub trait Presenter {
    /// Ask for a disposition. An error (closed input, interrupt) ends the
    /// session as if the user had quit.
    fn prompt_decision(&mut self, context: &CandidateContext<'_>) -> io::Result<Disposition>;

    /// Yes/no question; anything but an explicit yes is no
    fn confirm(&mut self, question: &str) -> bool;

    fn notify(&mut self, notice: Notice);

    fn print_summary(&mut self, summary: &SessionSummary);
}
