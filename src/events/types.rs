//! Event type definitions for progress reporting.

use crate::core::resolver::DuplicateVerdict;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted while scanning and sorting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Scanning phase events
    Scan(ScanEvent),
    /// Sorting workflow events
    Sort(SortEvent),
}

/// Events during the scanning phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Scanning has started
    Started { root: PathBuf },
    /// A photo was found
    PhotoFound { path: PathBuf },
    /// An error occurred but scanning continues
    Error { path: PathBuf, message: String },
    /// Scanning completed
    Completed { total_photos: usize },
}

/// Events emitted by the sorting workflow, one per state transition or disposition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SortEvent {
    /// The state machine moved to a new phase
    PhaseChanged { phase: SortPhase },
    /// Candidates are loaded and iteration starts at `cursor`
    Loaded {
        cursor: usize,
        total: usize,
        resumed: bool,
    },
    /// The candidate vanished between scan and processing
    CandidateMissing { path: PathBuf },
    /// The candidate could not be read; it is passed over
    CandidateUnreadable { path: PathBuf, message: String },
    /// The candidate is already the indexed copy of itself
    AlreadyFiled { path: PathBuf },
    /// A duplicate was routed to the duplicates folder without asking
    DuplicateRouted {
        path: PathBuf,
        verdict: DuplicateVerdict,
        destination: String,
    },
    /// The photo was filed into an event folder and registered in the index
    Filed { path: PathBuf, destination: String },
    /// The user marked the photo as a duplicate
    MarkedDuplicate { path: PathBuf, destination: String },
    /// The user skipped the photo
    Skipped { path: PathBuf },
    /// The photo was staged for deletion
    Deleted { path: PathBuf },
    /// Applying a disposition failed; the candidate stays unresolved
    ActionFailed { path: PathBuf, message: String },
    /// The workflow reached its terminal state
    Finished { summary: SessionSummary },
}

/// Phases of the sorting state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortPhase {
    Loading,
    Iterating,
    Resolving,
    AwaitingDecision,
    Applying,
    Finished(FinishReason),
}

/// Why the sorting loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Every candidate has been processed
    Exhausted,
    /// The user chose to quit
    UserQuit,
}

/// Counters reported at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Photos filed into event folders (all sessions)
    pub sorted: usize,
    /// Photos skipped (all sessions)
    pub skipped: usize,
    /// Photos deleted (all sessions)
    pub deleted: usize,
    /// Photos routed to the duplicates folder (all sessions)
    pub duplicates: usize,
    /// Candidates found missing during this run only
    pub missing: usize,
    /// Position reached in the candidate list
    pub cursor: usize,
    /// Size of the candidate list
    pub total: usize,
    /// Why the run ended
    pub reason: Option<FinishReason>,
    /// Duration of this run in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for SortPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortPhase::Loading => write!(f, "Loading"),
            SortPhase::Iterating => write!(f, "Iterating"),
            SortPhase::Resolving => write!(f, "Resolving"),
            SortPhase::AwaitingDecision => write!(f, "Awaiting decision"),
            SortPhase::Applying => write!(f, "Applying"),
            SortPhase::Finished(FinishReason::Exhausted) => write!(f, "Finished (all photos processed)"),
            SortPhase::Finished(FinishReason::UserQuit) => write!(f, "Finished (quit)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_serializable() {
        let event = Event::Sort(SortEvent::Filed {
            path: PathBuf::from("/photos/a.jpg"),
            destination: "Event1/a.jpg".to_string(),
        });

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: Event = serde_json::from_str(&json).unwrap();

        match deserialized {
            Event::Sort(SortEvent::Filed { destination, .. }) => {
                assert_eq!(destination, "Event1/a.jpg");
            }
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn finish_phase_display_names_reason() {
        assert_eq!(
            SortPhase::Finished(FinishReason::UserQuit).to_string(),
            "Finished (quit)"
        );
        assert_eq!(SortPhase::AwaitingDecision.to_string(), "Awaiting decision");
    }
}
