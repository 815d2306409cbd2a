//! # Session Module
//!
//! The single source of truth for "where was I":
//!
//! - [`SessionState`] - cursor, counters and skipped photos, passed by value
//! - [`SessionStorage`] - atomic save, fail-closed load of `state.json`
//! - [`CandidateList`] / [`CandidateSnapshot`] - the fixed list the cursor
//!   indexes into
//!
//! Saved files are only removed through `clear`, which the sorting workflow
//! never calls; `photo-sort reset` does.

mod candidates;
mod state;
mod storage;

pub use candidates::{CandidateList, CandidateSnapshot};
pub use state::SessionState;
pub use storage::SessionStorage;
