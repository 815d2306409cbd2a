//! # Workflow Module
//!
//! The resumable sorting session.
//!
//! ## Flow
//! 1. **Load**: open the hash index, the saved session and the candidate
//!    list (scanned fresh, or the snapshot saved when sorting began)
//! 2. **Iterate**: one candidate at a time, from the saved cursor
//! 3. **Resolve**: compare against the index of already-filed photos
//! 4. **Decide**: auto-route duplicates, otherwise ask the [`Presenter`]
//! 5. **Apply**: move or stage for deletion, register, save, advance
//!
//! ## Example
//! ```rust,ignore
//! use photo_sorter::core::workflow::{SortConfig, SortWorkflow};
//!
//! let workflow = SortWorkflow::builder("/photos/unsorted")
//!     .config(SortConfig::default())
//!     .build()?;
//! let summary = workflow.run(&mut presenter)?;
//! println!("{} sorted", summary.sorted);
//! ```

mod config;
mod executor;
mod presenter;

pub use config::{CorruptStatePolicy, SortConfig};
pub use executor::{SortWorkflow, SortWorkflowBuilder};
pub use presenter::{CandidateContext, Disposition, Notice, Presenter};
