//! # Core Module
//!
//! The sorting engine, independent of any front end.
//!
//! ## Modules
//! - `scanner` - Discovers candidate photos under the sorting root
//! - `hasher` - Content digests and perceptual fingerprints
//! - `store` - Persistent index of filed photos
//! - `resolver` - Classifies a candidate against the index
//! - `session` - Resume state and the candidate snapshot
//! - `folders` - Event folders, moves and staged deletes
//! - `viewer` - Photo preview in the system viewer
//! - `workflow` - The interactive sorting state machine
//! - `workspace` - Layout of the sorting root and its state directory

pub mod folders;
pub mod hasher;
pub mod persist;
pub mod resolver;
pub mod scanner;
pub mod session;
pub mod store;
pub mod viewer;
pub mod workflow;
pub mod workspace;

// Re-export commonly used types
pub use hasher::{ContentDigest, Fingerprint, FingerprintAlgorithm};
pub use resolver::{DuplicateResolver, DuplicateVerdict};
pub use scanner::PhotoFile;
pub use store::HashStore;
pub use workflow::{SortConfig, SortWorkflow};
pub use workspace::SortWorkspace;
