//! # Resolver Module
//!
//! Turns one candidate photo into a [`DuplicateVerdict`] against the hash
//! index.
//!
//! ## Algorithm
//! 1. Digest the file. An exact digest match wins outright.
//! 2. If the strategy supports fingerprints, fingerprint the file and look
//!    for the closest stored fingerprint within the threshold.
//! 3. Otherwise the photo is not a duplicate.
//!
//! The strategy is picked once, from the startup capability check, and
//! never changes during a run.

mod strategy;

pub use strategy::{
    Detection, DetectionStrategy, ExactOnlyDetector, ExactPlusPerceptualDetector,
    FingerprintSlot,
};

use crate::core::hasher::{ContentDigest, ContentHasher, Fingerprint, Fingerprinter};
use crate::core::store::HashStore;
use crate::error::HashError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Default maximum Hamming distance (out of 64 bits) for a likely duplicate
pub const DEFAULT_THRESHOLD: u32 = 5;

/// Outcome of checking one candidate against the hash index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DuplicateVerdict {
    NotDuplicate,
    /// Byte-identical to an indexed photo
    ExactDuplicate { of: String },
    /// Visually close to an indexed photo
    LikelyDuplicate { of: String, distance: u32 },
}

impl DuplicateVerdict {
    pub fn is_duplicate(&self) -> bool {
        !matches!(self, DuplicateVerdict::NotDuplicate)
    }

    /// Relative path of the indexed photo this one matched
    pub fn matched_path(&self) -> Option<&str> {
        match self {
            DuplicateVerdict::NotDuplicate => None,
            DuplicateVerdict::ExactDuplicate { of }
            | DuplicateVerdict::LikelyDuplicate { of, .. } => Some(of),
        }
    }
}

impl fmt::Display for DuplicateVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuplicateVerdict::NotDuplicate => write!(f, "not a duplicate"),
            DuplicateVerdict::ExactDuplicate { of } => write!(f, "exact duplicate of {}", of),
            DuplicateVerdict::LikelyDuplicate { of, distance } => {
                write!(f, "likely duplicate of {} (distance {})", of, distance)
            }
        }
    }
}

/// Everything learned about a candidate while resolving it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inspection {
    pub digest: ContentDigest,
    pub verdict: DuplicateVerdict,
    fingerprint: FingerprintSlot,
}

/// Pick the detection strategy from the result of the capability check
pub fn select_strategy(fingerprinter: Option<Box<dyn Fingerprinter>>) -> Box<dyn DetectionStrategy> {
    match fingerprinter {
        Some(fingerprinter) => Box::new(ExactPlusPerceptualDetector::new(fingerprinter)),
        None => Box::new(ExactOnlyDetector),
    }
}

/// Combines the content hasher with a detection strategy.
pub struct DuplicateResolver {
    hasher: ContentHasher,
    strategy: Box<dyn DetectionStrategy>,
    threshold: u32,
}

impl DuplicateResolver {
    pub fn new(strategy: Box<dyn DetectionStrategy>) -> Self {
        Self {
            hasher: ContentHasher::new(),
            strategy,
            threshold: DEFAULT_THRESHOLD,
        }
    }

    /// Resolver that only ever reports exact duplicates
    pub fn exact_only() -> Self {
        Self::new(Box::new(ExactOnlyDetector))
    }

    /// Maximum Hamming distance for a likely duplicate (lower is stricter)
    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_hasher(mut self, hasher: ContentHasher) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Check `path` against `store`.
    ///
    /// Only an unreadable file is an error; an undecodable image simply has
    /// no fingerprint.
    pub fn resolve(&self, path: &Path, store: &HashStore) -> Result<Inspection, HashError> {
        let digest = self.hasher.digest_file(path)?;
        let Detection {
            verdict,
            fingerprint,
        } = self.strategy.detect(path, &digest, store, self.threshold);

        tracing::debug!(
            path = %path.display(),
            sha256 = %digest,
            verdict = %verdict,
            "Resolved candidate"
        );

        Ok(Inspection {
            digest,
            verdict,
            fingerprint,
        })
    }

    /// Fingerprint to store when filing an inspected photo.
    ///
    /// Reuses the one computed during detection; otherwise computes it now.
    /// Call before the file moves.
    pub fn filing_fingerprint(&self, path: &Path, inspection: &Inspection) -> Option<Fingerprint> {
        match inspection.fingerprint {
            FingerprintSlot::Computed(fingerprint) => fingerprint,
            FingerprintSlot::NotComputed => self.strategy.fingerprint(path),
        }
    }
}

impl fmt::Debug for DuplicateResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DuplicateResolver")
            .field("strategy", &self.strategy.name())
            .field("threshold", &self.threshold)
            .finish()
    }
}
