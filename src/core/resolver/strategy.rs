//! Detection strategies, chosen once at startup.

use super::DuplicateVerdict;
use crate::core::hasher::{ContentDigest, Fingerprint, Fingerprinter};
use crate::core::store::HashStore;
use std::path::Path;

/// Fingerprint state carried from detection to filing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FingerprintSlot {
    /// Detection stopped before fingerprinting (exact match)
    NotComputed,
    /// Fingerprinting ran, or can never run; `None` means unavailable
    Computed(Option<Fingerprint>),
}

/// Outcome of a strategy for one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub verdict: DuplicateVerdict,
    pub fingerprint: FingerprintSlot,
}

/// How a candidate is compared against the hash index.
pub trait DetectionStrategy: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Verdict for a candidate whose content digest is already known
    fn detect(
        &self,
        path: &Path,
        digest: &ContentDigest,
        store: &HashStore,
        threshold: u32,
    ) -> Detection;

    /// Fingerprint to register when the candidate is filed
    fn fingerprint(&self, path: &Path) -> Option<Fingerprint>;
}

fn exact_match(store: &HashStore, digest: &ContentDigest) -> Option<DuplicateVerdict> {
    store
        .lookup_exact(digest)
        .map(|of| DuplicateVerdict::ExactDuplicate { of: of.to_string() })
}

/// Content digests only. Used when fingerprinting is unavailable or disabled.
#[derive(Debug, Default)]
pub struct ExactOnlyDetector;

impl DetectionStrategy for ExactOnlyDetector {
    fn name(&self) -> &'static str {
        "exact-only"
    }

    fn detect(
        &self,
        _path: &Path,
        digest: &ContentDigest,
        store: &HashStore,
        _threshold: u32,
    ) -> Detection {
        Detection {
            verdict: exact_match(store, digest).unwrap_or(DuplicateVerdict::NotDuplicate),
            fingerprint: FingerprintSlot::Computed(None),
        }
    }

    fn fingerprint(&self, _path: &Path) -> Option<Fingerprint> {
        None
    }
}

/// Content digests first, then nearest perceptual fingerprint.
pub struct ExactPlusPerceptualDetector {
    fingerprinter: Box<dyn Fingerprinter>,
}

impl ExactPlusPerceptualDetector {
    pub fn new(fingerprinter: Box<dyn Fingerprinter>) -> Self {
        Self { fingerprinter }
    }
}

impl DetectionStrategy for ExactPlusPerceptualDetector {
    fn name(&self) -> &'static str {
        "exact+perceptual"
    }

    fn detect(
        &self,
        path: &Path,
        digest: &ContentDigest,
        store: &HashStore,
        threshold: u32,
    ) -> Detection {
        if let Some(verdict) = exact_match(store, digest) {
            return Detection {
                verdict,
                fingerprint: FingerprintSlot::NotComputed,
            };
        }

        let fingerprint = self.fingerprint(path);
        let verdict = fingerprint
            .and_then(|fp| store.lookup_similar(&fp, threshold))
            .map(|hit| DuplicateVerdict::LikelyDuplicate {
                of: hit.relative_path,
                distance: hit.distance,
            })
            .unwrap_or(DuplicateVerdict::NotDuplicate);

        Detection {
            verdict,
            fingerprint: FingerprintSlot::Computed(fingerprint),
        }
    }

    fn fingerprint(&self, path: &Path) -> Option<Fingerprint> {
        match self.fingerprinter.fingerprint_file(path) {
            Ok(fp) => Some(fp),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "No fingerprint");
                None
            }
        }
    }
}

impl std::fmt::Debug for ExactPlusPerceptualDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExactPlusPerceptualDetector")
            .field("algorithm", &self.fingerprinter.algorithm())
            .finish()
    }
}
