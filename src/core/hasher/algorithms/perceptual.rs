//! Perceptual Hash (pHash) implementation.
//!
//! pHash runs a Discrete Cosine Transform over a downsampled grayscale
//! image and keeps the low-frequency 8x8 block, which makes it robust to:
//! - Scaling
//! - Re-encoding and compression artifacts
//! - Brightness/contrast changes
//! - Minor crops and edits
//!
//! We use the image_hasher crate's well-tested DCT pipeline.

use super::{fingerprint_decoded, ImageFingerprinter};
use crate::core::hasher::traits::{Fingerprint, FingerprintAlgorithm, Fingerprinter};
use crate::error::HashError;
use image::DynamicImage;
use image_hasher::{HashAlg, HasherConfig};
use std::path::{Path, PathBuf};

/// DCT-based 64-bit perceptual fingerprint
pub struct PerceptualFingerprinter {
    hasher: image_hasher::Hasher,
}

impl PerceptualFingerprinter {
    pub fn new() -> Self {
        let hasher = HasherConfig::new()
            .hash_size(8, 8)
            .hash_alg(HashAlg::Mean)
            .preproc_dct()
            .to_hasher();

        Self { hasher }
    }
}

impl Default for PerceptualFingerprinter {
    fn default() -> Self {
        Self::new()
    }
}

impl Fingerprinter for PerceptualFingerprinter {
    fn fingerprint_file(&self, path: &Path) -> Result<Fingerprint, HashError> {
        fingerprint_decoded(self, path)
    }

    fn algorithm(&self) -> FingerprintAlgorithm {
        FingerprintAlgorithm::Perceptual
    }
}

impl ImageFingerprinter for PerceptualFingerprinter {
    fn fingerprint_image(&self, image: &DynamicImage) -> Result<Fingerprint, HashError> {
        let hash = self.hasher.hash_image(image);
        let bytes: [u8; 8] = hash.as_bytes().try_into().map_err(|_| HashError::DecodeError {
            path: PathBuf::new(),
            reason: format!("expected a 64-bit hash, got {} bytes", hash.as_bytes().len()),
        })?;

        Ok(Fingerprint::new(u64::from_be_bytes(bytes)))
    }
}
