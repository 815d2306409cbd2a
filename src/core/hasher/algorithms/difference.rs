//! Difference Hash (dHash) implementation.
//!
//! dHash works by:
//! 1. Resizing the image to 9x8 grayscale
//! 2. Comparing each pixel to the one to its right
//! 3. Setting the bit when the left pixel is brighter
//!
//! This captures the relative gradient of brightness changes.

use super::super::fast_resize::resize_to_grayscale;
use super::{fingerprint_decoded, ImageFingerprinter};
use crate::core::hasher::traits::{Fingerprint, FingerprintAlgorithm, Fingerprinter};
use crate::error::HashError;
use image::DynamicImage;
use std::path::Path;

const GRID: u32 = 8;

/// Gradient-based 64-bit fingerprint
#[derive(Debug, Default)]
pub struct DifferenceFingerprinter;

impl DifferenceFingerprinter {
    pub fn new() -> Self {
        Self
    }
}

impl Fingerprinter for DifferenceFingerprinter {
    fn fingerprint_file(&self, path: &Path) -> Result<Fingerprint, HashError> {
        fingerprint_decoded(self, path)
    }

    fn algorithm(&self) -> FingerprintAlgorithm {
        FingerprintAlgorithm::Difference
    }
}

impl ImageFingerprinter for DifferenceFingerprinter {
    fn fingerprint_image(&self, image: &DynamicImage) -> Result<Fingerprint, HashError> {
        // One extra column so every cell has a right-hand neighbour
        let gray = resize_to_grayscale(image, GRID + 1, GRID)?;

        let mut bits = 0u64;
        for y in 0..GRID {
            for x in 0..GRID {
                bits <<= 1;
                if gray.get_pixel(x, y)[0] > gray.get_pixel(x + 1, y)[0] {
                    bits |= 1;
                }
            }
        }

        Ok(Fingerprint::new(bits))
    }
}
