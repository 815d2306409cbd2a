//! Fingerprint transform implementations.

mod difference;
mod perceptual;

pub use difference::DifferenceFingerprinter;
pub use perceptual::PerceptualFingerprinter;

use super::fast_decode::FastDecoder;
use super::traits::{Fingerprint, Fingerprinter};
use crate::error::HashError;
use image::DynamicImage;
use std::path::Path;

/// A fingerprinter that works on decoded images.
pub trait ImageFingerprinter: Fingerprinter {
    fn fingerprint_image(&self, image: &DynamicImage) -> Result<Fingerprint, HashError>;
}

/// Decode with the fast decoder, then fingerprint.
pub(crate) fn fingerprint_decoded<F: ImageFingerprinter + ?Sized>(
    fingerprinter: &F,
    path: &Path,
) -> Result<Fingerprint, HashError> {
    let image = FastDecoder::decode(path)?;
    fingerprinter.fingerprint_image(&image)
}
