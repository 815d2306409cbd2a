//! # Hasher Module
//!
//! Computes the two identities a photo has in the hash index:
//!
//! - **Content digest** - SHA-256 over the raw bytes, streamed in 8 KiB
//!   chunks. Equal digests mean byte-identical files.
//! - **Perceptual fingerprint** - a 64-bit code derived from an 8x8 view of
//!   the downsampled grayscale image. Near-identical images have a small
//!   Hamming distance between their fingerprints.
//!
//! ## Supported Fingerprints
//! - **pHash (Perceptual Hash)** - DCT-based, the default
//! - **dHash (Difference Hash)** - brightness gradients between neighbours
//!
//! Fingerprinting is optional. It needs the `perceptual` cargo feature and
//! a working decoder; [`check_fingerprinter`] checks both once at startup.
//!
//! ## Performance Optimizations
//! - Uses `zune-jpeg` for faster JPEG decoding
//! - Uses `fast_image_resize` for SIMD-accelerated downsampling
//!
//! ## Example
//! ```rust,ignore
//! use photo_sorter::core::hasher::{check_fingerprinter, ContentHasher, FingerprintAlgorithm};
//!
//! let digest = ContentHasher::new().digest_file(&path)?;
//! let fingerprinter = check_fingerprinter(FingerprintAlgorithm::Perceptual)?;
//! let fingerprint = fingerprinter.fingerprint_file(&path)?;
//! ```

#[cfg(feature = "perceptual")]
mod algorithms;
mod content;
#[cfg(feature = "perceptual")]
pub mod fast_decode;
#[cfg(feature = "perceptual")]
pub mod fast_resize;
mod traits;

#[cfg(feature = "perceptual")]
pub use algorithms::{DifferenceFingerprinter, ImageFingerprinter, PerceptualFingerprinter};
pub use content::{ContentHasher, DEFAULT_CHUNK_SIZE};
pub use traits::{ContentDigest, Fingerprint, FingerprintAlgorithm, Fingerprinter};

use crate::error::HashError;

/// Build the fingerprinter for `algorithm` and check that it actually works.
///
/// The check fingerprints a small synthetic image. Any failure, including a
/// build without the `perceptual` feature, comes back as
/// [`HashError::CapabilityUnavailable`] so the caller can fall back to
/// exact-only detection for the whole run.
#[cfg(feature = "perceptual")]
pub fn check_fingerprinter(
    algorithm: FingerprintAlgorithm,
) -> Result<Box<dyn Fingerprinter>, HashError> {
    use image::{DynamicImage, ImageBuffer, Rgb};

    let sample = DynamicImage::ImageRgb8(ImageBuffer::from_fn(64, 64, |x, y| {
        let v = ((x * 4 + y * 2) % 256) as u8;
        Rgb([v, v / 2, 255 - v])
    }));

    let unavailable = |e: HashError| HashError::CapabilityUnavailable {
        reason: format!("{} self-test failed: {}", algorithm, e),
    };

    match algorithm {
        FingerprintAlgorithm::Perceptual => {
            let fingerprinter = PerceptualFingerprinter::new();
            fingerprinter.fingerprint_image(&sample).map_err(unavailable)?;
            Ok(Box::new(fingerprinter))
        }
        FingerprintAlgorithm::Difference => {
            let fingerprinter = DifferenceFingerprinter::new();
            fingerprinter.fingerprint_image(&sample).map_err(unavailable)?;
            Ok(Box::new(fingerprinter))
        }
    }
}

/// Without the `perceptual` feature there is no decoder to check.
#[cfg(not(feature = "perceptual"))]
pub fn check_fingerprinter(
    algorithm: FingerprintAlgorithm,
) -> Result<Box<dyn Fingerprinter>, HashError> {
    Err(HashError::CapabilityUnavailable {
        reason: format!(
            "{} needs the `perceptual` feature, which this build does not include",
            algorithm
        ),
    })
}
