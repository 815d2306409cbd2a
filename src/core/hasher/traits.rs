//! Digest and fingerprint value types, and the fingerprinting trait.

use crate::error::HashError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// A 256-bit SHA-256 digest of a file's full contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex, 64 characters
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Parse the 64-character hex form stored in the hash index
    pub fn from_hex(value: &str) -> Result<Self, HashError> {
        let invalid = || HashError::InvalidHex {
            kind: "sha256",
            value: value.to_string(),
        };

        if value.len() != 64 || !value.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let mut bytes = [0u8; 32];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&value[i * 2..i * 2 + 2], 16).map_err(|_| invalid())?;
        }
        Ok(Self(bytes))
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// A 64-bit perceptual fingerprint (8x8 grid, one bit per cell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Number of bits in a fingerprint; the upper bound for any distance
    pub const BITS: u32 = 64;

    pub fn new(bits: u64) -> Self {
        Self(bits)
    }

    pub fn bits(&self) -> u64 {
        self.0
    }

    /// Hamming distance: the number of differing bits.
    pub fn distance(&self, other: &Fingerprint) -> u32 {
        (self.0 ^ other.0).count_ones()
    }

    /// Similarity as a percentage (0-100)
    pub fn similarity(&self, other: &Fingerprint) -> f64 {
        (1.0 - self.distance(other) as f64 / Self::BITS as f64) * 100.0
    }

    /// Lowercase hex, 16 characters
    pub fn to_hex(&self) -> String {
        format!("{:016x}", self.0)
    }

    pub fn from_hex(value: &str) -> Result<Self, HashError> {
        if value.len() != 16 || !value.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(HashError::InvalidHex {
                kind: "phash",
                value: value.to_string(),
            });
        }
        u64::from_str_radix(value, 16)
            .map(Self)
            .map_err(|_| HashError::InvalidHex {
                kind: "phash",
                value: value.to_string(),
            })
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Available fingerprint transforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FingerprintAlgorithm {
    /// DCT-based perceptual hash (pHash)
    #[default]
    Perceptual,
    /// Difference hash (dHash), brightness gradients between neighbours
    Difference,
}

impl FingerprintAlgorithm {
    pub fn description(&self) -> &'static str {
        match self {
            FingerprintAlgorithm::Perceptual => {
                "Perceptual Hash (pHash) - DCT-based, robust to resizing and re-encoding"
            }
            FingerprintAlgorithm::Difference => {
                "Difference Hash (dHash) - Compares brightness gradients between pixels"
            }
        }
    }
}

impl fmt::Display for FingerprintAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FingerprintAlgorithm::Perceptual => write!(f, "pHash"),
            FingerprintAlgorithm::Difference => write!(f, "dHash"),
        }
    }
}

/// Computes perceptual fingerprints for image files.
///
/// A file the decoder cannot parse yields an error; callers treat that as
/// "no fingerprint for this file", never as a hard failure.
pub trait Fingerprinter: Send + Sync {
    fn fingerprint_file(&self, path: &Path) -> Result<Fingerprint, HashError>;

    fn algorithm(&self) -> FingerprintAlgorithm;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_to_self_is_zero() {
        let fp = Fingerprint::new(0xF0F0_1234_ABCD_0001);
        assert_eq!(fp.distance(&fp), 0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Fingerprint::new(0xFF00_FF00_FF00_FF00);
        let b = Fingerprint::new(0x0F0F_0F0F_0F0F_0F0F);
        assert_eq!(a.distance(&b), b.distance(&a));
    }

    #[test]
    fn distance_counts_differing_bits() {
        let a = Fingerprint::new(0);
        let b = Fingerprint::new(0b1011);
        assert_eq!(a.distance(&b), 3);
        assert_eq!(a.distance(&Fingerprint::new(u64::MAX)), 64);
    }

    #[test]
    fn similarity_is_100_for_identical() {
        let fp = Fingerprint::new(42);
        assert_eq!(fp.similarity(&fp), 100.0);
    }

    #[test]
    fn fingerprint_hex_is_sixteen_chars() {
        let fp = Fingerprint::new(0xDEAD_BEEF);
        assert_eq!(fp.to_hex(), "00000000deadbeef");
        assert_eq!(Fingerprint::from_hex("00000000deadbeef").unwrap(), fp);
    }

    #[test]
    fn fingerprint_rejects_bad_hex() {
        assert!(Fingerprint::from_hex("xyz").is_err());
        assert!(Fingerprint::from_hex("zzzzzzzzzzzzzzzz").is_err());
    }

    #[test]
    fn digest_hex_parses_back() {
        let digest = ContentDigest::from_bytes([0xAB; 32]);
        let hex = digest.to_hex();
        assert_eq!(hex.len(), 64);
        assert_eq!(ContentDigest::from_hex(&hex).unwrap(), digest);
    }

    #[test]
    fn digest_rejects_wrong_length() {
        assert!(ContentDigest::from_hex("abcd").is_err());
        assert!(ContentDigest::from_hex(&"g".repeat(64)).is_err());
    }

    #[test]
    fn algorithm_display() {
        assert_eq!(FingerprintAlgorithm::Perceptual.to_string(), "pHash");
        assert_eq!(FingerprintAlgorithm::Difference.to_string(), "dHash");
    }
}
