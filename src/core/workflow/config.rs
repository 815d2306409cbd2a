//! Sorting configuration.

use crate::core::folders::validate_folder_name;
use crate::core::hasher::{Fingerprint, FingerprintAlgorithm};
use crate::core::resolver::DEFAULT_THRESHOLD;
use crate::core::workspace::DEFAULT_DUPLICATES_FOLDER;
use crate::error::SorterError;

/// What to do when the saved session cannot be parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorruptStatePolicy {
    /// Stop with an error; nothing is touched
    #[default]
    Abort,
    /// Warn, discard the saved session and start from the first photo
    StartOver,
}

/// Configuration for a sorting session
#[derive(Debug, Clone)]
pub struct SortConfig {
    /// Maximum Hamming distance for a likely duplicate (lower = stricter)
    pub threshold: u32,
    /// Route detected duplicates without asking
    pub auto_duplicates: bool,
    /// Fingerprint transform for likely-duplicate detection
    pub algorithm: FingerprintAlgorithm,
    /// Only detect byte-identical duplicates
    pub exact_only: bool,
    /// Show each photo in the system viewer
    pub preview: bool,
    /// Handling of an unparsable saved session
    pub corrupt_state: CorruptStatePolicy,
    /// Folder that receives duplicates
    pub duplicates_folder: String,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            auto_duplicates: true,
            algorithm: FingerprintAlgorithm::default(),
            exact_only: false,
            preview: true,
            corrupt_state: CorruptStatePolicy::default(),
            duplicates_folder: DEFAULT_DUPLICATES_FOLDER.to_string(),
        }
    }
}

impl SortConfig {
    pub fn validate(&self) -> Result<(), SorterError> {
        if self.threshold > Fingerprint::BITS {
            return Err(SorterError::Config(format!(
                "threshold must be between 0 and {}, got {}",
                Fingerprint::BITS,
                self.threshold
            )));
        }

        validate_folder_name(&self.duplicates_folder)
            .map_err(|e| SorterError::Config(format!("duplicates folder: {}", e)))?;

        Ok(())
    }
}
