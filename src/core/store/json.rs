//! JSON file backend for the hash index.
//!
//! File shape:
//!
//! ```json
//! {
//!   "Event1/beach.jpg": { "sha256": "<64 hex>", "phash": "<16 hex>" },
//!   "Event2/cake.png":  { "sha256": "<64 hex>" }
//! }
//! ```
//!
//! Object order is insertion order and is preserved across reloads.

use super::{IndexBackend, PhotoRecord};
use crate::core::hasher::{ContentDigest, Fingerprint};
use crate::core::persist::write_atomic;
use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize)]
struct IndexValue {
    sha256: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    phash: Option<String>,
}

/// Hash index stored as a single JSON object on disk
#[derive(Debug, Clone)]
pub struct JsonIndexFile {
    path: PathBuf,
}

impl JsonIndexFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn corrupt(&self, reason: impl Into<String>) -> StoreError {
        StoreError::CorruptIndex {
            path: self.path.clone(),
            reason: reason.into(),
        }
    }

    fn parse_entry(&self, key: String, value: Value) -> Result<PhotoRecord, StoreError> {
        let entry: IndexValue = serde_json::from_value(value)
            .map_err(|e| self.corrupt(format!("entry '{}': {}", key, e)))?;

        let digest = ContentDigest::from_hex(&entry.sha256)
            .map_err(|e| self.corrupt(format!("entry '{}': {}", key, e)))?;
        let fingerprint = entry
            .phash
            .as_deref()
            .map(Fingerprint::from_hex)
            .transpose()
            .map_err(|e| self.corrupt(format!("entry '{}': {}", key, e)))?;

        Ok(PhotoRecord {
            relative_path: key,
            digest,
            fingerprint,
        })
    }
}

impl IndexBackend for JsonIndexFile {
    fn load(&self) -> Result<Vec<PhotoRecord>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let root: Value =
            serde_json::from_str(&text).map_err(|e| self.corrupt(e.to_string()))?;
        let Value::Object(entries) = root else {
            return Err(self.corrupt("top level is not a JSON object"));
        };

        entries
            .into_iter()
            .map(|(key, value)| self.parse_entry(key, value))
            .collect()
    }

    fn persist(&self, records: &[PhotoRecord]) -> Result<(), StoreError> {
        let mut entries = Map::with_capacity(records.len());
        for record in records {
            let value = IndexValue {
                sha256: record.digest.to_hex(),
                phash: record.fingerprint.map(|f| f.to_hex()),
            };
            let value = serde_json::to_value(value)
                .map_err(|e| StoreError::SerializationFailed(e.to_string()))?;
            entries.insert(record.relative_path.clone(), value);
        }

        let mut json = serde_json::to_vec_pretty(&Value::Object(entries))
            .map_err(|e| StoreError::SerializationFailed(e.to_string()))?;
        json.push(b'\n');

        write_atomic(&self.path, &json).map_err(|e| StoreError::Io {
            path: self.path.clone(),
            source: e,
        })
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
