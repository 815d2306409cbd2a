//! Streaming SHA-256 content digests for exact duplicate detection.

use super::traits::ContentDigest;
use crate::error::HashError;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Default read size; files are never loaded whole
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

/// Computes content digests by streaming a file in fixed-size chunks.
#[derive(Debug, Clone)]
pub struct ContentHasher {
    chunk_size: usize,
}

impl ContentHasher {
    pub fn new() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Override the chunk size (minimum 1 byte)
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Digest a file's full contents
    pub fn digest_file(&self, path: &Path) -> Result<ContentDigest, HashError> {
        let io_error = |source| HashError::Io {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(io_error)?;
        let mut reader = BufReader::new(file);
        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; self.chunk_size];

        loop {
            let bytes_read = reader.read(&mut buffer).map_err(io_error)?;
            if bytes_read == 0 {
                break;
            }
            hasher.update(&buffer[..bytes_read]);
        }

        Ok(ContentDigest::from_bytes(hasher.finalize().into()))
    }
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self::new()
    }
}
