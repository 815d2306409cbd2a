//! Index backend trait definition.

use super::PhotoRecord;
use crate::error::StoreError;

/// Persisted form of the hash index.
///
/// Backends load and save the whole index at once. `load` returns records
/// in insertion order; `persist` must replace the previous contents
/// atomically.
pub trait IndexBackend: Send + Sync {
    /// Read every record. A backend with nothing stored yet returns an
    /// empty list; unreadable stored data is an error, never an empty list.
    fn load(&self) -> Result<Vec<PhotoRecord>, StoreError>;

    /// Replace the stored index with `records`
    fn persist(&self, records: &[PhotoRecord]) -> Result<(), StoreError>;

    /// Human-readable location, for logs
    fn location(&self) -> String;
}

impl<T: IndexBackend + ?Sized> IndexBackend for std::sync::Arc<T> {
    fn load(&self) -> Result<Vec<PhotoRecord>, StoreError> {
        (**self).load()
    }

    fn persist(&self, records: &[PhotoRecord]) -> Result<(), StoreError> {
        (**self).persist(records)
    }

    fn location(&self) -> String {
        (**self).location()
    }
}
