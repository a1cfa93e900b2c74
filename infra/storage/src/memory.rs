use crate::backend::Storage;
use crate::error::StorageError;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Slot {
    data: Option<Vec<u8>>,
    updated: Option<DateTime<Utc>>,
}

/// An in-memory blob shared by every clone of the handle.
///
/// Useful as a secondary backend in tests or for ephemeral stores. The
/// last-modified marker is set to the current time on every save and can be
/// overridden with [`MemoryStorage::set_updated`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<Slot>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the last-modified marker.
    pub fn set_updated(&self, updated: DateTime<Utc>) {
        self.inner.lock().updated = Some(updated);
    }

    /// Returns a copy of the stored blob, if any.
    #[must_use]
    pub fn snapshot(&self) -> Option<Vec<u8>> {
        self.inner.lock().data.clone()
    }
}

impl Storage for MemoryStorage {
    fn save(&self, data: &[u8]) -> Result<(), StorageError> {
        let mut slot = self.inner.lock();
        slot.data = Some(data.to_vec());
        slot.updated = Some(Utc::now());
        Ok(())
    }

    fn load(&self) -> Result<Vec<u8>, StorageError> {
        self.inner.lock().data.clone().ok_or_else(|| StorageError::SourceNotFound {
            message: "memory storage is empty".into(),
            context: None,
        })
    }

    fn updated(&self) -> Result<DateTime<Utc>, StorageError> {
        Ok(self.inner.lock().updated.unwrap_or(DateTime::UNIX_EPOCH))
    }
}
