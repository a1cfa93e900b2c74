use crate::error::StorageError;
use chrono::{DateTime, Utc};
use std::fmt::Debug;

/// A persistence target for one opaque, already encrypted blob.
///
/// Implementations never interpret the bytes they hold.
pub trait Storage: Debug + Send + Sync {
    /// Replaces the stored blob with `data`.
    ///
    /// # Errors
    /// Returns [`StorageError::Io`] or a backend specific error if the blob cannot be written.
    fn save(&self, data: &[u8]) -> Result<(), StorageError>;

    /// Returns the stored blob.
    ///
    /// # Errors
    /// Returns [`StorageError::SourceNotFound`] if nothing has been stored yet.
    fn load(&self) -> Result<Vec<u8>, StorageError>;

    /// Returns the backend's last-modified marker.
    ///
    /// A backend that holds no data reports the Unix epoch, so any stored copy is newer.
    ///
    /// # Errors
    /// Returns an error only if the marker exists but cannot be read.
    fn updated(&self) -> Result<DateTime<Utc>, StorageError>;
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn save(&self, data: &[u8]) -> Result<(), StorageError> {
        (**self).save(data)
    }

    fn load(&self) -> Result<Vec<u8>, StorageError> {
        (**self).load()
    }

    fn updated(&self) -> Result<DateTime<Utc>, StorageError> {
        (**self).updated()
    }
}
