//! Blob storage backends for the secman store.
//!
//! The store never hands a backend anything but an encrypted blob, so a backend only
//! has to save, load and report when it was last written.
//!
//! # Backends
//!
//! - **[`FileStorage`]**: one file on the local filesystem. Writes use an atomic swap
//!   (unique temp write + `fsync` + `rename`), so a crash never leaves a torn blob.
//!   Orphaned temporary files are cleaned up when the storage is opened.
//! - **[`MemoryStorage`]**: a shared in-memory blob, handy as a secondary backend or
//!   in tests.
//!
//! Both implement the [`Storage`] contract. A backend that holds nothing yet reports
//! [`StorageError::SourceNotFound`] on load and the Unix epoch as its last update.
//!
//! # Examples
//!
//! ```rust
//! use secman_storage::{FileStorage, MemoryStorage, Storage, StorageError};
//!
//! # fn main() -> Result<(), StorageError> {
//! # let tmp = tempfile::tempdir().unwrap();
//! let primary = FileStorage::builder()
//!     .path(tmp.path().join("default").join("collection"))
//!     .create(true)
//!     .open()?;
//! let secondary = MemoryStorage::new();
//!
//! primary.save(b"sealed")?;
//! secondary.save(&primary.load()?)?;
//!
//! assert_eq!(secondary.load()?, b"sealed");
//! # Ok(())
//! # }
//! ```

mod backend;
mod builder;
mod error;
mod file;
mod maintenance;
mod memory;

pub use backend::Storage;
pub use builder::{FileStorageBuilder, NoPath, WithPath};
pub use error::{StorageError, StorageErrorExt};
pub use file::FileStorage;
pub use memory::MemoryStorage;
