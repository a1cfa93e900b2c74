//! Single-file storage backend with atomic replacement.

use crate::backend::Storage;
use crate::builder::FileStorageBuilder;
use crate::error::{StorageError, StorageErrorExt};
use crate::maintenance::TMP_MARKER;
use chrono::{DateTime, Utc};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// Stores the blob in a single file on the local filesystem.
///
/// Writes use an "atomic swap": the blob goes to a unique temporary file beside the
/// target, is synced to disk and then renamed over the target. A crash mid-write
/// leaves either the old or the new blob in place, never a torn file. On unix the
/// file is created with mode `0600`.
///
/// # Example
///
/// ```rust
/// use secman_storage::{FileStorage, Storage, StorageError};
///
/// # fn main() -> Result<(), StorageError> {
/// # let tmp = tempfile::tempdir().unwrap();
/// let storage = FileStorage::builder().path(tmp.path().join("profile/collection")).open()?;
///
/// assert!(storage.load().unwrap_err().is_source_not_found());
///
/// storage.save(b"sealed blob")?;
/// assert_eq!(storage.load()?, b"sealed blob");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    tmp_counter: AtomicU64,
}

impl FileStorage {
    #[must_use = "The storage is not opened until you call .open()"]
    pub fn builder() -> FileStorageBuilder {
        FileStorageBuilder::new()
    }

    /// Opens a file storage with the default options.
    ///
    /// # Errors
    /// Returns [`StorageError::Io`] if the parent directory cannot be created.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        Self::builder().path(path).open()
    }

    pub(crate) const fn new(path: PathBuf) -> Self {
        Self { path, tmp_counter: AtomicU64::new(0) }
    }

    /// Returns the path of the file holding the blob.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent(&self) -> Option<&Path> {
        self.path.parent().filter(|p| !p.as_os_str().is_empty())
    }

    fn write_tmp(temp: &Path, data: &[u8]) -> Result<(), StorageError> {
        let mut options = fs::OpenOptions::new();
        options.create_new(true).write(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options
            .open(temp)
            .context(format!("Temp creation failed: {}", temp.display()))?;
        file.write_all(data).context("Write failed")?;
        file.sync_all().context("Hardware sync failed")?;
        Ok(())
    }

    fn swap(&self, temp: &Path) -> Result<(), StorageError> {
        match fs::rename(temp, &self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                fs::remove_file(&self.path).context(format!(
                    "Failed to replace existing file: {}",
                    self.path.display()
                ))?;
                fs::rename(temp, &self.path).context(format!(
                    "Atomic swap failed: {} -> {}",
                    temp.display(),
                    self.path.display()
                ))
            },
            Err(err) => Err(StorageError::Io {
                source: err,
                context: Some(
                    format!("Atomic swap failed: {} -> {}", temp.display(), self.path.display())
                        .into(),
                ),
            }),
        }
    }

    fn sync_dir(path: &Path) {
        match fs::File::open(path) {
            Ok(dir) => {
                if let Err(err) = dir.sync_all() {
                    warn!(path = %path.display(), error = %err, "Directory sync failed");
                }
            },
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Directory open failed");
            },
        }
    }
}

impl Storage for FileStorage {
    fn save(&self, data: &[u8]) -> Result<(), StorageError> {
        if let Some(parent) = self.parent() {
            fs::create_dir_all(parent)
                .context(format!("Failed to create directory for {}", self.path.display()))?;
        }

        let temp = unique_tmp_path(&self.path, &self.tmp_counter);
        let written = Self::write_tmp(&temp, data).and_then(|()| self.swap(&temp));
        if written.is_err() {
            let _ = fs::remove_file(&temp);
        }
        written?;

        if let Some(parent) = self.parent() {
            Self::sync_dir(parent);
        }

        debug!(path = %self.path.display(), bytes = data.len(), "Blob saved atomically");
        Ok(())
    }

    fn load(&self) -> Result<Vec<u8>, StorageError> {
        match fs::read(&self.path) {
            Ok(data) => Ok(data),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(StorageError::SourceNotFound {
                message: self.path.display().to_string().into(),
                context: None,
            }),
            Err(err) => Err(StorageError::Io {
                source: err,
                context: Some(format!("Read failed: {}", self.path.display()).into()),
            }),
        }
    }

    fn updated(&self) -> Result<DateTime<Utc>, StorageError> {
        let meta = match fs::metadata(&self.path) {
            Ok(meta) => meta,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(DateTime::UNIX_EPOCH),
            Err(err) => {
                return Err(StorageError::Io {
                    source: err,
                    context: Some(format!("Failed to get metadata: {}", self.path.display()).into()),
                });
            },
        };
        let modified = meta
            .modified()
            .context(format!("Modification time unavailable: {}", self.path.display()))?;
        Ok(DateTime::<Utc>::from(modified))
    }
}

fn unique_tmp_path(target: &Path, counter: &AtomicU64) -> PathBuf {
    let counter = counter.fetch_add(1, Ordering::Relaxed);
    let file_name = target.file_name().and_then(|s| s.to_str()).unwrap_or("storage");
    let tmp_name = format!("{file_name}{TMP_MARKER}{}.{counter}", std::process::id());
    target.with_file_name(tmp_name)
}
