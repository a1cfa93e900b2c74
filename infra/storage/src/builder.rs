use crate::error::{StorageError, StorageErrorExt};
use crate::file::FileStorage;
use crate::maintenance;
use private::Sealed;
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone)]
struct FileStorageConfig {
    create: bool,
    purge_stale: bool,
}

impl Default for FileStorageConfig {
    fn default() -> Self {
        Self { create: true, purge_stale: true }
    }
}

#[derive(Debug, Default)]
pub struct NoPath;
#[derive(Debug)]
pub struct WithPath(PathBuf);

mod private {
    pub(super) trait Sealed {}
}
impl Sealed for NoPath {}
impl Sealed for WithPath {}

#[allow(private_bounds)]
#[derive(Debug, Default)]
pub struct FileStorageBuilder<S: Sealed = NoPath> {
    state: S,
    config: FileStorageConfig,
}

#[allow(private_bounds)]
impl<S: Sealed> FileStorageBuilder<S> {
    #[must_use = "Sets whether the parent directory should be created if it does not exist"]
    pub const fn create(mut self, enable: bool) -> Self {
        self.config.create = enable;
        self
    }

    #[must_use = "Sets whether stale temporary files are removed when the storage is opened"]
    pub const fn purge_stale(mut self, enable: bool) -> Self {
        self.config.purge_stale = enable;
        self
    }

    fn transition<N: Sealed>(self, state: N) -> FileStorageBuilder<N> {
        FileStorageBuilder { state, config: self.config }
    }
}

impl FileStorageBuilder<NoPath> {
    #[must_use = "Creates a new file storage builder with default configuration"]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "Sets the file that holds the stored blob"]
    pub fn path(self, path: impl Into<PathBuf>) -> FileStorageBuilder<WithPath> {
        self.transition(WithPath(path.into()))
    }
}

impl FileStorageBuilder<WithPath> {
    /// Consumes the configuration and opens the file storage.
    ///
    /// The target file itself does not need to exist; the first save creates it.
    /// Opening does the following:
    /// 1. Creates the parent directory if `create(true)` was set.
    /// 2. Removes temporary files older than five minutes that earlier interrupted
    ///    saves left beside the target. Cleanup failures are logged and ignored.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the parent directory cannot be created.
    pub fn open(self) -> Result<FileStorage, StorageError> {
        let path = self.state.0;

        if path.file_name().is_none() {
            return Err(StorageError::Internal {
                message: format!("Storage path has no file name: {}", path.display()).into(),
                context: None,
            });
        }

        let parent = path.parent().filter(|p| !p.as_os_str().is_empty()).map(PathBuf::from);

        if self.config.create
            && let Some(dir) = &parent
        {
            fs::create_dir_all(dir)
                .context(format!("Failed to bootstrap storage directory: {}", dir.display()))?;
            info!(path = %dir.display(), "Bootstrapped storage directory");
        }

        if self.config.purge_stale
            && let Some(dir) = &parent
            && dir.is_dir()
        {
            maintenance::purge_tmp(dir);
        }

        Ok(FileStorage::new(path))
    }
}
