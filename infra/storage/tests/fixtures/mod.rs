use secman_storage::FileStorage;
use std::path::PathBuf;
use tempfile::TempDir;

/// A file storage rooted in its own temporary directory.
pub struct TempStorage {
    pub dir: TempDir,
    pub storage: FileStorage,
}

impl TempStorage {
    pub fn file(&self) -> PathBuf {
        self.storage.path().to_path_buf()
    }
}

pub fn temp_storage() -> TempStorage {
    let dir = TempDir::new().unwrap();
    let storage = FileStorage::open(dir.path().join("profile").join("collection")).unwrap();
    TempStorage { dir, storage }
}
