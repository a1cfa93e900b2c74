pub mod fixtures;

use chrono::DateTime;
use fixtures::temp_storage;
use secman_storage::*;
use tempfile::TempDir;

#[test]
fn test_missing_file_is_source_not_found() {
    let t = temp_storage();

    let err = t.storage.load().unwrap_err();
    assert!(err.is_source_not_found(), "unexpected error: {err}");
    assert_eq!(t.storage.updated().unwrap(), DateTime::UNIX_EPOCH);
}

#[test]
fn test_save_load_roundtrip() {
    let t = temp_storage();

    t.storage.save(b"first").unwrap();
    assert_eq!(t.storage.load().unwrap(), b"first");

    t.storage.save(b"second, longer blob").unwrap();
    assert_eq!(t.storage.load().unwrap(), b"second, longer blob");
    assert!(t.storage.updated().unwrap() > DateTime::UNIX_EPOCH);
}

#[test]
fn test_save_leaves_no_temp_files() {
    let t = temp_storage();
    t.storage.save(b"blob").unwrap();

    let parent = t.file().parent().unwrap().to_path_buf();
    let names: Vec<String> = std::fs::read_dir(parent)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["collection".to_string()]);
}

#[test]
fn test_save_recreates_missing_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("a").join("b").join("collection");
    let storage = FileStorage::builder().path(&path).create(false).open().unwrap();

    assert!(!path.parent().unwrap().exists());
    storage.save(b"blob").unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), b"blob");
}

#[cfg(unix)]
#[test]
fn test_file_is_private_to_owner() {
    use std::os::unix::fs::PermissionsExt;

    let t = temp_storage();
    t.storage.save(b"blob").unwrap();

    let mode = std::fs::metadata(t.file()).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn test_open_purges_only_stale_temp_files() {
    let dir = TempDir::new().unwrap();
    let fresh = dir.path().join("collection.sectmp.1.0");
    std::fs::write(&fresh, b"in flight").unwrap();

    FileStorage::open(dir.path().join("collection")).unwrap();

    assert!(fresh.exists(), "fresh temp files may belong to a concurrent writer");
}

#[test]
fn test_directory_as_path_is_io_error() {
    let dir = TempDir::new().unwrap();
    let storage = FileStorage::open(dir.path().join("collection")).unwrap();
    std::fs::create_dir(storage.path()).unwrap();

    assert!(matches!(storage.load(), Err(StorageError::Io { .. })));
}

#[test]
fn test_boxed_storage_delegates() {
    let memory = MemoryStorage::new();
    let boxed: Box<dyn Storage> = Box::new(memory.clone());

    boxed.save(b"via box").unwrap();
    assert_eq!(memory.load().unwrap(), b"via box");
    assert_eq!(boxed.updated().unwrap(), memory.updated().unwrap());
}
