#![allow(dead_code)]

use chrono::{DateTime, TimeDelta, Utc};
use secman_cipher::{KEY_LEN, Key, SALT_LEN};
use secman_storage::{MemoryStorage, Storage, StorageError};
use secman_store::{FixedClock, Handler, HandlerOptions, SequentialIds};
use std::sync::Arc;

pub const PROFILE: &str = "default";

pub fn start() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

/// A key that skips Argon2.
pub fn key(byte: u8) -> Key {
    Key::from_parts(vec![byte; KEY_LEN], vec![byte; SALT_LEN])
}

pub fn storage_key() -> Key {
    key(0xA0)
}

pub fn value_key() -> Key {
    key(0x01)
}

pub fn options(clock: &Arc<FixedClock>) -> HandlerOptions {
    HandlerOptions {
        clock: clock.clone(),
        ids: Arc::new(SequentialIds::new()),
        ..HandlerOptions::default()
    }
}

pub fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::stepping(start(), TimeDelta::seconds(1)))
}

/// A handler over a fresh shared memory storage.
pub fn handler() -> (Handler, MemoryStorage) {
    let storage = MemoryStorage::new();
    let handler = Handler::new(
        PROFILE,
        storage_key(),
        value_key(),
        Box::new(storage.clone()),
        options(&clock()),
    )
    .unwrap();
    (handler, storage)
}

/// A backend that accepts reads but rejects every write.
#[derive(Debug, Default)]
pub struct ReadOnlyStorage;

impl Storage for ReadOnlyStorage {
    fn save(&self, _data: &[u8]) -> Result<(), StorageError> {
        Err(StorageError::Io {
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            context: None,
        })
    }

    fn load(&self) -> Result<Vec<u8>, StorageError> {
        Err(StorageError::SourceNotFound { message: "empty".into(), context: None })
    }

    fn updated(&self) -> Result<DateTime<Utc>, StorageError> {
        Ok(DateTime::UNIX_EPOCH)
    }
}
