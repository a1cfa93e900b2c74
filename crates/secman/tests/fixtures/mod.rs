use secman::cipher::{KEY_LEN, Key, SALT_LEN};
use secman::config::SecmanConfig;
use std::path::Path;

pub fn key(byte: u8) -> Key {
    Key::from_parts(vec![byte; KEY_LEN], vec![byte; SALT_LEN])
}

/// A config whose collection files live under `dir`.
pub fn config_in(dir: &Path) -> SecmanConfig {
    let mut config = SecmanConfig::default();
    config.profile_id = "work".into();
    config.storage.dir = dir.to_path_buf();
    config
}
