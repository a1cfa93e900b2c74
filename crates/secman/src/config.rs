//! Layered configuration: a config file overlaid with `SECMAN__` environment variables.

use crate::error::{ConfigError, ConfigErrorExt};
use config::{Config, Environment, File, Map};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

const DEFAULT_DIR: &str = ".secman";
const COLLECTIONS_DIR: &str = "collections";
const STORAGE_FILE_SUFFIX: &str = "sec";

/// Top-level configuration of one profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SecmanConfig {
    pub profile_id: String,
    pub storage: StorageConfig,
    pub log: LogConfig,
}

impl Default for SecmanConfig {
    fn default() -> Self {
        Self {
            profile_id: "default".into(),
            storage: StorageConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl SecmanConfig {
    /// The primary collection file.
    ///
    /// An explicit `storage.path` wins; otherwise the file is
    /// `<storage.dir>/collections/<profile_id>.sec`.
    #[must_use]
    pub fn storage_path(&self) -> PathBuf {
        self.storage.path.clone().unwrap_or_else(|| {
            self.storage
                .dir
                .join(COLLECTIONS_DIR)
                .join(format!("{}.{STORAGE_FILE_SUFFIX}", self.profile_id))
        })
    }
}

/// Where collections are kept.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub dir: PathBuf,
    pub path: Option<PathBuf>,
    /// A second copy reconciled by `Handler::sync`.
    pub secondary_path: Option<PathBuf>,
    /// Load the stored collection when the handler is opened.
    pub load_existing: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { dir: PathBuf::from(DEFAULT_DIR), path: None, secondary_path: None, load_existing: true }
    }
}

/// Logging settings for binaries.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    /// Directory for rolling log files. Console only when unset.
    pub path: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: "info".into(), path: None }
    }
}

/// Loads a [`SecmanConfig`] from `path` with environment overrides.
///
/// 1. **Base File**: any format the `config` crate detects from the extension. Without
///    a path only the environment and the defaults apply.
/// 2. **Environment Overrides**: variables prefixed with `SECMAN__`, nested with `__`
///    (e.g. `SECMAN__STORAGE__SECONDARY_PATH` maps to `storage.secondary_path`).
///
/// # Errors
/// Returns [`ConfigError::Config`] if the file is missing or a value does not fit.
///
/// # Example
/// ```rust
/// use secman::config::load_config;
///
/// let config = load_config(None::<&str>).unwrap();
/// assert!(config.storage.load_existing);
/// ```
pub fn load_config(path: Option<impl AsRef<Path>>) -> Result<SecmanConfig, ConfigError> {
    build(path.as_ref().map(AsRef::as_ref), None)
}

/// `env` replaces the process environment when set.
fn build(path: Option<&Path>, env: Option<Map<String, String>>) -> Result<SecmanConfig, ConfigError> {
    let mut builder = Config::builder();

    if let Some(path) = path {
        info!(path = %path.display(), "Loading config");
        builder = builder.add_source(File::from(path).required(true));
    }

    builder
        .add_source(
            Environment::with_prefix("SECMAN")
                .prefix_separator("__")
                .separator("__")
                .convert_case(config::Case::Snake)
                .try_parsing(true)
                .source(env),
        )
        .build()
        .context("Failed to build config")?
        .try_deserialize::<SecmanConfig>()
        .context("Failed to deserialize config")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SecmanConfig::default();

        assert_eq!(config.profile_id, "default");
        assert!(config.storage.load_existing);
        assert_eq!(config.log.level, "info");
        assert_eq!(config.storage_path(), PathBuf::from(".secman/collections/default.sec"));
    }

    #[test]
    fn test_explicit_path_wins() {
        let mut config = SecmanConfig::default();
        config.storage.path = Some("/tmp/vault.bin".into());

        assert_eq!(config.storage_path(), PathBuf::from("/tmp/vault.bin"));
    }

    #[test]
    fn test_env_overrides() {
        let env = Map::from([
            ("SECMAN__PROFILE_ID".to_owned(), "work".to_owned()),
            ("SECMAN__STORAGE__SECONDARY_PATH".to_owned(), "/mnt/share/work.sec".to_owned()),
            ("SECMAN__STORAGE__LOAD_EXISTING".to_owned(), "false".to_owned()),
            ("SECMAN__LOG__LEVEL".to_owned(), "warn".to_owned()),
        ]);

        let config = build(None, Some(env)).unwrap();

        assert_eq!(config.profile_id, "work");
        assert_eq!(config.storage.secondary_path, Some(PathBuf::from("/mnt/share/work.sec")));
        assert!(!config.storage.load_existing);
        assert_eq!(config.log.level, "warn");
        assert_eq!(config.storage.dir, PathBuf::from(DEFAULT_DIR));
    }

    #[test]
    fn test_env_ignores_other_prefixes() {
        let env = Map::from([("OTHER__PROFILE_ID".to_owned(), "nope".to_owned())]);
        assert_eq!(build(None, Some(env)).unwrap(), SecmanConfig::default());
    }
}
