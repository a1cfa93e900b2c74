//! Facade for the secman encrypted secret store.
//! Re-exports the cipher, storage, store and logger crates and wires configuration
//! into a ready [`Handler`]. Keep this crate thin: it composes, it does not implement
//! store logic.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use secman::cipher::Key;
//! use secman::config::load_config;
//! use secman::store::SecretOptions;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config(Some("secman.toml"))?;
//! let _logger = secman::init_logging(&config)?;
//!
//! // Both keys come from the caller, e.g. an OS keychain.
//! let storage_key = Key::random()?;
//! let key = Key::from_password("correct horse battery staple")?;
//!
//! let mut handler = secman::open(&config, storage_key, key)?;
//! handler.add_secret("db", b"hunter2", SecretOptions::default())?;
//! handler.sync()?;
//! # Ok(())
//! # }
//! ```

pub mod config;
mod error;

pub use crate::error::{ConfigError, ConfigErrorExt};
pub use secman_cipher as cipher;
pub use secman_logger as logger;
pub use secman_storage as storage;
pub use secman_store as store;
pub use secman_store::{Handler, HandlerOptions};

use crate::config::SecmanConfig;
use secman_cipher::Key;
use secman_logger::{Logger, parse_level};
use secman_storage::{FileStorage, Storage};
use tracing::info;

/// Opens the handler described by `config`.
///
/// The primary and, if configured, the secondary collection files are opened as
/// [`FileStorage`] backends. With `storage.load_existing` the stored collection is
/// loaded; a missing file starts an empty collection.
///
/// # Errors
/// * [`ConfigError::InvalidConfiguration`] If the profile id is empty.
/// * [`ConfigError::Storage`] If a storage directory cannot be created.
/// * [`ConfigError::Store`] If the keys are invalid or the stored collection cannot
///   be loaded.
pub fn open(config: &SecmanConfig, storage_key: Key, key: Key) -> Result<Handler, ConfigError> {
    if config.profile_id.trim().is_empty() {
        return Err(ConfigError::InvalidConfiguration {
            message: "A profile ID must be provided".into(),
            context: None,
        });
    }

    let path = config.storage_path();
    let storage = FileStorage::open(&path).context("Opening primary storage")?;
    let secondary_storage = config
        .storage
        .secondary_path
        .as_ref()
        .map(|path| FileStorage::open(path).map(|s| Box::new(s) as Box<dyn Storage>))
        .transpose()
        .context("Opening secondary storage")?;

    info!(
        profile_id = %config.profile_id,
        path = %path.display(),
        secondary = secondary_storage.is_some(),
        "Opening secret store"
    );

    let options = HandlerOptions {
        secondary_storage,
        load_collection: config.storage.load_existing,
        ..HandlerOptions::default()
    };
    Handler::new(config.profile_id.clone(), storage_key, key, Box::new(storage), options)
        .context("Constructing handler")
}

/// Installs the global logger from the `log` section.
///
/// # Errors
/// Returns [`ConfigError::Logger`] for an invalid level or if a logger is already
/// installed.
pub fn init_logging(config: &SecmanConfig) -> Result<Logger, ConfigError> {
    let level = parse_level(&config.log.level).context("Parsing log level")?;
    let builder = Logger::builder().name("secman").level(level);

    match &config.log.path {
        Some(dir) => builder.directory(dir).init(),
        None => builder.init(),
    }
    .context("Initializing logger")
}
