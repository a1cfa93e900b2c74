//! Orchestrates one collection against its storage backends.
//!
//! Persistence uses two pipelines:
//!
//! ```text
//! load: storage.load -> decrypt(storage key) -> decode
//! save: encode -> encrypt(storage key) -> storage.save
//! ```
//!
//! Any failure inside a pipeline is wrapped in [`StoreError::LoadCollection`] or
//! [`StoreError::SaveCollection`].

use crate::clock::{Clock, IdGenerator, SystemClock, UuidGenerator};
use crate::collection::Collection;
use crate::error::{StoreError, StoreErrorExt};
use crate::secret::{Secret, SecretOptions, SecretUpdate};
use secman_cipher::{Key, check_key, decrypt, encrypt};
use secman_storage::Storage;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Optional collaborators of a [`Handler`].
#[derive(Debug)]
pub struct HandlerOptions {
    /// Second backend reconciled by [`Handler::sync`].
    pub secondary_storage: Option<Box<dyn Storage>>,
    /// Load the stored collection during construction.
    pub load_collection: bool,
    pub clock: Arc<dyn Clock>,
    pub ids: Arc<dyn IdGenerator>,
}

impl Default for HandlerOptions {
    fn default() -> Self {
        Self {
            secondary_storage: None,
            load_collection: false,
            clock: Arc::new(SystemClock),
            ids: Arc::new(UuidGenerator),
        }
    }
}

/// Owns the active [`Collection`] of a profile and persists it.
///
/// Two keys form separate trust domains: the storage key seals the whole encoded
/// collection at rest, the value key seals each secret's value. Either one can be
/// rotated without touching the other.
///
/// Mutations change the in-memory collection first and save afterwards. If the
/// save fails the change stays in memory and is persisted by the next successful
/// save.
///
/// # Example
///
/// ```rust
/// use secman_cipher::Key;
/// use secman_storage::MemoryStorage;
/// use secman_store::{Handler, HandlerOptions, SecretOptions, StoreError};
///
/// # fn main() -> Result<(), StoreError> {
/// let storage_key = Key::random()?;
/// let key = Key::from_password("correct horse")?;
/// let storage = MemoryStorage::new();
///
/// let mut handler =
///     Handler::new("default", storage_key, key, Box::new(storage), HandlerOptions::default())?;
///
/// let secret = handler.add_secret("db", b"hunter2", SecretOptions::default())?;
/// assert_eq!(secret.decrypt(None)?.as_slice(), b"hunter2");
///
/// handler.delete_secret_by_name("db")?;
/// assert!(handler.list_secrets().is_empty());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Handler {
    profile_id: String,
    collection: Collection,
    storage: Box<dyn Storage>,
    secondary_storage: Option<Box<dyn Storage>>,
    storage_key: Key,
    key: Key,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl Handler {
    /// Creates a handler for `profile_id`.
    ///
    /// With [`HandlerOptions::load_collection`] the stored collection is loaded; a
    /// backend that holds nothing yet yields an empty collection instead.
    ///
    /// # Errors
    /// * [`StoreError::InvalidConfiguration`] If `profile_id` is empty.
    /// * [`StoreError::Cipher`] If either key is not 32 bytes long.
    /// * [`StoreError::LoadCollection`] If loading fails for any other reason than
    ///   missing data.
    pub fn new(
        profile_id: impl Into<String>,
        storage_key: Key,
        key: Key,
        storage: Box<dyn Storage>,
        options: HandlerOptions,
    ) -> Result<Self, StoreError> {
        let profile_id = profile_id.into();
        if profile_id.is_empty() {
            return Err(StoreError::InvalidConfiguration {
                message: "A profile ID must be provided".into(),
                context: None,
            });
        }
        check_key(storage_key.value()).context("Validating storage key")?;
        check_key(key.value()).context("Validating value key")?;

        let HandlerOptions { secondary_storage, load_collection, clock, ids } = options;
        let mut handler = Self {
            collection: Collection::new(profile_id.clone(), clock.clone()),
            profile_id,
            storage,
            secondary_storage,
            storage_key,
            key,
            clock,
            ids,
        };

        if load_collection {
            match handler.load() {
                Ok(()) => {},
                Err(err) if err.is_source_not_found() => {
                    info!(
                        profile_id = handler.collection.profile_id(),
                        "No stored collection found, starting empty"
                    );
                },
                Err(err) => return Err(err),
            }
        }

        Ok(handler)
    }

    /// The profile this handler was opened for.
    #[must_use]
    pub fn profile_id(&self) -> &str {
        &self.profile_id
    }

    #[must_use]
    pub const fn collection(&self) -> &Collection {
        &self.collection
    }

    /// The active value key.
    #[must_use]
    pub const fn key(&self) -> &Key {
        &self.key
    }

    /// Replaces the active collection with the one stored in the primary backend.
    ///
    /// The stored collection is adopted as is, even when it belongs to another
    /// profile; that case is logged as a warning.
    ///
    /// # Errors
    /// Returns [`StoreError::LoadCollection`] wrapping the failing stage.
    pub fn load(&mut self) -> Result<(), StoreError> {
        let collection = load_decrypt_decode(&*self.storage, &self.storage_key, &self.clock)?;
        self.adopt(collection);
        Ok(())
    }

    /// Persists the active collection to the primary backend.
    ///
    /// # Errors
    /// Returns [`StoreError::SaveCollection`] wrapping the failing stage.
    pub fn save(&self) -> Result<(), StoreError> {
        encode_encrypt_save(&*self.storage, &self.collection, &self.storage_key)
    }

    /// Makes both backends hold the more recently updated collection.
    ///
    /// The secondary backend wins only when its timestamp is strictly later. The
    /// winning collection replaces the active one and overwrites the other backend
    /// as a whole; changes that exist only on the losing side are discarded.
    /// Without a secondary backend this does nothing.
    ///
    /// # Errors
    /// * [`StoreError::Storage`] If a backend timestamp cannot be read.
    /// * [`StoreError::LoadCollection`] / [`StoreError::SaveCollection`] If a pipeline fails.
    pub fn sync(&mut self) -> Result<(), StoreError> {
        let Some(secondary) = self.secondary_storage.as_deref() else {
            return Ok(());
        };
        let primary = &*self.storage;

        let primary_updated = primary.updated().context("Reading primary storage timestamp")?;
        let secondary_updated =
            secondary.updated().context("Reading secondary storage timestamp")?;

        let secondary_wins = secondary_updated > primary_updated;
        let (source, direction) = if secondary_wins {
            (secondary, "secondary -> primary")
        } else {
            (primary, "primary -> secondary")
        };
        info!(
            %primary_updated,
            %secondary_updated,
            direction,
            "Synchronizing collection"
        );

        let collection = load_decrypt_decode(source, &self.storage_key, &self.clock)?;
        self.adopt(collection);
        let destination = match (secondary_wins, self.secondary_storage.as_deref()) {
            (false, Some(secondary)) => secondary,
            _ => &*self.storage,
        };
        encode_encrypt_save(destination, &self.collection, &self.storage_key)
    }

    /// Returns a copy of the secret with the active value key attached.
    ///
    /// # Errors
    /// Returns [`StoreError::SecretNotFound`] if no secret has that id.
    pub fn get_secret_by_id(&self, id: &str) -> Result<Secret, StoreError> {
        self.collection
            .get_by_id(id)
            .map(|secret| secret.clone().with_key(self.key.value()))
            .ok_or_else(|| secret_not_found(id))
    }

    /// Returns a copy of the secret with the active value key attached.
    ///
    /// # Errors
    /// Returns [`StoreError::SecretNotFound`] if no secret has that name.
    pub fn get_secret_by_name(&self, name: &str) -> Result<Secret, StoreError> {
        self.collection
            .get_by_name(name)
            .map(|secret| secret.clone().with_key(self.key.value()))
            .ok_or_else(|| secret_not_found(name))
    }

    /// The stored secrets in insertion order, without value keys.
    #[must_use]
    pub fn list_secrets(&self) -> &[Secret] {
        self.collection.list()
    }

    /// Encrypts `plaintext` under the value key, adds the secret and saves.
    ///
    /// # Errors
    /// * [`StoreError::AlreadyExists`] If the name is taken. Nothing is saved.
    /// * [`StoreError::SaveCollection`] If persisting fails. The secret stays in memory.
    /// * Any error of [`Secret::new`].
    pub fn add_secret(
        &mut self,
        name: impl Into<String>,
        plaintext: &[u8],
        options: SecretOptions,
    ) -> Result<Secret, StoreError> {
        let secret =
            Secret::new(name, plaintext, self.key.value(), options, &*self.clock, &*self.ids)?;
        self.collection.add(secret.clone())?;
        debug!(id = secret.id(), name = secret.name(), "Secret added");

        self.save()?;
        Ok(secret)
    }

    /// Applies `update` to the secret with that id and saves.
    ///
    /// # Errors
    /// * [`StoreError::SecretNotFound`] If no secret has that id.
    /// * [`StoreError::Cipher`] If re-encryption fails.
    /// * [`StoreError::SaveCollection`] If persisting fails.
    pub fn update_secret_by_id(
        &mut self,
        id: &str,
        update: SecretUpdate,
    ) -> Result<Secret, StoreError> {
        let secret = self.get_secret_by_id(id)?;
        let secret = self.commit(secret, update)?;
        self.save()?;
        Ok(secret)
    }

    /// Applies `update` to the secret with that name and saves.
    ///
    /// # Errors
    /// See [`Handler::update_secret_by_id`].
    pub fn update_secret_by_name(
        &mut self,
        name: &str,
        update: SecretUpdate,
    ) -> Result<Secret, StoreError> {
        let secret = self.get_secret_by_name(name)?;
        let secret = self.commit(secret, update)?;
        self.save()?;
        Ok(secret)
    }

    /// # Errors
    /// * [`StoreError::SecretNotFound`] If no secret has that id.
    /// * [`StoreError::SaveCollection`] If persisting fails.
    pub fn delete_secret_by_id(&mut self, id: &str) -> Result<(), StoreError> {
        let removed = self.collection.remove_by_id(id).map_err(|_| secret_not_found(id))?;
        debug!(id = removed.id(), name = removed.name(), "Secret deleted");
        self.save()
    }

    /// # Errors
    /// * [`StoreError::SecretNotFound`] If no secret has that name.
    /// * [`StoreError::SaveCollection`] If persisting fails.
    pub fn delete_secret_by_name(&mut self, name: &str) -> Result<(), StoreError> {
        let removed = self.collection.remove_by_name(name).map_err(|_| secret_not_found(name))?;
        debug!(id = removed.id(), name = removed.name(), "Secret deleted");
        self.save()
    }

    /// Re-encrypts every secret value under `new_key`, adopts it and saves once.
    ///
    /// If a secret fails to rotate, the secrets before it stay rotated in memory,
    /// the old key stays active and nothing is saved.
    ///
    /// # Errors
    /// * [`StoreError::Cipher`] If `new_key` is not 32 bytes long or a value cannot
    ///   be re-encrypted.
    /// * [`StoreError::SaveCollection`] If persisting fails.
    pub fn update_key(&mut self, new_key: Key) -> Result<(), StoreError> {
        check_key(new_key.value()).context("Validating new value key")?;

        let ids: Vec<String> = self.collection.list().iter().map(|s| s.id().to_owned()).collect();
        for id in &ids {
            let secret = self.get_secret_by_id(id)?;
            self.commit(secret, SecretUpdate::new().rotate_key(new_key.value()))?;
        }

        self.key = new_key;
        info!(secrets = ids.len(), "Value key rotated");
        self.save()
    }

    fn adopt(&mut self, collection: Collection) {
        if collection.profile_id() != self.profile_id {
            warn!(
                expected = %self.profile_id,
                stored = collection.profile_id(),
                "Stored collection belongs to another profile"
            );
        }
        self.collection = collection;
    }

    fn commit(&mut self, mut secret: Secret, update: SecretUpdate) -> Result<Secret, StoreError> {
        secret.apply_update(update, &*self.clock)?;
        self.collection.update(secret.clone())?;
        if let Some(stored) = self.collection.get_by_id(secret.id()) {
            secret.touch(stored.updated());
        }
        debug!(id = secret.id(), name = secret.name(), "Secret updated");
        Ok(secret)
    }
}

fn load_decrypt_decode(
    storage: &dyn Storage,
    storage_key: &Key,
    clock: &Arc<dyn Clock>,
) -> Result<Collection, StoreError> {
    let sealed = storage.load().map_err(|e| StoreError::load(e.into()))?;
    let encoded =
        decrypt(&sealed, storage_key.value()).map_err(|e| StoreError::load(e.into()))?;
    let collection = Collection::decode(&encoded, clock.clone()).map_err(StoreError::load)?;

    debug!(
        profile_id = collection.profile_id(),
        secrets = collection.len(),
        "Collection loaded"
    );
    Ok(collection)
}

fn encode_encrypt_save(
    storage: &dyn Storage,
    collection: &Collection,
    storage_key: &Key,
) -> Result<(), StoreError> {
    let encoded = collection.encode().map_err(StoreError::save)?;
    let sealed =
        encrypt(&encoded, storage_key.value()).map_err(|e| StoreError::save(e.into()))?;
    storage.save(&sealed).map_err(|e| StoreError::save(e.into()))?;

    debug!(
        profile_id = collection.profile_id(),
        secrets = collection.len(),
        bytes = sealed.len(),
        "Collection saved"
    );
    Ok(())
}

fn secret_not_found(identifier: &str) -> StoreError {
    StoreError::SecretNotFound { message: identifier.to_owned().into(), context: None }
}
