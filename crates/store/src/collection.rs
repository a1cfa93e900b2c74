//! An ordered set of secrets indexed by both id and name.

use crate::clock::Clock;
use crate::error::StoreError;
use crate::secret::Secret;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// Version of the binary collection encoding.
pub const ENCODING_VERSION: u8 = 1;

/// Optional metadata of a new [`Collection`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionOptions {
    /// The collection expires this long after it is created.
    pub expire_interval: Option<TimeDelta>,
}

/// Secrets of one profile with O(1) lookup by id and by name.
///
/// Positions in the sequence are dense: removing a secret shifts every later secret
/// down by one and both indexes follow. Every successful mutation stamps
/// [`Collection::updated`] from the injected clock.
///
/// The encoding is canonical: both indexes are written in key order, so decoding
/// and re-encoding yields the same bytes.
#[derive(Clone)]
pub struct Collection {
    profile_id: String,
    secrets: Vec<Secret>,
    ids: HashMap<String, usize>,
    names: HashMap<String, usize>,
    updated: DateTime<Utc>,
    expires: Option<DateTime<Utc>>,
    expire_interval: Option<TimeDelta>,
    clock: Arc<dyn Clock>,
}

#[derive(Serialize)]
struct EncodedRef<'a> {
    version: u8,
    profile_id: &'a str,
    secrets: &'a [Secret],
    ids: BTreeMap<&'a str, usize>,
    names: BTreeMap<&'a str, usize>,
    updated: DateTime<Utc>,
    expires: Option<DateTime<Utc>>,
    expire_interval_ms: Option<i64>,
}

#[derive(Deserialize)]
struct Encoded {
    version: u8,
    profile_id: String,
    secrets: Vec<Secret>,
    ids: HashMap<String, usize>,
    names: HashMap<String, usize>,
    updated: DateTime<Utc>,
    expires: Option<DateTime<Utc>>,
    expire_interval_ms: Option<i64>,
}

impl Collection {
    /// Creates an empty collection for `profile_id`.
    pub fn new(profile_id: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self::with_options(profile_id, CollectionOptions::default(), clock)
    }

    /// Creates an empty collection for `profile_id` with the given metadata.
    ///
    /// An expire interval sets [`Collection::expires`] to the clock's current
    /// reading plus the interval.
    pub fn with_options(
        profile_id: impl Into<String>,
        options: CollectionOptions,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let expires = options.expire_interval.map(|interval| clock.now() + interval);
        Self {
            profile_id: profile_id.into(),
            secrets: Vec::new(),
            ids: HashMap::new(),
            names: HashMap::new(),
            updated: DateTime::UNIX_EPOCH,
            expires,
            expire_interval: options.expire_interval,
            clock,
        }
    }

    #[must_use]
    pub fn profile_id(&self) -> &str {
        &self.profile_id
    }

    #[must_use]
    pub const fn updated(&self) -> DateTime<Utc> {
        self.updated
    }

    #[must_use]
    pub const fn expires(&self) -> Option<DateTime<Utc>> {
        self.expires
    }

    #[must_use]
    pub const fn expire_interval(&self) -> Option<TimeDelta> {
        self.expire_interval
    }

    /// Returns `true` once the clock has reached [`Collection::expires`]. A
    /// collection without an expiry never expires.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires.is_some_and(|expires| self.clock.now() >= expires)
    }

    #[must_use]
    pub fn list(&self) -> &[Secret] {
        &self.secrets
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }

    #[must_use]
    pub fn get_by_id(&self, id: &str) -> Option<&Secret> {
        self.ids.get(id).and_then(|&i| self.secrets.get(i))
    }

    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<&Secret> {
        self.names.get(name).and_then(|&i| self.secrets.get(i))
    }

    /// Appends `secret` and indexes it by id and name.
    ///
    /// The stored copy never carries a value key.
    ///
    /// # Errors
    /// Returns [`StoreError::AlreadyExists`] if the id or the name is taken. The
    /// collection is left unchanged.
    pub fn add(&mut self, secret: Secret) -> Result<(), StoreError> {
        if self.ids.contains_key(secret.id()) || self.names.contains_key(secret.name()) {
            return Err(StoreError::AlreadyExists {
                message: secret.name().to_owned().into(),
                context: None,
            });
        }

        let position = self.secrets.len();
        self.ids.insert(secret.id().to_owned(), position);
        self.names.insert(secret.name().to_owned(), position);
        self.secrets.push(secret.without_key());
        self.updated = self.clock.now();
        Ok(())
    }

    /// Replaces the stored record that has `secret`'s id.
    ///
    /// Both the record and the collection are stamped with the same time.
    ///
    /// # Errors
    /// * [`StoreError::NotFound`] If no secret has that id.
    /// * [`StoreError::InvalidUpdate`] If the replacement renames the secret.
    pub fn update(&mut self, secret: Secret) -> Result<(), StoreError> {
        let Some(&position) = self.ids.get(secret.id()) else {
            return Err(StoreError::NotFound { message: secret.id().to_owned().into(), context: None });
        };

        let stored = &self.secrets[position];
        if stored.name() != secret.name() {
            return Err(StoreError::InvalidUpdate {
                message: format!("Cannot rename secret '{}' to '{}'", stored.name(), secret.name())
                    .into(),
                context: None,
            });
        }

        let now = self.clock.now();
        let mut secret = secret.without_key();
        secret.touch(now);
        self.secrets[position] = secret;
        self.updated = now;
        Ok(())
    }

    /// # Errors
    /// Returns [`StoreError::NotFound`] if no secret has that id.
    pub fn remove_by_id(&mut self, id: &str) -> Result<Secret, StoreError> {
        let Some(&position) = self.ids.get(id) else {
            return Err(StoreError::NotFound { message: id.to_owned().into(), context: None });
        };
        Ok(self.remove_at(position))
    }

    /// # Errors
    /// Returns [`StoreError::NotFound`] if no secret has that name.
    pub fn remove_by_name(&mut self, name: &str) -> Result<Secret, StoreError> {
        let Some(&position) = self.names.get(name) else {
            return Err(StoreError::NotFound { message: name.to_owned().into(), context: None });
        };
        Ok(self.remove_at(position))
    }

    fn remove_at(&mut self, position: usize) -> Secret {
        let removed = self.secrets.remove(position);
        self.ids.remove(removed.id());
        self.names.remove(removed.name());

        for index in self.ids.values_mut().chain(self.names.values_mut()) {
            if *index > position {
                *index -= 1;
            }
        }

        self.updated = self.clock.now();
        removed
    }

    /// Serializes the collection with the versioned binary schema.
    ///
    /// # Errors
    /// Returns [`StoreError::Codec`] if serialization fails.
    pub fn encode(&self) -> Result<Vec<u8>, StoreError> {
        let encoded = EncodedRef {
            version: ENCODING_VERSION,
            profile_id: &self.profile_id,
            secrets: &self.secrets,
            ids: sorted(&self.ids),
            names: sorted(&self.names),
            updated: self.updated,
            expires: self.expires,
            expire_interval_ms: self.expire_interval.map(|interval| interval.num_milliseconds()),
        };
        postcard::to_stdvec(&encoded).map_err(StoreError::from)
    }

    /// Restores a collection produced by [`Collection::encode`].
    ///
    /// The indexes are checked against the secrets before the collection is
    /// accepted.
    ///
    /// # Errors
    /// * [`StoreError::Codec`] If the bytes are not a valid encoding.
    /// * [`StoreError::Corrupted`] If the version is unknown or the indexes disagree
    ///   with the secrets.
    pub fn decode(bytes: &[u8], clock: Arc<dyn Clock>) -> Result<Self, StoreError> {
        let encoded: Encoded = postcard::from_bytes(bytes)?;

        if encoded.version != ENCODING_VERSION {
            return Err(StoreError::Corrupted {
                message: format!("Unsupported encoding version {}", encoded.version).into(),
                context: None,
            });
        }
        check_index(&encoded.secrets, &encoded.ids, Secret::id, "id")?;
        check_index(&encoded.secrets, &encoded.names, Secret::name, "name")?;
        let expire_interval = encoded
            .expire_interval_ms
            .map(|ms| {
                TimeDelta::try_milliseconds(ms).ok_or_else(|| StoreError::Corrupted {
                    message: format!("Expire interval of {ms} ms is out of range").into(),
                    context: None,
                })
            })
            .transpose()?;

        Ok(Self {
            profile_id: encoded.profile_id,
            secrets: encoded.secrets,
            ids: encoded.ids,
            names: encoded.names,
            updated: encoded.updated,
            expires: encoded.expires,
            expire_interval,
            clock,
        })
    }
}

fn sorted(index: &HashMap<String, usize>) -> BTreeMap<&str, usize> {
    index.iter().map(|(key, &position)| (key.as_str(), position)).collect()
}

fn check_index(
    secrets: &[Secret],
    index: &HashMap<String, usize>,
    field: fn(&Secret) -> &str,
    label: &'static str,
) -> Result<(), StoreError> {
    if index.len() != secrets.len() {
        return Err(StoreError::Corrupted {
            message: format!(
                "{label} index holds {} entries for {} secrets",
                index.len(),
                secrets.len()
            )
            .into(),
            context: None,
        });
    }

    for (key, &position) in index {
        if secrets.get(position).map(field) != Some(key.as_str()) {
            return Err(StoreError::Corrupted {
                message: format!("{label} index entry '{key}' points at the wrong secret").into(),
                context: None,
            });
        }
    }
    Ok(())
}

impl PartialEq for Collection {
    fn eq(&self, other: &Self) -> bool {
        self.profile_id == other.profile_id
            && self.secrets == other.secrets
            && self.ids == other.ids
            && self.names == other.names
            && self.updated == other.updated
            && self.expires == other.expires
            && self.expire_interval == other.expire_interval
    }
}

impl Eq for Collection {}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("profile_id", &self.profile_id)
            .field("secrets", &self.secrets)
            .field("updated", &self.updated)
            .field("expires", &self.expires)
            .finish_non_exhaustive()
    }
}
