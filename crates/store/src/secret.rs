//! A single named, encrypted record.

use crate::clock::{Clock, IdGenerator};
use crate::error::{StoreError, StoreErrorExt};
use chrono::{DateTime, Utc};
use secman_cipher::{decrypt, encrypt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroizing;

/// What a secret holds. Informational only; every kind is stored the same way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SecretKind {
    #[default]
    Generic,
    Credential,
    Note,
    File,
}

impl SecretKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::Credential => "credential",
            Self::Note => "note",
            Self::File => "file",
        }
    }
}

impl fmt::Display for SecretKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SecretKind {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "generic" => Ok(Self::Generic),
            "credential" => Ok(Self::Credential),
            "note" => Ok(Self::Note),
            "file" => Ok(Self::File),
            other => Err(StoreError::InvalidConfiguration {
                message: format!("Unknown secret type '{other}'").into(),
                context: None,
            }),
        }
    }
}

/// Metadata applied verbatim when a secret is created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretOptions {
    pub display_name: String,
    pub kind: SecretKind,
    pub labels: Vec<String>,
    pub tags: BTreeMap<String, String>,
}

/// A partial modification of a secret.
///
/// Every field set on the update replaces the stored one wholesale; unset fields
/// are left untouched.
#[derive(Clone, Default)]
pub struct SecretUpdate {
    display_name: Option<String>,
    value: Option<Zeroizing<Vec<u8>>>,
    kind: Option<SecretKind>,
    labels: Option<Vec<String>>,
    tags: Option<BTreeMap<String, String>>,
    rotate_key: Option<Zeroizing<Vec<u8>>>,
}

impl SecretUpdate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Replaces the plaintext value. It is encrypted under the key the secret held
    /// before any rotation in the same update.
    #[must_use]
    pub fn value(mut self, plaintext: impl Into<Vec<u8>>) -> Self {
        self.value = Some(Zeroizing::new(plaintext.into()));
        self
    }

    #[must_use]
    pub const fn kind(mut self, kind: SecretKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn labels(mut self, labels: Vec<String>) -> Self {
        self.labels = Some(labels);
        self
    }

    #[must_use]
    pub fn tags(mut self, tags: BTreeMap<String, String>) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Re-encrypts the value under `key` and makes it the secret's key.
    #[must_use]
    pub fn rotate_key(mut self, key: &[u8]) -> Self {
        self.rotate_key = Some(Zeroizing::new(key.to_vec()));
        self
    }
}

impl fmt::Debug for SecretUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretUpdate")
            .field("display_name", &self.display_name)
            .field("value", &self.value.as_ref().map(|_| "[REDACTED]"))
            .field("kind", &self.kind)
            .field("labels", &self.labels)
            .field("tags", &self.tags)
            .field("rotate_key", &self.rotate_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// A named secret whose value is always stored encrypted.
///
/// The plaintext only exists in the buffer returned by [`Secret::decrypt`]. A secret
/// may carry the value key it was last used with; that key is never persisted and
/// takes no part in equality.
///
/// `Secret::default()` is the empty record and is not [valid](Secret::is_valid).
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Secret {
    id: String,
    name: String,
    display_name: String,
    value: Vec<u8>,
    kind: SecretKind,
    labels: Vec<String>,
    tags: BTreeMap<String, String>,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
    #[serde(skip)]
    key: Option<Zeroizing<Vec<u8>>>,
}

impl Secret {
    /// Encrypts `plaintext` under `key` and builds a new secret with a fresh id.
    ///
    /// # Errors
    /// * [`StoreError::InvalidConfiguration`] If `name` is empty.
    /// * [`StoreError::Cipher`] If `key` is not 32 bytes long or encryption fails.
    pub fn new(
        name: impl Into<String>,
        plaintext: &[u8],
        key: &[u8],
        options: SecretOptions,
        clock: &dyn Clock,
        ids: &dyn IdGenerator,
    ) -> Result<Self, StoreError> {
        let name = name.into();
        if name.is_empty() {
            return Err(StoreError::InvalidConfiguration {
                message: "A secret name must be provided".into(),
                context: None,
            });
        }

        let value = encrypt(plaintext, key).context("Encrypting secret")?;
        let now = clock.now();

        Ok(Self {
            id: ids.next_id(),
            name,
            display_name: options.display_name,
            value,
            kind: options.kind,
            labels: options.labels,
            tags: options.tags,
            created: now,
            updated: now,
            key: Some(Zeroizing::new(key.to_vec())),
        })
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// The encrypted value: `nonce || ciphertext || tag`.
    #[must_use]
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    #[must_use]
    pub const fn kind(&self) -> SecretKind {
        self.kind
    }

    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    #[must_use]
    pub const fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    #[must_use]
    pub const fn created(&self) -> DateTime<Utc> {
        self.created
    }

    #[must_use]
    pub const fn updated(&self) -> DateTime<Utc> {
        self.updated
    }

    /// Returns `true` if a value key is associated with this secret.
    #[must_use]
    pub const fn has_key(&self) -> bool {
        self.key.is_some()
    }

    /// Associates `key` with this secret for later [`decrypt`](Secret::decrypt) calls.
    #[must_use]
    pub fn with_key(mut self, key: &[u8]) -> Self {
        self.key = Some(Zeroizing::new(key.to_vec()));
        self
    }

    /// A secret is valid once it has both an id and a name.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.id.is_empty() && !self.name.is_empty()
    }

    /// Decrypts the value.
    ///
    /// An explicit 32-byte `key` takes precedence; otherwise the associated key is
    /// used.
    ///
    /// # Errors
    /// Returns [`StoreError::Cipher`] if no usable key is available or authentication
    /// fails.
    pub fn decrypt(&self, key: Option<&[u8]>) -> Result<Zeroizing<Vec<u8>>, StoreError> {
        let key = match key {
            Some(explicit) if explicit.len() == secman_cipher::KEY_LEN => explicit,
            _ => self.current_key(),
        };
        decrypt(&self.value, key).context("Decrypting secret")
    }

    /// Applies `update` and stamps `updated` with the clock's reading.
    ///
    /// A new value is encrypted under the current key first; a rotation then
    /// re-encrypts whatever value results. Nothing is changed if any step fails.
    ///
    /// # Errors
    /// Returns [`StoreError::Cipher`] if encryption or decryption fails.
    pub fn apply_update(&mut self, update: SecretUpdate, clock: &dyn Clock) -> Result<(), StoreError> {
        let mut value = match &update.value {
            Some(plaintext) => encrypt(plaintext, self.current_key()).context("Encrypting secret")?,
            None => self.value.clone(),
        };

        if let Some(new_key) = &update.rotate_key {
            let plaintext = decrypt(&value, self.current_key()).context("Decrypting secret")?;
            value = encrypt(&plaintext, new_key).context("Encrypting secret")?;
        }

        self.value = value;
        if let Some(new_key) = update.rotate_key {
            self.key = Some(new_key);
        }
        if let Some(display_name) = update.display_name {
            self.display_name = display_name;
        }
        if let Some(kind) = update.kind {
            self.kind = kind;
        }
        if let Some(labels) = update.labels {
            self.labels = labels;
        }
        if let Some(tags) = update.tags {
            self.tags = tags;
        }
        self.updated = clock.now();
        Ok(())
    }

    pub(crate) const fn touch(&mut self, now: DateTime<Utc>) {
        self.updated = now;
    }

    pub(crate) fn without_key(mut self) -> Self {
        self.key = None;
        self
    }

    fn current_key(&self) -> &[u8] {
        match &self.key {
            Some(key) => key.as_slice(),
            None => &[],
        }
    }
}

impl PartialEq for Secret {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.display_name == other.display_name
            && self.value == other.value
            && self.kind == other.kind
            && self.labels == other.labels
            && self.tags == other.tags
            && self.created == other.created
            && self.updated == other.updated
    }
}

impl Eq for Secret {}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secret")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("display_name", &self.display_name)
            .field("value_len", &self.value.len())
            .field("kind", &self.kind)
            .field("labels", &self.labels)
            .field("tags", &self.tags)
            .field("created", &self.created)
            .field("updated", &self.updated)
            .field("has_key", &self.key.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{FixedClock, SequentialIds};
    use chrono::TimeDelta;
    use secman_cipher::{CipherError, KEY_LEN};

    const KEY: [u8; KEY_LEN] = [1u8; KEY_LEN];
    const OTHER: [u8; KEY_LEN] = [2u8; KEY_LEN];

    fn clock() -> FixedClock {
        let start = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        FixedClock::stepping(start, TimeDelta::seconds(1))
    }

    fn secret(clock: &FixedClock) -> Secret {
        Secret::new("db", b"hunter2", &KEY, SecretOptions::default(), clock, &SequentialIds::new())
            .unwrap()
    }

    #[test]
    fn test_new_encrypts_and_stamps() {
        let clock = clock();
        let options = SecretOptions {
            display_name: "Database".into(),
            kind: SecretKind::Credential,
            labels: vec!["prod".into()],
            tags: BTreeMap::from([("env".into(), "prod".into())]),
        };
        let secret =
            Secret::new("db", b"hunter2", &KEY, options, &clock, &SequentialIds::new()).unwrap();

        assert!(secret.is_valid());
        assert_eq!(secret.id(), "00000000-0000-0000-0000-000000000001");
        assert_eq!(secret.display_name(), "Database");
        assert_eq!(secret.kind(), SecretKind::Credential);
        assert_eq!(secret.created(), secret.updated());
        assert_ne!(secret.value(), b"hunter2");
        assert_eq!(secret.decrypt(None).unwrap().as_slice(), b"hunter2");
    }

    #[test]
    fn test_new_rejects_short_key_and_empty_name() {
        let clock = clock();
        let ids = SequentialIds::new();

        let err = Secret::new("db", b"x", &[0u8; 16], SecretOptions::default(), &clock, &ids)
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Cipher { source: CipherError::InvalidKeyLength { .. }, .. }
        ));

        let err = Secret::new("", b"x", &KEY, SecretOptions::default(), &clock, &ids).unwrap_err();
        assert!(matches!(err, StoreError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_default_is_invalid() {
        assert!(!Secret::default().is_valid());
    }

    #[test]
    fn test_decrypt_prefers_explicit_key() {
        let clock = clock();
        let secret = secret(&clock).without_key();

        assert!(secret.decrypt(None).is_err());
        assert!(secret.decrypt(Some(&[1u8; 8][..])).is_err(), "short keys fall back to the associated key");
        assert_eq!(secret.decrypt(Some(&KEY[..])).unwrap().as_slice(), b"hunter2");

        let err = secret.decrypt(Some(&OTHER[..])).unwrap_err();
        assert!(matches!(err, StoreError::Cipher { source: CipherError::InvalidKey { .. }, .. }));
    }

    #[test]
    fn test_update_replaces_only_given_fields() {
        let clock = clock();
        let mut secret = secret(&clock);
        let created = secret.created();

        secret
            .apply_update(SecretUpdate::new().display_name("Renamed").kind(SecretKind::Note), &clock)
            .unwrap();

        assert_eq!(secret.display_name(), "Renamed");
        assert_eq!(secret.kind(), SecretKind::Note);
        assert!(secret.labels().is_empty());
        assert!(secret.updated() > created);
        assert_eq!(secret.decrypt(None).unwrap().as_slice(), b"hunter2");
    }

    #[test]
    fn test_value_and_rotation_together() {
        let clock = clock();
        let mut secret = secret(&clock);

        secret.apply_update(SecretUpdate::new().value("new-pass").rotate_key(&OTHER), &clock).unwrap();

        assert_eq!(secret.decrypt(None).unwrap().as_slice(), b"new-pass");
        assert_eq!(secret.decrypt(Some(&OTHER[..])).unwrap().as_slice(), b"new-pass");
        assert!(matches!(decrypt(secret.value(), &KEY), Err(CipherError::InvalidKey { .. })));
    }

    #[test]
    fn test_failed_rotation_changes_nothing() {
        let clock = clock();
        let mut secret = secret(&clock);
        let before = secret.clone();

        let result = secret.apply_update(
            SecretUpdate::new().display_name("x").rotate_key(&[9u8; 5]),
            &clock,
        );

        assert!(result.is_err());
        assert_eq!(secret, before);
        assert_eq!(secret.decrypt(None).unwrap().as_slice(), b"hunter2");
    }

    #[test]
    fn test_equality_ignores_key() {
        let clock = clock();
        let secret = secret(&clock);
        assert_eq!(secret.clone().without_key(), secret);
    }

    #[test]
    fn test_debug_is_redacted() {
        let clock = clock();
        let debug = format!("{:?}", secret(&clock));
        assert!(debug.contains("value_len"));
        assert!(!debug.contains("hunter2"));

        let update = format!("{:?}", SecretUpdate::new().value("hunter2"));
        assert!(!update.contains("hunter2"));
    }

    #[test]
    fn test_kind_parses_from_display() {
        for kind in [SecretKind::Generic, SecretKind::Credential, SecretKind::Note, SecretKind::File] {
            assert_eq!(kind.to_string().parse::<SecretKind>().unwrap(), kind);
        }
        assert!("password".parse::<SecretKind>().is_err());
    }
}
