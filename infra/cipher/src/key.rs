use argon2::{Algorithm, Argon2, Params, Version};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use getrandom::fill;
use std::fmt;
use std::str::FromStr;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{CipherError, CipherErrorExt};

/// Length of a derived key in bytes.
pub const KEY_LEN: usize = 32;

/// Length of a freshly generated salt in bytes.
pub const SALT_LEN: usize = 16;

/// Argon2id cost parameters: one pass over 32 MiB on a single lane.
const ARGON2_TIME_COST: u32 = 1;
const ARGON2_MEMORY_KIB: u32 = 32 * 1024;
const ARGON2_PARALLELISM: u32 = 1;

const DELIMITER: char = '$';

/// A derived key together with the salt used to derive it.
///
/// The value is wiped from memory when the key is dropped and never shows up in
/// `Debug` output.
///
/// Keys compare by bytes. Two derivations of the same password use different salts,
/// so they are never equal; use [`Key::verify_password`] to check a password.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Key {
    value: Vec<u8>,
    salt: Vec<u8>,
}

impl Key {
    /// Derives a key from a user password with a fresh random salt.
    ///
    /// # Errors
    /// * [`CipherError::Rng`] If the salt cannot be generated.
    /// * [`CipherError::KeyDerivation`] If Argon2 fails.
    pub fn from_password(password: impl AsRef<[u8]>) -> Result<Self, CipherError> {
        let salt = random_bytes(SALT_LEN)?;
        let value = derive(password.as_ref(), &salt).context("Deriving key from password")?;
        Ok(Self { value, salt })
    }

    /// Derives a non-memorable key from a random seed and a random salt.
    ///
    /// Used for machine-generated storage keys.
    ///
    /// # Errors
    /// * [`CipherError::Rng`] If the seed or salt cannot be generated.
    /// * [`CipherError::KeyDerivation`] If Argon2 fails.
    pub fn random() -> Result<Self, CipherError> {
        let salt = random_bytes(SALT_LEN)?;
        let mut seed = random_bytes(KEY_LEN)?;
        let value = derive(&seed, &salt).context("Deriving random key");
        seed.zeroize();
        Ok(Self { value: value?, salt })
    }

    /// Builds a key from already derived parts without validating their lengths.
    ///
    /// Length checks happen where the key is used.
    #[must_use]
    pub const fn from_parts(value: Vec<u8>, salt: Vec<u8>) -> Self {
        Self { value, salt }
    }

    /// Returns the derived key bytes.
    #[must_use]
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Returns the salt used during derivation.
    #[must_use]
    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    /// Returns `true` if the key holds any derived bytes.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.value.is_empty()
    }

    /// Re-derives `password` with this key's salt and compares in constant time.
    #[must_use]
    pub fn verify_password(&self, password: impl AsRef<[u8]>) -> bool {
        compare_password_to_key(password, self)
    }

    /// Encodes the key for persistence as `base64(salt)$base64(value)`.
    #[must_use]
    pub fn encode(&self) -> String {
        format!("{}{DELIMITER}{}", STANDARD.encode(&self.salt), STANDARD.encode(&self.value))
    }

    /// Decodes a key persisted by [`Key::encode`].
    ///
    /// # Errors
    /// * [`CipherError::InvalidKeyFormat`] If the input does not have exactly two parts.
    /// * [`CipherError::Encoding`] If a part is not valid base64.
    pub fn decode(encoded: &str) -> Result<Self, CipherError> {
        let mut parts = encoded.split(DELIMITER);
        let (Some(salt), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(CipherError::InvalidKeyFormat {
                message: "expected base64(salt)$base64(value)".into(),
                context: None,
            });
        };

        let salt = STANDARD.decode(salt).context("Decoding key salt")?;
        let value = STANDARD.decode(value).context("Decoding key value")?;
        Ok(Self { value, salt })
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key")
            .field("value", &"[REDACTED]")
            .field("salt_len", &self.salt.len())
            .finish()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for Key {
    type Err = CipherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

/// Checks whether `password` derives to `key` under the key's own salt.
///
/// Never fails: derivation errors and length mismatches count as a mismatch.
#[must_use]
pub fn compare_password_to_key(password: impl AsRef<[u8]>, key: &Key) -> bool {
    let Ok(mut derived) = derive(password.as_ref(), &key.salt) else {
        return false;
    };
    let equal = derived.len() == key.value.len() && bool::from(derived.ct_eq(&key.value));
    derived.zeroize();
    equal
}

fn derive(input: &[u8], salt: &[u8]) -> Result<Vec<u8>, CipherError> {
    let params =
        Params::new(ARGON2_MEMORY_KIB, ARGON2_TIME_COST, ARGON2_PARALLELISM, Some(KEY_LEN))
            .map_err(|e| CipherError::KeyDerivation { message: e.to_string().into(), context: None })?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut out = vec![0u8; KEY_LEN];
    argon2
        .hash_password_into(input, salt, &mut out)
        .map_err(|e| CipherError::KeyDerivation { message: e.to_string().into(), context: None })?;
    Ok(out)
}

fn random_bytes(len: usize) -> Result<Vec<u8>, CipherError> {
    let mut buf = vec![0u8; len];
    fill(&mut buf).map_err(CipherError::rng)?;
    Ok(buf)
}
