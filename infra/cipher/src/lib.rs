//! Symmetric encryption and key derivation primitives for the secman store.
//!
//! ## Payload Format
//!
//! Every sealed value is a single binary blob without a header:
//!
//! ```text
//! [NONCE(12)][CIPHERTEXT(N)][TAG(16)]
//! ```
//!
//! The same format protects both individual secret values and the serialized
//! collection at rest. Any versioning lives inside the plaintext.
//!
//! ## Nonce Policy
//!
//! A fresh random 96-bit nonce is drawn from the OS RNG for every [`encrypt`] call.
//! This is the standard approach for `AES-GCM` but it is probabilistic, so keys
//! should be rotated long before the birthday bound becomes relevant.
//!
//! ## Error Oracle
//!
//! [`decrypt`] reports every authentication failure as [`CipherError::InvalidKey`],
//! whether the key was wrong or the data was tampered with.
//!
//! ## Key Derivation
//!
//! [`Key`] values are produced by Argon2id (`t=1`, `m=32 MiB`, `p=1`, 32-byte output)
//! over either a password or a random seed, salted with 16 random bytes. Keys persist
//! as `base64(salt)$base64(value)`.
//!
//! ## Example
//! ```rust,no_run
//! use secman_cipher::{CipherError, Key, decrypt, encrypt};
//!
//! # fn main() -> Result<(), CipherError> {
//! let key = Key::from_password("correct horse battery staple")?;
//!
//! let sealed = encrypt(b"s3cr3t", key.value())?;
//! let opened = decrypt(&sealed, key.value())?;
//! assert_eq!(opened.as_slice(), b"s3cr3t");
//!
//! assert!(key.verify_password("correct horse battery staple"));
//! # Ok(())
//! # }
//! ```

mod seal;
mod error;
mod generate;
mod key;

pub use seal::{NONCE_LEN, TAG_LEN, check_key, decrypt, encrypt};
pub use error::{CipherError, CipherErrorExt};
pub use generate::generate;
pub use key::{KEY_LEN, Key, SALT_LEN, compare_password_to_key};
