//! # Cipher Errors
//!
//! [`CipherError`] covers key validation, sealing, key derivation and the key
//! persistence format.

use std::borrow::Cow;

/// A specialized [`CipherError`] enum for cryptographic failures.
#[secman_derive::secman_error]
pub enum CipherError {
    /// The key is not exactly [`KEY_LEN`](crate::KEY_LEN) bytes long.
    #[error("Invalid key length{}: {message}", format_context(.context))]
    InvalidKeyLength { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The payload is too short to contain a nonce.
    #[error("Malformed data{}: {message}", format_context(.context))]
    MalformedData { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Authentication failed.
    ///
    /// Deliberately covers both a wrong key and corrupted or tampered data.
    #[error("Invalid key{}", format_context(.context))]
    InvalidKey { context: Option<Cow<'static, str>> },

    /// Failure during the encryption process.
    #[error("Encryption error{}: {message}", format_context(.context))]
    Encryption { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Argon2 rejected its parameters or inputs.
    #[error("Key derivation error{}: {message}", format_context(.context))]
    KeyDerivation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The persisted key is not in the `salt$value` form.
    #[error("Invalid key format{}: {message}", format_context(.context))]
    InvalidKeyFormat { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A persisted key part is not valid base64.
    #[error("Key encoding error{}: {source}", format_context(.context))]
    Encoding { source: base64::DecodeError, context: Option<Cow<'static, str>> },

    /// The operating system RNG is unavailable.
    #[error("Random source unavailable{}: {message}", format_context(.context))]
    Rng { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal cipher error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl CipherError {
    pub(crate) fn rng(err: getrandom::Error) -> Self {
        Self::Rng { message: err.to_string().into(), context: None }
    }
}
