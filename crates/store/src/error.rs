//! # Store Errors
//!
//! [`StoreError`] keeps the failure taxonomy of the store: validation, not found,
//! conflict, cryptographic and I/O. Persistence failures are wrapped once more in
//! [`StoreError::LoadCollection`] or [`StoreError::SaveCollection`] so callers can
//! tell which pipeline failed while still reaching the cause through `source()`.

use secman_cipher::CipherError;
use secman_storage::StorageError;
use std::borrow::Cow;

/// A specialized [`StoreError`] enum of this crate.
#[secman_derive::secman_error]
pub enum StoreError {
    /// Construction input was rejected, e.g. an empty profile id.
    #[error("Invalid configuration{}: {message}", format_context(.context))]
    InvalidConfiguration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A secret with the same id or name is already in the collection.
    #[error("A secret with that ID or name already exists{}: {message}", format_context(.context))]
    AlreadyExists { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Collection level lookup miss.
    #[error("Secret not found in collection{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Handler level lookup miss.
    #[error("A secret with that identifier cannot be found{}: {message}", format_context(.context))]
    SecretNotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The replacement would change an immutable identity field.
    #[error("Invalid update{}: {message}", format_context(.context))]
    InvalidUpdate { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Cipher failure{}: {source}", format_context(.context))]
    Cipher { source: CipherError, context: Option<Cow<'static, str>> },

    #[error("Storage failure{}: {source}", format_context(.context))]
    Storage { source: StorageError, context: Option<Cow<'static, str>> },

    #[error("Codec failure{}: {source}", format_context(.context))]
    Codec { source: postcard::Error, context: Option<Cow<'static, str>> },

    /// The decoded collection is structurally inconsistent.
    #[error("Corrupted collection{}: {message}", format_context(.context))]
    Corrupted { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Load collection failed{}: {cause}", format_context(.context))]
    LoadCollection {
        #[source]
        cause: Box<StoreError>,
        context: Option<Cow<'static, str>>,
    },

    #[error("Save collection failed{}: {cause}", format_context(.context))]
    SaveCollection {
        #[source]
        cause: Box<StoreError>,
        context: Option<Cow<'static, str>>,
    },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal store error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl StoreError {
    /// Returns `true` if the root cause is a storage backend that holds no data yet.
    #[must_use]
    pub fn is_source_not_found(&self) -> bool {
        match self {
            Self::Storage { source, .. } => source.is_source_not_found(),
            Self::LoadCollection { cause, .. } | Self::SaveCollection { cause, .. } => {
                cause.is_source_not_found()
            },
            _ => false,
        }
    }

    pub(crate) fn load(cause: Self) -> Self {
        Self::LoadCollection { cause: Box::new(cause), context: None }
    }

    pub(crate) fn save(cause: Self) -> Self {
        Self::SaveCollection { cause: Box::new(cause), context: None }
    }
}
