//! # Secret Store
//!
//! Named secrets, their collection and the handler that persists it.
//!
//! ## Layers
//!
//! 1.  **[`Secret`]**: one record whose value is always AES-256-GCM ciphertext.
//! 2.  **[`Collection`]**: the secrets of a profile, indexed by id and by name, with a
//!     versioned binary encoding.
//! 3.  **[`Handler`]**: binds a collection to a primary and an optional secondary
//!     [`Storage`](secman_storage::Storage) backend. It loads, saves, syncs and rotates
//!     keys.
//!
//! ## Envelope Encryption
//!
//! Each secret value is sealed under the *value key*. The encoded collection is
//! sealed again under the *storage key* before it reaches a backend. Rotating the
//! value key re-encrypts every value; the storage key is unaffected, and the other
//! way round.
//!
//! ## Determinism
//!
//! Timestamps and ids come from the [`Clock`] and [`IdGenerator`] capabilities passed
//! in through [`HandlerOptions`]. Tests use [`FixedClock`] and [`SequentialIds`].

mod clock;
mod collection;
mod error;
mod handler;
mod secret;

pub use clock::{Clock, FixedClock, IdGenerator, SequentialIds, SystemClock, UuidGenerator};
pub use collection::{Collection, CollectionOptions, ENCODING_VERSION};
pub use error::{StoreError, StoreErrorExt};
pub use handler::{Handler, HandlerOptions};
pub use secret::{Secret, SecretKind, SecretOptions, SecretUpdate};
