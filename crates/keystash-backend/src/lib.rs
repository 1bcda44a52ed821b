//! The secure credential service contract consumed by keystash.
//!
//! A platform credential store (a keychain, a credential manager, a secret
//! service) is modelled as a black box with exactly four primitives:
//! `add`, `update`, `delete` and `copy_matching`. Each takes a [`Query`]
//! describing the item identity and attributes, and reports failure as a
//! [`BackendError`] carrying a numeric platform status.
//!
//! # Backends
//!
//! All backends implement the [`SecureBackend`] trait:
//!
//! - `KeyringBackend` -- the operating system's native credential store
//!   (feature `keyring`, on by default)
//! - [`InMemoryBackend`] -- emulation of the platform service for tests and
//!   embedding, including device lock state
//!
//! # Rules
//!
//! 1. One identity, at most one live item.
//! 2. `add` never overwrites; callers fall back to `update` themselves.
//! 3. The backend never interprets item payloads.
//! 4. Encryption at rest and access control belong to the platform.

pub mod error;
pub mod memory;
#[cfg(feature = "keyring")]
pub mod platform;
pub mod query;
pub mod traits;
pub mod types;

pub use error::{BackendError, BackendResult};
pub use memory::{DeviceState, InMemoryBackend};
#[cfg(feature = "keyring")]
pub use platform::KeyringBackend;
pub use query::{AttributeUpdate, ItemAttributes, MatchLimit, MatchedItem, Query, ResultPolicy};
pub use traits::SecureBackend;
pub use types::{Accessibility, GroupScope, ItemClass, PersistentRef, Synchronizable};
