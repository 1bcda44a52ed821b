//! A key-value facade over a platform secure credential store.
//!
//! [`CredentialStore`] maps string keys to small secrets (tokens,
//! passwords, flags, serialized objects) held by a [`SecureBackend`]. Every
//! key is scoped by the store's namespace and optional access group, so
//! independent stores can share one backend without seeing each other's
//! entries.
//!
//! ```ignore
//! use std::sync::Arc;
//! use keystash::{CredentialStore, EntryKey, InMemoryBackend, Accessibility};
//!
//! let store = CredentialStore::with_namespace("com.example.app", Arc::new(InMemoryBackend::new()))?;
//! store.set_string("s3cr3t", "api-token");
//! store.set(&3i64, EntryKey::new("retries").accessible(Accessibility::AfterFirstUnlock));
//!
//! assert_eq!(store.string("api-token").as_deref(), Some("s3cr3t"));
//! assert_eq!(store.integer("retries"), Some(3));
//! ```
//!
//! # Crate layout
//!
//! - `keystash-backend` -- the credential service contract and an in-memory
//!   emulation
//! - `keystash-codec` -- the stored-value encodings
//! - `keystash` (this crate) -- configuration, keys and the facade

pub mod config;
pub mod error;
pub mod key;
mod query;
pub mod store;

pub use config::{default_namespace, StoreConfig, FALLBACK_NAMESPACE};
pub use error::{StoreError, StoreResult};
pub use key::EntryKey;
pub use store::CredentialStore;

pub use keystash_backend::{
    Accessibility, BackendError, DeviceState, InMemoryBackend, PersistentRef, SecureBackend,
};
#[cfg(feature = "keyring")]
pub use keystash_backend::KeyringBackend;
pub use keystash_codec::{Archived, NumberBox, StoredValue};
