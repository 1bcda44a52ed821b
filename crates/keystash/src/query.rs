//! Identity and attribute construction for every backend call.

use keystash_backend::{AttributeUpdate, ItemClass, Query, Synchronizable};

use crate::config::StoreConfig;
use crate::key::EntryKey;

/// Builds backend queries for one store configuration.
pub(crate) struct QueryBuilder<'a> {
    config: &'a StoreConfig,
}

impl<'a> QueryBuilder<'a> {
    pub(crate) fn new(config: &'a StoreConfig) -> Self {
        Self { config }
    }

    /// Every generic item owned by this namespace and group, synchronizable
    /// or not.
    pub(crate) fn scope(&self) -> Query {
        Query::new(ItemClass::GenericPassword)
            .service(self.config.namespace.clone())
            .access_group(self.config.access_group.clone())
            .synchronizable(Synchronizable::Any)
    }

    /// The item identity of `key`, without accessibility.
    ///
    /// The key bytes go into both the account and the generic attribute so
    /// that entries written by equivalent keychain wrappers stay readable.
    pub(crate) fn identity(&self, key: &EntryKey) -> Query {
        let encoded = key.name().as_bytes().to_vec();
        self.scope()
            .account(encoded.clone())
            .generic(encoded)
            .synchronizable(Synchronizable::from(key.is_synchronizable()))
    }

    /// Lookup/delete query: the identity, constrained by accessibility only
    /// when the caller named one.
    pub(crate) fn lookup(&self, key: &EntryKey) -> Query {
        self.identity(key).accessibility(key.accessibility().cloned())
    }

    /// Fresh write: falls back to the configured default accessibility.
    pub(crate) fn add(&self, key: &EntryKey, value: Vec<u8>) -> Query {
        let level = key
            .accessibility()
            .cloned()
            .unwrap_or_else(|| self.config.default_accessibility.clone());
        self.identity(key).accessibility(Some(level)).value(value)
    }

    /// Overwrite of an existing entry. Accessibility is only rewritten when
    /// the caller named one; otherwise the stored level is kept.
    pub(crate) fn update(&self, key: &EntryKey, value: Vec<u8>) -> (Query, AttributeUpdate) {
        let changes =
            AttributeUpdate::value(value).with_accessibility(key.accessibility().cloned());
        (self.identity(key), changes)
    }
}
