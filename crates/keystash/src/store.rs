use std::collections::HashSet;
use std::sync::Arc;

use keystash_backend::{
    Accessibility, BackendError, ItemClass, MatchedItem, PersistentRef, Query, ResultPolicy,
    SecureBackend, Synchronizable,
};
use keystash_codec::{Archived, Envelope, PayloadTag, StoredValue};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::key::EntryKey;
use crate::query::QueryBuilder;

/// Key-value facade over a platform secure credential service.
///
/// Maps `(namespace, access group, key)` to one opaque byte value in the
/// backend, with typed conveniences layered on top. The store holds no
/// mutable state: configuration is fixed at construction, and concurrent
/// use of one instance from many threads is safe by construction.
///
/// Two API halves:
/// - plain methods (`data`, `string`, `get`, `set`, `remove`, ...) collapse
///   every failure into `None`/`false`, like a simple key-value map;
/// - `try_*`/`unsafe_get` methods keep platform statuses and decode
///   failures apart as [`StoreError`].
pub struct CredentialStore {
    config: StoreConfig,
    backend: Arc<dyn SecureBackend>,
}

impl CredentialStore {
    /// Create a store over `backend` with a validated configuration.
    pub fn new(config: StoreConfig, backend: Arc<dyn SecureBackend>) -> StoreResult<Self> {
        let config = config.validated()?;
        debug!(
            namespace = %config.namespace,
            access_group = ?config.access_group,
            "credential store opened"
        );
        Ok(Self { config, backend })
    }

    /// Create a store for an explicit namespace with default settings.
    pub fn with_namespace(
        namespace: impl Into<String>,
        backend: Arc<dyn SecureBackend>,
    ) -> StoreResult<Self> {
        Self::new(StoreConfig::new(namespace), backend)
    }

    /// Create a store for the host application's default namespace.
    pub fn standard(backend: Arc<dyn SecureBackend>) -> StoreResult<Self> {
        Self::new(StoreConfig::default(), backend)
    }

    /// Create a store over the operating system's native credential store.
    #[cfg(feature = "keyring")]
    pub fn native(config: StoreConfig) -> StoreResult<Self> {
        Self::new(config, Arc::new(keystash_backend::KeyringBackend::new()))
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn namespace(&self) -> &str {
        &self.config.namespace
    }

    pub fn access_group(&self) -> Option<&str> {
        self.config.access_group.as_deref()
    }

    fn queries(&self) -> QueryBuilder<'_> {
        QueryBuilder::new(&self.config)
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    /// Returns `true` if a value can be read for `key`.
    pub fn contains(&self, key: impl Into<EntryKey>) -> bool {
        self.data(key).is_some()
    }

    /// Raw bytes stored under `key`.
    pub fn data(&self, key: impl Into<EntryKey>) -> Option<Vec<u8>> {
        let key = key.into();
        let result = self.try_data(&key);
        self.swallow("data", &key, result).flatten()
    }

    /// Raw bytes stored under `key`, keeping failure causes apart.
    pub fn try_data(&self, key: impl Into<EntryKey>) -> StoreResult<Option<Vec<u8>>> {
        let key = key.into();
        Ok(self
            .fetch(&key, &ResultPolicy::data())?
            .and_then(|item| item.data))
    }

    /// UTF-8 text stored under `key`. `None` if the bytes are not UTF-8.
    pub fn string(&self, key: impl Into<EntryKey>) -> Option<String> {
        self.get(key)
    }

    pub fn integer(&self, key: impl Into<EntryKey>) -> Option<i64> {
        self.get(key)
    }

    pub fn float(&self, key: impl Into<EntryKey>) -> Option<f32> {
        self.get(key)
    }

    pub fn double(&self, key: impl Into<EntryKey>) -> Option<f64> {
        self.get(key)
    }

    pub fn bool(&self, key: impl Into<EntryKey>) -> Option<bool> {
        self.get(key)
    }

    /// A structured value stored with [`set_object`](Self::set_object).
    pub fn object<T: Serialize + DeserializeOwned>(&self, key: impl Into<EntryKey>) -> Option<T> {
        self.get::<Archived<T>>(key).map(Archived::into_inner)
    }

    /// Typed lookup; any failure reads as `None`.
    pub fn get<T: StoredValue>(&self, key: impl Into<EntryKey>) -> Option<T> {
        let key = key.into();
        let result = self.unsafe_get::<T>(&key);
        self.swallow(T::KIND, &key, result).flatten()
    }

    /// Typed lookup that reports why it failed.
    ///
    /// - absent entry: `Ok(None)`
    /// - platform failure: [`StoreError::Status`]
    /// - present but undecodable as `T`: [`StoreError::InvalidCast`]
    pub fn unsafe_get<T: StoredValue>(&self, key: impl Into<EntryKey>) -> StoreResult<Option<T>> {
        let key = key.into();
        let Some(bytes) = self.try_data(&key)? else {
            return Ok(None);
        };
        T::decode(&bytes)
            .map(Some)
            .map_err(|source| StoreError::InvalidCast {
                key: key.name().to_string(),
                expected: T::KIND,
                source,
            })
    }

    /// Persistent handle of the entry under `key`.
    pub fn reference(&self, key: impl Into<EntryKey>) -> Option<PersistentRef> {
        let key = key.into();
        let result = self.try_reference(&key);
        self.swallow("reference", &key, result).flatten()
    }

    pub fn try_reference(&self, key: impl Into<EntryKey>) -> StoreResult<Option<PersistentRef>> {
        let key = key.into();
        Ok(self
            .fetch(&key, &ResultPolicy::persistent_ref())?
            .and_then(|item| item.persistent_ref))
    }

    /// Accessibility currently recorded on the entry under `key`.
    pub fn accessibility(&self, key: impl Into<EntryKey>) -> Option<Accessibility> {
        let key = key.into();
        let result = self.try_accessibility(&key);
        self.swallow("accessibility", &key, result).flatten()
    }

    pub fn try_accessibility(&self, key: impl Into<EntryKey>) -> StoreResult<Option<Accessibility>> {
        let key = key.into();
        Ok(self
            .fetch(&key, &ResultPolicy::attributes())?
            .and_then(|item| item.attributes)
            .map(|attrs| attrs.accessibility))
    }

    /// Every key stored under this namespace and group.
    pub fn all_keys(&self) -> HashSet<String> {
        self.try_all_keys().unwrap_or_else(|e| {
            warn!(namespace = %self.config.namespace, error = %e, "listing keys failed");
            HashSet::new()
        })
    }

    pub fn try_all_keys(&self) -> StoreResult<HashSet<String>> {
        let found = match self
            .backend
            .copy_matching(&self.queries().scope(), &ResultPolicy::all_attributes())
        {
            Ok(found) => found,
            Err(e) if e.is_not_found() => return Ok(HashSet::new()),
            Err(e) => return Err(e.into()),
        };
        let keys = found
            .into_iter()
            .filter_map(|item| item.attributes?.account)
            .filter_map(|account| match String::from_utf8(account) {
                Ok(key) => Some(key),
                Err(_) => {
                    debug!(namespace = %self.config.namespace, "skipping non-UTF-8 account");
                    None
                }
            })
            .collect();
        Ok(keys)
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Store `value` under `key`, overwriting any existing entry.
    pub fn set<T: StoredValue>(&self, value: &T, key: impl Into<EntryKey>) -> bool {
        let key = key.into();
        let result = self.try_set(value, &key);
        self.swallow("set", &key, result).is_some()
    }

    /// Store `value` under `key`, reporting why a write failed.
    pub fn try_set<T: StoredValue>(&self, value: &T, key: impl Into<EntryKey>) -> StoreResult<()> {
        let key = key.into();
        let bytes = value.encode().map_err(StoreError::Encoding)?;
        self.write(&key, bytes)
    }

    pub fn set_data(&self, value: &[u8], key: impl Into<EntryKey>) -> bool {
        let key = key.into();
        let result = self.write(&key, value.to_vec());
        self.swallow("set", &key, result).is_some()
    }

    pub fn set_string(&self, value: &str, key: impl Into<EntryKey>) -> bool {
        self.set_data(value.as_bytes(), key)
    }

    /// Store any serde value as an archived object.
    pub fn set_object<T: Serialize + ?Sized>(&self, value: &T, key: impl Into<EntryKey>) -> bool {
        let key = key.into();
        let result = Envelope::encode(PayloadTag::Archived, value)
            .map_err(StoreError::Encoding)
            .and_then(|bytes| self.write(&key, bytes));
        self.swallow("set", &key, result).is_some()
    }

    fn write(&self, key: &EntryKey, bytes: Vec<u8>) -> StoreResult<()> {
        check_key(key)?;
        let queries = self.queries();
        match self.backend.add(&queries.add(key, bytes.clone())) {
            Ok(()) => {
                debug!(namespace = %self.config.namespace, %key, "entry added");
                Ok(())
            }
            Err(BackendError::DuplicateItem) => {
                let (query, changes) = queries.update(key, bytes);
                self.backend.update(&query, &changes)?;
                debug!(namespace = %self.config.namespace, %key, "entry updated");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    // -----------------------------------------------------------------------
    // Removal
    // -----------------------------------------------------------------------

    /// Delete the entry under `key`. Deleting an absent key succeeds.
    pub fn remove(&self, key: impl Into<EntryKey>) -> bool {
        let key = key.into();
        let result = self.try_remove(&key);
        self.swallow("remove", &key, result).is_some()
    }

    /// Delete the entry under `key`. Returns `Ok(false)` if nothing was
    /// stored there.
    pub fn try_remove(&self, key: impl Into<EntryKey>) -> StoreResult<bool> {
        let key = key.into();
        check_key(&key)?;
        match self.backend.delete(&self.queries().lookup(&key)) {
            Ok(()) => {
                debug!(namespace = %self.config.namespace, %key, "entry removed");
                Ok(true)
            }
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete every entry under this namespace and group.
    pub fn remove_all(&self) -> bool {
        match self.try_remove_all() {
            Ok(()) => true,
            Err(e) => {
                warn!(namespace = %self.config.namespace, error = %e, "remove all failed");
                false
            }
        }
    }

    pub fn try_remove_all(&self) -> StoreResult<()> {
        match self.backend.delete(&self.queries().scope()) {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e.into()),
        }
        info!(
            namespace = %self.config.namespace,
            access_group = ?self.config.access_group,
            "removed all entries"
        );
        Ok(())
    }

    /// Delete every item of every class in the whole backend, regardless of
    /// namespace or group.
    ///
    /// Crosses every store's isolation boundary. Intended for administrative
    /// and test use.
    pub fn wipe_all(backend: &dyn SecureBackend) -> StoreResult<()> {
        for class in ItemClass::ALL {
            let query = Query::new(class)
                .any_group()
                .synchronizable(Synchronizable::Any);
            match backend.delete(&query) {
                Ok(()) | Err(BackendError::ItemNotFound) => {}
                Err(e) => return Err(e.into()),
            }
        }
        info!("wiped all credential items");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn fetch(&self, key: &EntryKey, policy: &ResultPolicy) -> StoreResult<Option<MatchedItem>> {
        check_key(key)?;
        match self.backend.copy_matching(&self.queries().lookup(key), policy) {
            Ok(found) => Ok(found.into_iter().next()),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Collapse an error into `None` for the non-throwing API.
    fn swallow<T>(&self, op: &'static str, key: &EntryKey, result: StoreResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e @ StoreError::Status(_)) => {
                warn!(namespace = %self.config.namespace, %key, op, error = %e, "credential call failed");
                None
            }
            Err(e) => {
                debug!(namespace = %self.config.namespace, %key, op, error = %e, "credential call failed");
                None
            }
        }
    }
}

fn check_key(key: &EntryKey) -> StoreResult<()> {
    if key.name().is_empty() {
        return Err(StoreError::InvalidKey);
    }
    Ok(())
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("namespace", &self.config.namespace)
            .field("access_group", &self.config.access_group)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keystash_backend::{AttributeUpdate, DeviceState, InMemoryBackend, ItemAttributes};
    use proptest::prelude::*;
    use serde::Deserialize;

    fn backend() -> Arc<InMemoryBackend> {
        Arc::new(InMemoryBackend::new())
    }

    fn store(backend: &Arc<InMemoryBackend>, namespace: &str) -> CredentialStore {
        CredentialStore::with_namespace(namespace, backend.clone()).unwrap()
    }

    /// Backend that rejects every call with a fixed platform status.
    struct FailingBackend(BackendError);

    impl SecureBackend for FailingBackend {
        fn add(&self, _query: &Query) -> keystash_backend::BackendResult<()> {
            Err(self.0.clone())
        }

        fn update(
            &self,
            _query: &Query,
            _changes: &AttributeUpdate,
        ) -> keystash_backend::BackendResult<()> {
            Err(self.0.clone())
        }

        fn delete(&self, _query: &Query) -> keystash_backend::BackendResult<()> {
            Err(self.0.clone())
        }

        fn copy_matching(
            &self,
            _query: &Query,
            _policy: &ResultPolicy,
        ) -> keystash_backend::BackendResult<Vec<MatchedItem>> {
            Err(self.0.clone())
        }
    }

    /// Backend holding two physical records for one identity, as left behind
    /// by an external writer. Returns both regardless of the match limit.
    struct TwinRecordBackend;

    impl TwinRecordBackend {
        fn record(data: &[u8], synchronizable: bool) -> MatchedItem {
            MatchedItem {
                data: Some(data.to_vec()),
                attributes: Some(ItemAttributes {
                    class: ItemClass::GenericPassword,
                    service: Some("svc".into()),
                    access_group: None,
                    account: Some(b"token".to_vec()),
                    generic: Some(b"token".to_vec()),
                    accessibility: Accessibility::WhenUnlocked,
                    synchronizable,
                }),
                persistent_ref: Some(PersistentRef::from(u64::from(synchronizable) + 1)),
            }
        }
    }

    impl SecureBackend for TwinRecordBackend {
        fn add(&self, _query: &Query) -> keystash_backend::BackendResult<()> {
            Err(BackendError::DuplicateItem)
        }

        fn update(
            &self,
            _query: &Query,
            _changes: &AttributeUpdate,
        ) -> keystash_backend::BackendResult<()> {
            Ok(())
        }

        fn delete(&self, _query: &Query) -> keystash_backend::BackendResult<()> {
            Ok(())
        }

        fn copy_matching(
            &self,
            _query: &Query,
            _policy: &ResultPolicy,
        ) -> keystash_backend::BackendResult<Vec<MatchedItem>> {
            Ok(vec![Self::record(b"first", false), Self::record(b"second", true)])
        }
    }

    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    #[test]
    fn empty_namespace_rejected() {
        let err = CredentialStore::with_namespace("", backend()).unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[test]
    fn standard_store_uses_default_namespace() {
        let store = CredentialStore::standard(backend()).unwrap();
        assert!(!store.namespace().is_empty());
        assert_eq!(store.access_group(), None);
    }

    // -----------------------------------------------------------------------
    // Bytes
    // -----------------------------------------------------------------------

    #[test]
    fn set_then_get_bytes() {
        let backend = backend();
        let store = store(&backend, "svc");
        assert!(store.set_data(b"secret", "token"));
        assert_eq!(store.data("token"), Some(b"secret".to_vec()));
    }

    #[test]
    fn overwrite_keeps_single_entry() {
        let backend = backend();
        let store = store(&backend, "svc");
        assert!(store.set_data(b"one", "token"));
        assert!(store.set_data(b"two", "token"));
        assert_eq!(store.data("token"), Some(b"two".to_vec()));
        assert_eq!(backend.len(), 1);
    }

    #[test]
    fn missing_key_reads_none() {
        let backend = backend();
        let store = store(&backend, "svc");
        assert_eq!(store.data("nope"), None);
        assert_eq!(store.try_data("nope").unwrap(), None);
        assert!(store.unsafe_get::<String>("nope").unwrap().is_none());
    }

    #[test]
    fn empty_key_is_invalid() {
        let backend = backend();
        let store = store(&backend, "svc");
        assert!(!store.set_data(b"v", ""));
        assert!(matches!(store.try_data(""), Err(StoreError::InvalidKey)));
        assert!(matches!(store.try_remove(""), Err(StoreError::InvalidKey)));
        assert!(backend.is_empty());
    }

    #[test]
    fn contains_reflects_presence() {
        let backend = backend();
        let store = store(&backend, "svc");
        assert!(!store.contains("fresh-1"));
        assert!(store.set_string("x", "fresh-1"));
        assert!(store.contains("fresh-1"));
    }

    // -----------------------------------------------------------------------
    // Typed values
    // -----------------------------------------------------------------------

    #[test]
    fn typed_values_read_back() {
        let backend = backend();
        let store = store(&backend, "svc");
        assert!(store.set(&42i64, "int"));
        assert!(store.set(&5.25f32, "float"));
        assert!(store.set(&10.75f64, "double"));
        assert!(store.set(&true, "flag"));
        assert!(store.set(&"hello".to_string(), "text"));

        assert_eq!(store.integer("int"), Some(42));
        assert_eq!(store.float("float"), Some(5.25));
        assert_eq!(store.double("double"), Some(10.75));
        assert_eq!(store.bool("flag"), Some(true));
        assert_eq!(store.string("text").as_deref(), Some("hello"));
    }

    #[test]
    fn numbers_convert_between_widths() {
        let backend = backend();
        let store = store(&backend, "svc");
        assert!(store.set(&7i64, "n"));
        assert_eq!(store.double("n"), Some(7.0));
        assert_eq!(store.get::<i32>("n"), Some(7));
        assert_eq!(store.bool("n"), Some(true));
    }

    #[test]
    fn string_is_plain_utf8_data() {
        let backend = backend();
        let store = store(&backend, "svc");
        assert!(store.set_string("pässword", "text"));
        assert_eq!(store.data("text"), Some("pässword".as_bytes().to_vec()));
    }

    #[test]
    fn wrong_type_is_invalid_cast() {
        let backend = backend();
        let store = store(&backend, "svc");
        assert!(store.set_string("abc", "text"));

        let err = store.unsafe_get::<i64>("text").unwrap_err();
        match err {
            StoreError::InvalidCast { key, expected, .. } => {
                assert_eq!(key, "text");
                assert_eq!(expected, "i64");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(store.integer("text"), None);
    }

    #[test]
    fn boxed_number_is_not_a_string() {
        let backend = backend();
        let store = store(&backend, "svc");
        assert!(store.set(&42i64, "n"));
        assert_eq!(store.string("n"), None);
        assert!(matches!(
            store.unsafe_get::<String>("n"),
            Err(StoreError::InvalidCast { expected: "string", .. })
        ));
        assert_eq!(store.integer("n"), Some(42));
    }

    #[test]
    fn invalid_utf8_is_not_a_string() {
        let backend = backend();
        let store = store(&backend, "svc");
        assert!(store.set_data(&[0xff, 0xfe, 0x00], "raw"));
        assert_eq!(store.string("raw"), None);
        assert!(matches!(
            store.unsafe_get::<String>("raw"),
            Err(StoreError::InvalidCast { expected: "string", .. })
        ));
        assert!(store.data("raw").is_some());
    }

    #[test]
    fn narrowing_overflow_is_invalid_cast() {
        let backend = backend();
        let store = store(&backend, "svc");
        assert!(store.set(&(i64::from(u32::MAX) + 1), "big"));
        assert!(matches!(
            store.unsafe_get::<u32>("big"),
            Err(StoreError::InvalidCast { .. })
        ));
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Session {
        user: String,
        scopes: Vec<String>,
        expires_at: u64,
    }

    #[test]
    fn objects_read_back() {
        let backend = backend();
        let store = store(&backend, "svc");
        let session = Session {
            user: "ada".into(),
            scopes: vec!["read".into(), "write".into()],
            expires_at: 1_700_000_000,
        };
        assert!(store.set_object(&session, "session"));
        assert_eq!(store.object::<Session>("session"), Some(session));
        assert_eq!(store.object::<Session>("missing"), None);
    }

    #[test]
    fn object_from_plain_bytes_is_none() {
        let backend = backend();
        let store = store(&backend, "svc");
        assert!(store.set_data(b"not an archive", "session"));
        assert_eq!(store.object::<Session>("session"), None);
    }

    // -----------------------------------------------------------------------
    // Removal and listing
    // -----------------------------------------------------------------------

    #[test]
    fn remove_then_absent() {
        let backend = backend();
        let store = store(&backend, "svc");
        assert!(store.set_data(b"v", "token"));
        assert!(store.remove("token"));
        assert!(!store.contains("token"));
    }

    #[test]
    fn removing_absent_key_succeeds() {
        let backend = backend();
        let store = store(&backend, "svc");
        assert!(store.remove("ghost"));
        assert!(!store.try_remove("ghost").unwrap());
        assert!(store.set_data(b"v", "ghost"));
        assert!(store.try_remove("ghost").unwrap());
    }

    #[test]
    fn all_keys_tracks_entries() {
        let backend = backend();
        let store = store(&backend, "svc");
        assert!(store.all_keys().is_empty());
        assert!(store.set_string("1", "a"));
        assert!(store.set_string("2", "b"));
        assert_eq!(
            store.all_keys(),
            HashSet::from(["a".to_string(), "b".to_string()])
        );
        assert!(store.remove("a"));
        assert_eq!(store.all_keys(), HashSet::from(["b".to_string()]));
    }

    #[test]
    fn all_keys_includes_synchronizable_entries() {
        let backend = backend();
        let store = store(&backend, "svc");
        assert!(store.set_string("1", "local"));
        assert!(store.set_string("2", EntryKey::new("shared").synchronizable(true)));
        assert_eq!(store.all_keys().len(), 2);
    }

    #[test]
    fn all_keys_collapses_local_and_synchronizable_twins() {
        let backend = backend();
        let store = store(&backend, "svc");
        assert!(store.set_string("a", "token"));
        assert!(store.set_string("b", EntryKey::new("token").synchronizable(true)));
        assert_eq!(backend.len(), 2);
        assert_eq!(store.all_keys(), HashSet::from(["token".to_string()]));
    }

    #[test]
    fn duplicate_physical_records_read_first() {
        let store = CredentialStore::with_namespace("svc", Arc::new(TwinRecordBackend)).unwrap();
        assert_eq!(store.data("token"), Some(b"first".to_vec()));
        assert_eq!(store.string("token").as_deref(), Some("first"));
        assert_eq!(store.reference("token"), Some(PersistentRef::from(1u64)));
        assert_eq!(store.all_keys(), HashSet::from(["token".to_string()]));
    }

    #[test]
    fn remove_all_only_touches_own_namespace() {
        let backend = backend();
        let mine = store(&backend, "mine");
        let theirs = store(&backend, "theirs");
        assert!(mine.set_string("1", "a"));
        assert!(mine.set_string("2", "b"));
        assert!(theirs.set_string("3", "a"));

        assert!(mine.remove_all());
        assert!(mine.all_keys().is_empty());
        assert_eq!(theirs.string("a").as_deref(), Some("3"));
    }

    #[test]
    fn remove_all_on_empty_namespace_succeeds() {
        let backend = backend();
        let store = store(&backend, "svc");
        assert!(store.remove_all());
        store.try_remove_all().unwrap();
    }

    #[test]
    fn wipe_all_clears_every_namespace_and_class() {
        let backend = backend();
        let one = store(&backend, "one");
        let grouped = CredentialStore::new(
            StoreConfig::new("two").with_access_group("team"),
            backend.clone(),
        )
        .unwrap();
        assert!(one.set_string("1", "a"));
        assert!(grouped.set_string("2", "b"));
        backend
            .add(
                &Query::new(ItemClass::InternetPassword)
                    .service("example.com")
                    .account(b"ada".to_vec())
                    .value(b"pw".to_vec()),
            )
            .unwrap();
        assert_eq!(backend.len(), 3);

        CredentialStore::wipe_all(backend.as_ref()).unwrap();
        assert!(backend.is_empty());
        CredentialStore::wipe_all(backend.as_ref()).unwrap();
    }

    // -----------------------------------------------------------------------
    // Scoping
    // -----------------------------------------------------------------------

    #[test]
    fn namespaces_are_isolated() {
        let backend = backend();
        let a = store(&backend, "app-a");
        let b = store(&backend, "app-b");
        assert!(a.set_string("from-a", "token"));
        assert!(b.set_string("from-b", "token"));
        assert_eq!(a.string("token").as_deref(), Some("from-a"));
        assert_eq!(b.string("token").as_deref(), Some("from-b"));
        assert_eq!(a.all_keys().len(), 1);
    }

    #[test]
    fn other_namespace_cannot_see_key() {
        let backend = backend();
        let a = store(&backend, "app-a");
        let b = store(&backend, "app-b");
        assert!(a.set_string("v", "shared-key"));
        assert!(!b.contains("shared-key"));
        assert!(b.all_keys().is_empty());
    }

    #[test]
    fn access_groups_are_isolated() {
        let backend = backend();
        let plain = store(&backend, "svc");
        let grouped = CredentialStore::new(
            StoreConfig::new("svc").with_access_group("team"),
            backend.clone(),
        )
        .unwrap();
        assert_eq!(grouped.access_group(), Some("team"));
        assert!(grouped.set_string("shared", "token"));
        assert_eq!(plain.string("token"), None);
        assert!(plain.all_keys().is_empty());
        assert_eq!(grouped.all_keys().len(), 1);
    }

    #[test]
    fn synchronizable_entries_are_distinct() {
        let backend = backend();
        let store = store(&backend, "svc");
        let synced = EntryKey::new("token").synchronizable(true);
        assert!(store.set_string("local", "token"));
        assert!(store.set_string("cloud", &synced));
        assert_eq!(store.string("token").as_deref(), Some("local"));
        assert_eq!(store.string(&synced).as_deref(), Some("cloud"));
        assert_eq!(backend.len(), 2);
    }

    // -----------------------------------------------------------------------
    // Accessibility
    // -----------------------------------------------------------------------

    #[test]
    fn default_accessibility_applies_to_fresh_writes() {
        let backend = backend();
        let store = CredentialStore::new(
            StoreConfig::new("svc").with_default_accessibility(Accessibility::AfterFirstUnlock),
            backend.clone(),
        )
        .unwrap();
        assert!(store.set_string("v", "token"));
        assert_eq!(
            store.accessibility("token"),
            Some(Accessibility::AfterFirstUnlock)
        );
    }

    #[test]
    fn update_without_level_keeps_stored_accessibility() {
        let backend = backend();
        let store = store(&backend, "svc");
        let key = EntryKey::new("token").accessible(Accessibility::AfterFirstUnlockThisDeviceOnly);
        assert!(store.set_string("one", &key));
        assert!(store.set_string("two", "token"));
        assert_eq!(store.string("token").as_deref(), Some("two"));
        assert_eq!(
            store.accessibility("token"),
            Some(Accessibility::AfterFirstUnlockThisDeviceOnly)
        );
    }

    #[test]
    fn update_with_level_rewrites_accessibility() {
        let backend = backend();
        let store = store(&backend, "svc");
        assert!(store.set_string("one", "token"));
        let key = EntryKey::new("token").accessible(Accessibility::AfterFirstUnlock);
        assert!(store.set_string("two", &key));
        assert_eq!(
            store.accessibility("token"),
            Some(Accessibility::AfterFirstUnlock)
        );
        assert_eq!(backend.len(), 1);
    }

    #[test]
    fn lookup_with_other_level_misses() {
        let backend = backend();
        let store = store(&backend, "svc");
        assert!(store.set_string("v", "token"));
        let key = EntryKey::new("token").accessible(Accessibility::AfterFirstUnlock);
        assert_eq!(store.string(&key), None);
    }

    #[test]
    fn locked_device_reports_interaction_not_allowed() {
        let backend = backend();
        let store = store(&backend, "svc");
        assert!(store.set_string("secret", "token"));
        backend.set_device_state(DeviceState::Locked);

        assert_eq!(store.data("token"), None);
        assert!(!store.contains("token"));
        let err = store.unsafe_get::<String>("token").unwrap_err();
        assert!(matches!(
            err,
            StoreError::Status(BackendError::InteractionNotAllowed)
        ));
        assert_eq!(err.status_code(), Some(BackendError::INTERACTION_NOT_ALLOWED));

        // Attributes stay readable while locked.
        assert_eq!(store.all_keys().len(), 1);
        assert_eq!(store.accessibility("token"), Some(Accessibility::WhenUnlocked));

        backend.set_device_state(DeviceState::Unlocked);
        assert_eq!(store.string("token").as_deref(), Some("secret"));
    }

    #[test]
    fn after_first_unlock_readable_while_locked() {
        let backend = backend();
        let store = store(&backend, "svc");
        let key = EntryKey::new("bg").accessible(Accessibility::AfterFirstUnlock);
        assert!(store.set_string("background", &key));

        backend.set_device_state(DeviceState::Locked);
        assert_eq!(store.string("bg").as_deref(), Some("background"));

        backend.set_device_state(DeviceState::BeforeFirstUnlock);
        assert_eq!(store.string("bg"), None);
    }

    // -----------------------------------------------------------------------
    // References
    // -----------------------------------------------------------------------

    #[test]
    fn reference_is_stable_across_updates() {
        let backend = backend();
        let store = store(&backend, "svc");
        assert_eq!(store.reference("token"), None);
        assert!(store.set_string("one", "token"));
        let first = store.reference("token").unwrap();
        assert!(store.set_string("two", "token"));
        assert_eq!(store.reference("token"), Some(first));

        assert!(store.remove("token"));
        assert!(store.set_string("three", "token"));
        assert_ne!(store.reference("token"), Some(first));
    }

    // -----------------------------------------------------------------------
    // Platform failures
    // -----------------------------------------------------------------------

    #[test]
    fn platform_status_surfaces_through_try_api() {
        let failing = Arc::new(FailingBackend(BackendError::Other {
            code: -34018,
            message: "missing entitlement".into(),
        }));
        let store = CredentialStore::with_namespace("svc", failing.clone()).unwrap();

        assert!(!store.set_string("v", "token"));
        assert_eq!(store.data("token"), None);
        assert!(!store.remove("token"));
        assert!(!store.remove_all());
        assert!(store.all_keys().is_empty());

        let err = store.try_set(&1i64, "token").unwrap_err();
        assert_eq!(err.status_code(), Some(-34018));
        assert_eq!(store.try_data("token").unwrap_err().status_code(), Some(-34018));
        assert!(CredentialStore::wipe_all(failing.as_ref()).is_err());
    }

    #[test]
    fn not_found_is_never_an_error() {
        let store =
            CredentialStore::with_namespace("svc", Arc::new(FailingBackend(BackendError::ItemNotFound)))
                .unwrap();
        assert_eq!(store.try_data("token").unwrap(), None);
        assert!(!store.try_remove("token").unwrap());
        assert!(store.try_all_keys().unwrap().is_empty());
        store.try_remove_all().unwrap();
    }

    #[cfg(feature = "keyring")]
    #[test]
    fn native_store_reports_unsupported_scope_calls() {
        let store = CredentialStore::native(StoreConfig::new("keystash-test")).unwrap();
        assert!(matches!(
            store.try_all_keys(),
            Err(StoreError::Status(BackendError::Unavailable(_)))
        ));
        assert!(store.all_keys().is_empty());
        assert!(!store.remove_all());
        let backend = keystash_backend::KeyringBackend::new();
        assert!(CredentialStore::wipe_all(&backend).is_err());
    }

    #[test]
    fn shared_instance_across_threads() {
        let backend = backend();
        let store = store(&backend, "svc");
        std::thread::scope(|s| {
            for t in 0..4i64 {
                let store = &store;
                s.spawn(move || {
                    for i in 0..25i64 {
                        assert!(store.set(&(t * 100 + i), format!("k{t}-{i}")));
                    }
                });
            }
        });
        assert_eq!(store.all_keys().len(), 100);
        assert_eq!(store.integer("k3-24"), Some(324));
    }

    #[test]
    fn store_from_toml_config() {
        let config = StoreConfig::from_toml_str(
            "namespace = \"com.example.app\"\ndefault_accessibility = \"after-first-unlock\"",
        )
        .unwrap();
        let backend = backend();
        let store = CredentialStore::new(config, backend.clone()).unwrap();
        assert!(store.set_string("v", "token"));
        backend.set_device_state(DeviceState::Locked);
        assert_eq!(store.string("token").as_deref(), Some("v"));
    }

    #[test]
    fn debug_omits_values() {
        let backend = backend();
        let store = store(&backend, "svc");
        assert!(store.set_string("hunter2", "token"));
        let rendered = format!("{store:?}");
        assert!(rendered.contains("svc"));
        assert!(!rendered.contains("hunter2"));
    }

    proptest! {
        #[test]
        fn any_bytes_read_back(value in proptest::collection::vec(any::<u8>(), 0..256),
                               key in "[a-z][a-z0-9._-]{0,24}") {
            let backend = backend();
            let store = store(&backend, "prop");
            prop_assert!(store.set_data(&value, key.as_str()));
            prop_assert_eq!(store.data(key.as_str()), Some(value));
        }

        #[test]
        fn any_i64_reads_back(n in any::<i64>()) {
            let backend = backend();
            let store = store(&backend, "prop");
            prop_assert!(store.set(&n, "n"));
            prop_assert_eq!(store.integer("n"), Some(n));
        }

        #[test]
        fn overwrite_keeps_latest_value(first in proptest::collection::vec(any::<u8>(), 0..128),
                                        second in proptest::collection::vec(any::<u8>(), 0..128),
                                        key in "[a-z][a-z0-9._-]{0,24}") {
            let backend = backend();
            let store = store(&backend, "prop");
            prop_assert!(store.set_data(&first, key.as_str()));
            prop_assert!(store.set_data(&second, key.as_str()));
            prop_assert_eq!(store.data(key.as_str()), Some(second));
            prop_assert_eq!(backend.len(), 1);
        }
    }
}
