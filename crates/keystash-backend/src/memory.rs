use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use tracing::debug;

use crate::error::{BackendError, BackendResult};
use crate::query::{AttributeUpdate, ItemAttributes, MatchLimit, MatchedItem, Query, ResultPolicy};
use crate::traits::SecureBackend;
use crate::types::{Accessibility, PersistentRef};

/// Lock state of the emulated device.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeviceState {
    /// Restarted and not yet unlocked.
    BeforeFirstUnlock,
    /// Unlocked at least once since restart, currently locked.
    Locked,
    #[default]
    Unlocked,
}

impl DeviceState {
    fn allows(self, level: &Accessibility) -> bool {
        if level.requires_unlocked() {
            self == Self::Unlocked
        } else if level.requires_first_unlock() {
            self != Self::BeforeFirstUnlock
        } else {
            true
        }
    }
}

#[derive(Clone, Debug)]
struct StoredItem {
    attributes: ItemAttributes,
    data: Vec<u8>,
    persistent_ref: PersistentRef,
}

/// In-memory emulation of the platform credential service.
///
/// Intended for tests and embedding. Items live in a `Vec` behind a
/// `RwLock`; data reads are gated on the emulated [`DeviceState`] the same
/// way the platform gates them on the real lock state.
pub struct InMemoryBackend {
    items: RwLock<Vec<StoredItem>>,
    device: RwLock<DeviceState>,
    next_ref: AtomicU64,
}

impl InMemoryBackend {
    /// Create a new empty backend on an unlocked device.
    pub fn new() -> Self {
        Self {
            items: RwLock::new(Vec::new()),
            device: RwLock::new(DeviceState::Unlocked),
            next_ref: AtomicU64::new(1),
        }
    }

    /// Number of items across all classes and scopes.
    pub fn len(&self) -> usize {
        self.items.read().map(|items| items.len()).unwrap_or(0)
    }

    /// Returns `true` if no items are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current emulated lock state.
    pub fn device_state(&self) -> DeviceState {
        self.device.read().map(|s| *s).unwrap_or_default()
    }

    /// Change the emulated lock state.
    pub fn set_device_state(&self, state: DeviceState) {
        if let Ok(mut current) = self.device.write() {
            debug!(from = ?*current, to = ?state, "device state changed");
            *current = state;
        }
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> BackendError {
    BackendError::Unavailable(format!("lock poisoned: {e}"))
}

impl SecureBackend for InMemoryBackend {
    fn add(&self, query: &Query) -> BackendResult<()> {
        let data = query
            .value
            .clone()
            .ok_or_else(|| BackendError::InvalidParameter("add requires a value".into()))?;
        let synchronizable = query.synchronizable.as_flag().ok_or_else(|| {
            BackendError::InvalidParameter("add requires an explicit synchronizable flag".into())
        })?;
        let access_group = query.access_group.as_stored().ok_or_else(|| {
            BackendError::InvalidParameter("add requires a concrete access group".into())
        })?;
        let attributes = ItemAttributes {
            class: query.class,
            service: query.service.clone(),
            access_group,
            account: query.account.clone(),
            generic: query.generic.clone(),
            accessibility: query.accessibility.clone().unwrap_or_default(),
            synchronizable,
        };

        let mut items = self.items.write().map_err(poisoned)?;
        if items.iter().any(|i| i.attributes.same_identity(&attributes)) {
            return Err(BackendError::DuplicateItem);
        }
        let persistent_ref = PersistentRef::from(self.next_ref.fetch_add(1, Ordering::Relaxed));
        debug!(class = %attributes.class, %persistent_ref, "item added");
        items.push(StoredItem {
            attributes,
            data,
            persistent_ref,
        });
        Ok(())
    }

    fn update(&self, query: &Query, changes: &AttributeUpdate) -> BackendResult<()> {
        if changes.is_empty() {
            return Err(BackendError::InvalidParameter("empty update".into()));
        }
        let mut items = self.items.write().map_err(poisoned)?;
        let mut updated = 0usize;
        for item in items.iter_mut().filter(|i| query.matches(&i.attributes)) {
            if let Some(data) = &changes.value {
                item.data = data.clone();
            }
            if let Some(level) = &changes.accessibility {
                item.attributes.accessibility = level.clone();
            }
            updated += 1;
        }
        if updated == 0 {
            return Err(BackendError::ItemNotFound);
        }
        debug!(updated, "items updated");
        Ok(())
    }

    fn delete(&self, query: &Query) -> BackendResult<()> {
        let mut items = self.items.write().map_err(poisoned)?;
        let before = items.len();
        items.retain(|i| !query.matches(&i.attributes));
        let deleted = before - items.len();
        if deleted == 0 {
            return Err(BackendError::ItemNotFound);
        }
        debug!(deleted, "items deleted");
        Ok(())
    }

    fn copy_matching(
        &self,
        query: &Query,
        policy: &ResultPolicy,
    ) -> BackendResult<Vec<MatchedItem>> {
        let state = self.device_state();
        let items = self.items.read().map_err(poisoned)?;
        let limit = match policy.limit {
            MatchLimit::One => 1,
            MatchLimit::All => usize::MAX,
        };

        let mut results = Vec::new();
        for item in items.iter().filter(|i| query.matches(&i.attributes)).take(limit) {
            let data = if policy.return_data {
                if !state.allows(&item.attributes.accessibility) {
                    return Err(BackendError::InteractionNotAllowed);
                }
                Some(item.data.clone())
            } else {
                None
            };
            results.push(MatchedItem {
                data,
                attributes: policy.return_attributes.then(|| item.attributes.clone()),
                persistent_ref: policy.return_persistent_ref.then_some(item.persistent_ref),
            });
        }
        if results.is_empty() {
            return Err(BackendError::ItemNotFound);
        }
        Ok(results)
    }
}

impl std::fmt::Debug for InMemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBackend")
            .field("item_count", &self.len())
            .field("device_state", &self.device_state())
            .finish()
    }
}
