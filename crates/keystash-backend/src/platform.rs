use tracing::debug;

use crate::error::{BackendError, BackendResult};
use crate::query::{AttributeUpdate, ItemAttributes, MatchedItem, Query, ResultPolicy};
use crate::traits::SecureBackend;
use crate::types::{Accessibility, GroupScope, ItemClass, Synchronizable};

/// Backend over the operating system's native credential store.
///
/// Dispatches through the `keyring` crate to:
///   - macOS: Security.framework Keychain
///   - Windows: Windows Credential Manager
///   - Linux: kernel keyutils
///
/// The native stores are addressed by `(service, account)` only, so this
/// backend supports per-key operations on generic items and nothing
/// wider:
///   - namespace-wide listing and deletion report `Unavailable`
///   - synchronizable items are rejected
///   - accessibility is left to the platform default and reported as
///     [`Accessibility::DEFAULT`]
///   - items carry no persistent reference
///
/// An access group is folded into the native service name as
/// `"<group>/<service>"`.
#[derive(Debug, Default)]
pub struct KeyringBackend;

/// Native address of one item.
#[derive(Debug, PartialEq, Eq)]
struct Target {
    service: String,
    group: Option<String>,
    account: String,
}

impl Target {
    fn native_service(&self) -> String {
        match &self.group {
            Some(group) => format!("{group}/{}", self.service),
            None => self.service.clone(),
        }
    }

    fn entry(&self) -> BackendResult<::keyring::Entry> {
        ::keyring::Entry::new(&self.native_service(), &self.account).map_err(map_error)
    }

    fn attributes(&self) -> ItemAttributes {
        let account = self.account.as_bytes().to_vec();
        ItemAttributes {
            class: ItemClass::GenericPassword,
            service: Some(self.service.clone()),
            access_group: self.group.clone(),
            account: Some(account.clone()),
            generic: Some(account),
            accessibility: Accessibility::DEFAULT,
            synchronizable: false,
        }
    }
}

impl KeyringBackend {
    pub fn new() -> Self {
        Self
    }

    /// Resolve `query` to a single native item.
    ///
    /// `Ok(None)` means the query cannot match anything this backend stores.
    fn target(query: &Query) -> BackendResult<Option<Target>> {
        if query.class != ItemClass::GenericPassword {
            return Ok(None);
        }
        if query.synchronizable == Synchronizable::Yes {
            return Ok(None);
        }
        let group = match &query.access_group {
            GroupScope::Ungrouped => None,
            GroupScope::Named(group) => Some(group.clone()),
            GroupScope::Any => {
                return Err(BackendError::Unavailable(
                    "the platform keyring cannot search across access groups".into(),
                ))
            }
        };
        let (Some(service), Some(account)) = (&query.service, &query.account) else {
            return Err(BackendError::Unavailable(
                "the platform keyring only supports per-account lookups".into(),
            ));
        };
        let account = String::from_utf8(account.clone()).map_err(|_| {
            BackendError::InvalidParameter("account must be valid UTF-8".into())
        })?;
        Ok(Some(Target {
            service: service.clone(),
            group,
            account,
        }))
    }
}

/// Translate a keyring failure into a platform status.
fn map_error(err: ::keyring::Error) -> BackendError {
    match err {
        ::keyring::Error::NoEntry => BackendError::ItemNotFound,
        ::keyring::Error::NoStorageAccess(_) => BackendError::InteractionNotAllowed,
        ::keyring::Error::TooLong(attr, limit) => {
            BackendError::InvalidParameter(format!("{attr} longer than {limit}"))
        }
        ::keyring::Error::Invalid(attr, reason) => {
            BackendError::InvalidParameter(format!("{attr}: {reason}"))
        }
        other => BackendError::Unavailable(other.to_string()),
    }
}

impl SecureBackend for KeyringBackend {
    fn add(&self, query: &Query) -> BackendResult<()> {
        let data = query
            .value
            .as_deref()
            .ok_or_else(|| BackendError::InvalidParameter("add requires a value".into()))?;
        if query.synchronizable != Synchronizable::No {
            return Err(BackendError::InvalidParameter(
                "the platform keyring does not store synchronizable items".into(),
            ));
        }
        let target = Self::target(query)?.ok_or_else(|| {
            BackendError::InvalidParameter(format!(
                "the platform keyring does not store {} items",
                query.class
            ))
        })?;
        let entry = target.entry()?;
        match entry.get_secret() {
            Ok(_) => return Err(BackendError::DuplicateItem),
            Err(::keyring::Error::NoEntry) => {}
            Err(e) => return Err(map_error(e)),
        }
        entry.set_secret(data).map_err(map_error)?;
        debug!(service = %target.native_service(), "keyring item added");
        Ok(())
    }

    fn update(&self, query: &Query, changes: &AttributeUpdate) -> BackendResult<()> {
        if changes.is_empty() {
            return Err(BackendError::InvalidParameter("empty update".into()));
        }
        let target = Self::target(query)?.ok_or(BackendError::ItemNotFound)?;
        let entry = target.entry()?;
        entry.get_secret().map_err(map_error)?;
        if let Some(data) = &changes.value {
            entry.set_secret(data).map_err(map_error)?;
        }
        debug!(service = %target.native_service(), "keyring item updated");
        Ok(())
    }

    fn delete(&self, query: &Query) -> BackendResult<()> {
        let target = Self::target(query)?.ok_or(BackendError::ItemNotFound)?;
        target.entry()?.delete_credential().map_err(map_error)?;
        debug!(service = %target.native_service(), "keyring item deleted");
        Ok(())
    }

    fn copy_matching(
        &self,
        query: &Query,
        policy: &ResultPolicy,
    ) -> BackendResult<Vec<MatchedItem>> {
        let target = Self::target(query)?.ok_or(BackendError::ItemNotFound)?;
        if query
            .accessibility
            .as_ref()
            .is_some_and(|level| *level != Accessibility::DEFAULT)
        {
            return Err(BackendError::ItemNotFound);
        }
        let secret = target.entry()?.get_secret().map_err(map_error)?;
        Ok(vec![MatchedItem {
            data: policy.return_data.then_some(secret),
            attributes: policy.return_attributes.then(|| target.attributes()),
            persistent_ref: None,
        }])
    }
}
