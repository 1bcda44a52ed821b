//! Attribute records exchanged with a [`SecureBackend`](crate::SecureBackend).

use crate::types::{Accessibility, GroupScope, ItemClass, PersistentRef, Synchronizable};

/// Match attributes for a backend call.
///
/// Absent attributes do not constrain the match, with two exceptions that
/// keep scopes isolated: the access group defaults to
/// [`GroupScope::Ungrouped`] and synchronizable defaults to
/// [`Synchronizable::No`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Query {
    pub class: ItemClass,
    pub service: Option<String>,
    pub access_group: GroupScope,
    pub account: Option<Vec<u8>>,
    pub generic: Option<Vec<u8>>,
    pub accessibility: Option<Accessibility>,
    pub synchronizable: Synchronizable,
    /// Payload to store. Only read by `add`.
    pub value: Option<Vec<u8>>,
}

impl Query {
    /// An unconstrained query over one item class.
    pub fn new(class: ItemClass) -> Self {
        Self {
            class,
            service: None,
            access_group: GroupScope::Ungrouped,
            account: None,
            generic: None,
            accessibility: None,
            synchronizable: Synchronizable::No,
            value: None,
        }
    }

    pub fn service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    pub fn access_group(mut self, group: Option<String>) -> Self {
        self.access_group = GroupScope::from(group);
        self
    }

    /// Match items under every access group.
    pub fn any_group(mut self) -> Self {
        self.access_group = GroupScope::Any;
        self
    }

    pub fn account(mut self, account: impl Into<Vec<u8>>) -> Self {
        self.account = Some(account.into());
        self
    }

    pub fn generic(mut self, generic: impl Into<Vec<u8>>) -> Self {
        self.generic = Some(generic.into());
        self
    }

    pub fn accessibility(mut self, level: Option<Accessibility>) -> Self {
        self.accessibility = level;
        self
    }

    pub fn synchronizable(mut self, sync: Synchronizable) -> Self {
        self.synchronizable = sync;
        self
    }

    pub fn value(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.value = Some(data.into());
        self
    }

    /// Returns `true` if a stored item with `attrs` satisfies this query.
    pub fn matches(&self, attrs: &ItemAttributes) -> bool {
        self.class == attrs.class
            && opt_matches(&self.service, &attrs.service)
            && self.access_group.matches(attrs.access_group.as_deref())
            && opt_matches(&self.account, &attrs.account)
            && opt_matches(&self.generic, &attrs.generic)
            && self
                .accessibility
                .as_ref()
                .map_or(true, |level| *level == attrs.accessibility)
            && self.synchronizable.matches(attrs.synchronizable)
    }
}

fn opt_matches<T: PartialEq>(wanted: &Option<T>, stored: &Option<T>) -> bool {
    match wanted {
        Some(w) => stored.as_ref() == Some(w),
        None => true,
    }
}

/// How many matches `copy_matching` may return.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MatchLimit {
    #[default]
    One,
    All,
}

/// What `copy_matching` returns for each matched item.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResultPolicy {
    pub limit: MatchLimit,
    pub return_data: bool,
    pub return_attributes: bool,
    pub return_persistent_ref: bool,
}

impl ResultPolicy {
    /// The payload of at most one item.
    pub fn data() -> Self {
        Self {
            return_data: true,
            ..Default::default()
        }
    }

    /// The persistent handle of at most one item.
    pub fn persistent_ref() -> Self {
        Self {
            return_persistent_ref: true,
            ..Default::default()
        }
    }

    /// The attribute record of at most one item.
    pub fn attributes() -> Self {
        Self {
            return_attributes: true,
            ..Default::default()
        }
    }

    /// Attribute records of every match.
    pub fn all_attributes() -> Self {
        Self {
            limit: MatchLimit::All,
            return_attributes: true,
            ..Default::default()
        }
    }
}

/// The attribute record of a stored item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemAttributes {
    pub class: ItemClass,
    pub service: Option<String>,
    pub access_group: Option<String>,
    pub account: Option<Vec<u8>>,
    pub generic: Option<Vec<u8>>,
    pub accessibility: Accessibility,
    pub synchronizable: bool,
}

impl ItemAttributes {
    /// Returns `true` if both records name the same item identity.
    ///
    /// Accessibility and the generic attribute are not part of the identity.
    pub fn same_identity(&self, other: &ItemAttributes) -> bool {
        self.class == other.class
            && self.service == other.service
            && self.access_group == other.access_group
            && self.account == other.account
            && self.synchronizable == other.synchronizable
    }
}

/// New attribute values applied by `update`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttributeUpdate {
    pub value: Option<Vec<u8>>,
    /// Left untouched on the item when `None`.
    pub accessibility: Option<Accessibility>,
}

impl AttributeUpdate {
    pub fn value(data: impl Into<Vec<u8>>) -> Self {
        Self {
            value: Some(data.into()),
            accessibility: None,
        }
    }

    pub fn with_accessibility(mut self, level: Option<Accessibility>) -> Self {
        self.accessibility = level;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.accessibility.is_none()
    }
}

/// One result of `copy_matching`. Fields are populated per [`ResultPolicy`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MatchedItem {
    pub data: Option<Vec<u8>>,
    pub attributes: Option<ItemAttributes>,
    pub persistent_ref: Option<PersistentRef>,
}
