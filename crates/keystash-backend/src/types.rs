use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BackendError;

/// The category of a stored item.
///
/// The credential facade only ever writes [`ItemClass::GenericPassword`].
/// The remaining classes exist because the platform service stores them
/// side by side, and a process-wide wipe has to cross all of them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemClass {
    GenericPassword,
    InternetPassword,
    Certificate,
    Key,
    Identity,
}

impl ItemClass {
    /// Every class the service knows about.
    pub const ALL: [ItemClass; 5] = [
        Self::GenericPassword,
        Self::InternetPassword,
        Self::Certificate,
        Self::Key,
        Self::Identity,
    ];
}

impl fmt::Display for ItemClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GenericPassword => write!(f, "generic-password"),
            Self::InternetPassword => write!(f, "internet-password"),
            Self::Certificate => write!(f, "certificate"),
            Self::Key => write!(f, "key"),
            Self::Identity => write!(f, "identity"),
        }
    }
}

/// When an item may be read relative to the device lock state.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Accessibility {
    /// Readable only while the device is unlocked. Migrates with encrypted
    /// backups.
    WhenUnlocked,
    /// Like `WhenUnlocked`, but never leaves this device.
    WhenUnlockedThisDeviceOnly,
    /// Readable once the device has been unlocked after a restart, until the
    /// next restart. Suited to background access.
    AfterFirstUnlock,
    /// Like `AfterFirstUnlock`, but never leaves this device.
    AfterFirstUnlockThisDeviceOnly,
    /// Readable only while unlocked, and only if a passcode is set. Items are
    /// dropped when the passcode is removed.
    WhenPasscodeSetThisDeviceOnly,
    /// A raw platform value not covered above (e.g. the deprecated "always"
    /// levels).
    Custom(String),
}

impl Accessibility {
    /// Level applied to fresh writes that do not name one.
    pub const DEFAULT: Accessibility = Accessibility::WhenUnlocked;

    /// Stable textual name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::WhenUnlocked => "when-unlocked",
            Self::WhenUnlockedThisDeviceOnly => "when-unlocked-this-device-only",
            Self::AfterFirstUnlock => "after-first-unlock",
            Self::AfterFirstUnlockThisDeviceOnly => "after-first-unlock-this-device-only",
            Self::WhenPasscodeSetThisDeviceOnly => "when-passcode-set-this-device-only",
            Self::Custom(raw) => raw,
        }
    }

    /// Returns `true` if reading requires the device to be unlocked right now.
    pub fn requires_unlocked(&self) -> bool {
        matches!(
            self,
            Self::WhenUnlocked
                | Self::WhenUnlockedThisDeviceOnly
                | Self::WhenPasscodeSetThisDeviceOnly
        )
    }

    /// Returns `true` if reading requires at least one unlock since restart.
    pub fn requires_first_unlock(&self) -> bool {
        matches!(
            self,
            Self::AfterFirstUnlock | Self::AfterFirstUnlockThisDeviceOnly
        )
    }

    /// Returns `true` if the item never migrates to another device.
    pub fn is_this_device_only(&self) -> bool {
        matches!(
            self,
            Self::WhenUnlockedThisDeviceOnly
                | Self::AfterFirstUnlockThisDeviceOnly
                | Self::WhenPasscodeSetThisDeviceOnly
        )
    }
}

impl Default for Accessibility {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Accessibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Accessibility {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "when-unlocked" => Ok(Self::WhenUnlocked),
            "when-unlocked-this-device-only" => Ok(Self::WhenUnlockedThisDeviceOnly),
            "after-first-unlock" => Ok(Self::AfterFirstUnlock),
            "after-first-unlock-this-device-only" => Ok(Self::AfterFirstUnlockThisDeviceOnly),
            "when-passcode-set-this-device-only" => Ok(Self::WhenPasscodeSetThisDeviceOnly),
            "" => Err(BackendError::InvalidParameter(
                "empty accessibility value".into(),
            )),
            other => Ok(Self::Custom(other.to_string())),
        }
    }
}

/// Synchronization attribute of an item or query.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Synchronizable {
    Yes,
    #[default]
    No,
    /// Match both synchronizable and local items. Only valid in queries.
    Any,
}

impl Synchronizable {
    /// Returns `true` if an item stored with `stored` satisfies this filter.
    pub fn matches(self, stored: bool) -> bool {
        match self {
            Self::Yes => stored,
            Self::No => !stored,
            Self::Any => true,
        }
    }

    /// The concrete flag for a stored item, or `None` for [`Synchronizable::Any`].
    pub fn as_flag(self) -> Option<bool> {
        match self {
            Self::Yes => Some(true),
            Self::No => Some(false),
            Self::Any => None,
        }
    }
}

impl From<bool> for Synchronizable {
    fn from(flag: bool) -> Self {
        if flag {
            Self::Yes
        } else {
            Self::No
        }
    }
}

/// Access-group filter of a query.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum GroupScope {
    /// Items stored without an access group.
    #[default]
    Ungrouped,
    /// Items stored under this access group.
    Named(String),
    /// Items under any access group, or none. Only valid in queries.
    Any,
}

impl GroupScope {
    /// Returns `true` if an item stored under `stored` satisfies this filter.
    pub fn matches(&self, stored: Option<&str>) -> bool {
        match self {
            Self::Ungrouped => stored.is_none(),
            Self::Named(group) => stored == Some(group.as_str()),
            Self::Any => true,
        }
    }

    /// The concrete group for a stored item, or `None` for [`GroupScope::Any`].
    pub fn as_stored(&self) -> Option<Option<String>> {
        match self {
            Self::Ungrouped => Some(None),
            Self::Named(group) => Some(Some(group.clone())),
            Self::Any => None,
        }
    }
}

impl From<Option<String>> for GroupScope {
    fn from(group: Option<String>) -> Self {
        group.map_or(Self::Ungrouped, Self::Named)
    }
}

/// Opaque, stable handle to a stored item.
///
/// Survives value updates; a deleted and re-added item gets a new handle.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PersistentRef([u8; 8]);

impl PersistentRef {
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }

    /// Hex-encoded string representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl From<u64> for PersistentRef {
    fn from(seq: u64) -> Self {
        Self(seq.to_be_bytes())
    }
}

impl fmt::Debug for PersistentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PersistentRef({})", self.to_hex())
    }
}

impl fmt::Display for PersistentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
