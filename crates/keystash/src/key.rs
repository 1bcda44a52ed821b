use std::fmt;

use keystash_backend::Accessibility;

/// A caller-supplied entry key plus the per-call item options.
///
/// Plain strings convert into an `EntryKey` with no accessibility and
/// `synchronizable = false`, so most calls just pass `"name"`:
///
/// ```ignore
/// store.set(&token, "api-token");
/// store.set(&token, EntryKey::new("api-token").accessible(Accessibility::AfterFirstUnlock));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EntryKey {
    name: String,
    accessibility: Option<Accessibility>,
    synchronizable: bool,
}

impl EntryKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            accessibility: None,
            synchronizable: false,
        }
    }

    /// Constrain lookups to, and write entries with, this accessibility.
    pub fn accessible(mut self, level: Accessibility) -> Self {
        self.accessibility = Some(level);
        self
    }

    /// Address the synchronizable (replicated) variant of the entry.
    pub fn synchronizable(mut self, sync: bool) -> Self {
        self.synchronizable = sync;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn accessibility(&self) -> Option<&Accessibility> {
        self.accessibility.as_ref()
    }

    pub fn is_synchronizable(&self) -> bool {
        self.synchronizable
    }
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for EntryKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for EntryKey {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<&String> for EntryKey {
    fn from(name: &String) -> Self {
        Self::new(name.as_str())
    }
}

impl From<&EntryKey> for EntryKey {
    fn from(key: &EntryKey) -> Self {
        key.clone()
    }
}
