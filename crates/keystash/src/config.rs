use keystash_backend::Accessibility;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Namespace used when the host application identity cannot be determined.
pub const FALLBACK_NAMESPACE: &str = "keystash";

/// Configuration for a [`CredentialStore`](crate::CredentialStore).
///
/// Fixed at construction; a store never mutates its configuration, so any
/// number of differently-configured stores can share one backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Scopes every key owned by the store.
    pub namespace: String,
    /// Shares entries between namespaces/applications. `None` is the
    /// ungrouped scope.
    pub access_group: Option<String>,
    /// Applied on fresh writes that do not name an accessibility.
    pub default_accessibility: Accessibility,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            access_group: None,
            default_accessibility: Accessibility::DEFAULT,
        }
    }
}

impl StoreConfig {
    /// Configuration for an explicit namespace.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Default::default()
        }
    }

    /// Set the access group. An empty string clears it.
    pub fn with_access_group(mut self, group: impl Into<String>) -> Self {
        let group = group.into();
        self.access_group = (!group.is_empty()).then_some(group);
        self
    }

    pub fn with_default_accessibility(mut self, level: Accessibility) -> Self {
        self.default_accessibility = level;
        self
    }

    /// Parse a configuration from TOML. Missing fields take their defaults.
    ///
    /// ```toml
    /// namespace = "com.example.app"
    /// access_group = "team.shared"
    /// default_accessibility = "after-first-unlock"
    /// ```
    pub fn from_toml_str(source: &str) -> StoreResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| StoreError::Config(e.to_string()))?;
        config.validated()
    }

    /// Normalise and check the configuration.
    pub fn validated(mut self) -> StoreResult<Self> {
        if self.namespace.is_empty() {
            return Err(StoreError::Config("namespace must not be empty".into()));
        }
        if self.access_group.as_deref() == Some("") {
            self.access_group = None;
        }
        Ok(self)
    }
}

/// The host application's identity: the file stem of the running executable.
pub fn default_namespace() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| FALLBACK_NAMESPACE.to_string())
}
