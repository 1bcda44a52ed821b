use keystash_backend::BackendError;
use keystash_codec::CodecError;
use thiserror::Error;

/// Errors surfaced by the throwing half of the [`CredentialStore`] API.
///
/// "Not found" never appears here: lookups report absence as `Ok(None)`.
/// A duplicate-item conflict on write is resolved internally by updating.
///
/// [`CredentialStore`]: crate::CredentialStore
#[derive(Debug, Error)]
pub enum StoreError {
    /// The platform service reported a failure status.
    #[error("credential service status {code}: {0}", code = .0.code())]
    Status(#[from] BackendError),

    /// A value exists but cannot be decoded as the requested type.
    #[error("value for {key:?} is not a valid {expected}: {source}")]
    InvalidCast {
        key: String,
        expected: &'static str,
        #[source]
        source: CodecError,
    },

    /// A value could not be encoded for storage.
    #[error("cannot encode value: {0}")]
    Encoding(#[source] CodecError),

    /// Entry keys must be non-empty.
    #[error("entry key must not be empty")]
    InvalidKey,

    /// The store configuration is malformed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl StoreError {
    /// The platform status code, if this is a status failure.
    pub fn status_code(&self) -> Option<i32> {
        match self {
            Self::Status(e) => Some(e.code()),
            _ => None,
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
