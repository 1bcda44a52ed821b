use thiserror::Error;

/// Status failures reported by a secure credential backend.
///
/// Every variant maps onto a stable numeric status code (see [`code`]) so
/// callers that need to log or compare raw platform statuses can do so.
///
/// [`code`]: BackendError::code
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BackendError {
    /// An item with the same identity already exists.
    #[error("duplicate item")]
    DuplicateItem,

    /// No item matched the query.
    #[error("item not found")]
    ItemNotFound,

    /// The item exists but cannot be read in the current device state.
    #[error("interaction not allowed")]
    InteractionNotAllowed,

    /// The query or attribute set is malformed.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The backend cannot service requests right now.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// Any other platform status.
    #[error("status {code}: {message}")]
    Other { code: i32, message: String },
}

impl BackendError {
    pub const DUPLICATE_ITEM: i32 = -25299;
    pub const ITEM_NOT_FOUND: i32 = -25300;
    pub const INTERACTION_NOT_ALLOWED: i32 = -25308;
    pub const INVALID_PARAMETER: i32 = -50;
    pub const UNAVAILABLE: i32 = -25291;

    /// The numeric platform status for this error. Success (0) is never an
    /// error and has no variant.
    pub fn code(&self) -> i32 {
        match self {
            Self::DuplicateItem => Self::DUPLICATE_ITEM,
            Self::ItemNotFound => Self::ITEM_NOT_FOUND,
            Self::InteractionNotAllowed => Self::INTERACTION_NOT_ALLOWED,
            Self::InvalidParameter(_) => Self::INVALID_PARAMETER,
            Self::Unavailable(_) => Self::UNAVAILABLE,
            Self::Other { code, .. } => *code,
        }
    }

    /// Build an error from a raw platform status. Returns `None` for 0.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => None,
            Self::DUPLICATE_ITEM => Some(Self::DuplicateItem),
            Self::ITEM_NOT_FOUND => Some(Self::ItemNotFound),
            Self::INTERACTION_NOT_ALLOWED => Some(Self::InteractionNotAllowed),
            Self::INVALID_PARAMETER => Some(Self::InvalidParameter(String::new())),
            Self::UNAVAILABLE => Some(Self::Unavailable(String::new())),
            other => Some(Self::Other {
                code: other,
                message: "unrecognised status".into(),
            }),
        }
    }

    /// Returns `true` for [`BackendError::ItemNotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ItemNotFound)
    }
}

/// Result alias for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;
