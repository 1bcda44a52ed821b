use thiserror::Error;

/// Errors from encoding or decoding stored values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// Fewer bytes than the envelope header requires.
    #[error("truncated value: {len} bytes")]
    Truncated { len: usize },

    /// The first byte is not the envelope magic.
    #[error("not an encoded value (leading byte {0:#04x})")]
    BadMagic(u8),

    /// The envelope was written by a newer encoder.
    #[error("unsupported encoding version {0}")]
    UnsupportedVersion(u8),

    /// The payload tag is not one this decoder knows.
    #[error("unknown payload tag {0:#04x}")]
    UnknownTag(u8),

    /// The payload holds a different kind of value than requested.
    #[error("expected {expected} payload, found {found}")]
    UnexpectedTag {
        expected: &'static str,
        found: &'static str,
    },

    /// Bytes were requested as text but are not UTF-8.
    #[error("invalid UTF-8: {0}")]
    InvalidUtf8(String),

    /// A stored number does not fit the requested type.
    #[error("{value} does not fit in {target}")]
    OutOfRange { value: String, target: &'static str },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
