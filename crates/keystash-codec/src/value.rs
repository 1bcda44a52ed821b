use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::envelope::{Envelope, PayloadTag};
use crate::error::{CodecError, CodecResult};
use crate::number::NumberBox;

/// A type that can be written to and read back from a credential entry.
///
/// The encoding is chosen per type at compile time:
/// - `Vec<u8>` is stored as-is.
/// - `String` is stored as bare UTF-8.
/// - Numbers and `bool` are stored as an enveloped [`NumberBox`] and narrowed
///   on read.
/// - [`Archived<T>`] is stored as an enveloped bincode object.
pub trait StoredValue: Sized {
    /// Short name of the value kind, used in diagnostics.
    const KIND: &'static str;

    fn encode(&self) -> CodecResult<Vec<u8>>;

    fn decode(bytes: &[u8]) -> CodecResult<Self>;
}

impl StoredValue for Vec<u8> {
    const KIND: &'static str = "bytes";

    fn encode(&self) -> CodecResult<Vec<u8>> {
        Ok(self.clone())
    }

    fn decode(bytes: &[u8]) -> CodecResult<Self> {
        Ok(bytes.to_vec())
    }
}

impl StoredValue for String {
    const KIND: &'static str = "string";

    fn encode(&self) -> CodecResult<Vec<u8>> {
        Ok(self.as_bytes().to_vec())
    }

    /// Rejects bytes that open as an [`Envelope`], so a boxed number or an
    /// archived object never reads back as text.
    fn decode(bytes: &[u8]) -> CodecResult<Self> {
        if let Ok((tag, _)) = Envelope::open(bytes) {
            return Err(CodecError::UnexpectedTag {
                expected: "string",
                found: tag.name(),
            });
        }
        String::from_utf8(bytes.to_vec()).map_err(|e| CodecError::InvalidUtf8(e.to_string()))
    }
}

impl StoredValue for NumberBox {
    const KIND: &'static str = "number";

    fn encode(&self) -> CodecResult<Vec<u8>> {
        Envelope::encode_number(*self)
    }

    fn decode(bytes: &[u8]) -> CodecResult<Self> {
        Envelope::decode_number(bytes)
    }
}

impl StoredValue for i64 {
    const KIND: &'static str = "i64";

    fn encode(&self) -> CodecResult<Vec<u8>> {
        Envelope::encode_number(NumberBox::Int(*self))
    }

    fn decode(bytes: &[u8]) -> CodecResult<Self> {
        Ok(Envelope::decode_number(bytes)?.as_i64())
    }
}

macro_rules! narrowed_integer {
    ($ty:ty, $name:literal) => {
        impl StoredValue for $ty {
            const KIND: &'static str = $name;

            fn encode(&self) -> CodecResult<Vec<u8>> {
                Envelope::encode_number(NumberBox::Int(i64::from(*self)))
            }

            fn decode(bytes: &[u8]) -> CodecResult<Self> {
                let wide = Envelope::decode_number(bytes)?.as_i64();
                <$ty>::try_from(wide).map_err(|_| CodecError::OutOfRange {
                    value: wide.to_string(),
                    target: $name,
                })
            }
        }
    };
}

narrowed_integer!(i32, "i32");
narrowed_integer!(u32, "u32");

impl StoredValue for f32 {
    const KIND: &'static str = "f32";

    fn encode(&self) -> CodecResult<Vec<u8>> {
        Envelope::encode_number(NumberBox::Float(*self))
    }

    fn decode(bytes: &[u8]) -> CodecResult<Self> {
        Ok(Envelope::decode_number(bytes)?.as_f32())
    }
}

impl StoredValue for f64 {
    const KIND: &'static str = "f64";

    fn encode(&self) -> CodecResult<Vec<u8>> {
        Envelope::encode_number(NumberBox::Double(*self))
    }

    fn decode(bytes: &[u8]) -> CodecResult<Self> {
        Ok(Envelope::decode_number(bytes)?.as_f64())
    }
}

impl StoredValue for bool {
    const KIND: &'static str = "bool";

    fn encode(&self) -> CodecResult<Vec<u8>> {
        Envelope::encode_number(NumberBox::Bool(*self))
    }

    fn decode(bytes: &[u8]) -> CodecResult<Self> {
        Ok(Envelope::decode_number(bytes)?.as_bool())
    }
}

/// Wrapper storing any serde type as an archived object.
///
/// ```ignore
/// #[derive(Serialize, Deserialize)]
/// struct Session { user: String, rating: u32 }
///
/// store.set(&Archived(session), "session");
/// let Archived(session): Archived<Session> = store.get("session").unwrap();
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Archived<T>(pub T);

impl<T> Archived<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: Serialize + DeserializeOwned> StoredValue for Archived<T> {
    const KIND: &'static str = "archived object";

    fn encode(&self) -> CodecResult<Vec<u8>> {
        Envelope::encode(PayloadTag::Archived, &self.0)
    }

    fn decode(bytes: &[u8]) -> CodecResult<Self> {
        Envelope::decode(PayloadTag::Archived, bytes).map(Archived)
    }
}
