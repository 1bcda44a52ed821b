use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CodecError, CodecResult};
use crate::number::NumberBox;

/// Leading byte of every enveloped value.
pub const MAGIC: u8 = b'K';

/// Current envelope version.
pub const VERSION: u8 = 1;

const HEADER_LEN: usize = 3;

/// The kind of payload carried by an envelope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PayloadTag {
    Number,
    Archived,
}

impl PayloadTag {
    pub fn as_byte(self) -> u8 {
        match self {
            Self::Number => 0x01,
            Self::Archived => 0x02,
        }
    }

    pub fn from_byte(byte: u8) -> CodecResult<Self> {
        match byte {
            0x01 => Ok(Self::Number),
            0x02 => Ok(Self::Archived),
            other => Err(CodecError::UnknownTag(other)),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Archived => "archived object",
        }
    }
}

/// Versioned framing for structured values: `[magic][version][tag][payload]`.
///
/// Raw bytes and strings are stored bare; only boxed numbers and archived
/// objects are enveloped. The payload is bincode.
pub struct Envelope;

impl Envelope {
    /// Frame `value` under `tag`.
    pub fn encode<T: Serialize + ?Sized>(tag: PayloadTag, value: &T) -> CodecResult<Vec<u8>> {
        let payload =
            bincode::serialize(value).map_err(|e| CodecError::Serialization(e.to_string()))?;
        let mut buf = Vec::with_capacity(HEADER_LEN + payload.len());
        buf.push(MAGIC);
        buf.push(VERSION);
        buf.push(tag.as_byte());
        buf.extend_from_slice(&payload);
        Ok(buf)
    }

    /// Split a framed value into its tag and payload bytes.
    pub fn open(data: &[u8]) -> CodecResult<(PayloadTag, &[u8])> {
        if data.len() < HEADER_LEN {
            return Err(CodecError::Truncated { len: data.len() });
        }
        if data[0] != MAGIC {
            return Err(CodecError::BadMagic(data[0]));
        }
        if data[1] == 0 || data[1] > VERSION {
            return Err(CodecError::UnsupportedVersion(data[1]));
        }
        let tag = PayloadTag::from_byte(data[2])?;
        Ok((tag, &data[HEADER_LEN..]))
    }

    /// Decode a framed value, requiring `expected` as its tag.
    pub fn decode<T: DeserializeOwned>(expected: PayloadTag, data: &[u8]) -> CodecResult<T> {
        let (tag, payload) = Self::open(data)?;
        if tag != expected {
            return Err(CodecError::UnexpectedTag {
                expected: expected.name(),
                found: tag.name(),
            });
        }
        bincode::deserialize(payload).map_err(|e| CodecError::Deserialization(e.to_string()))
    }

    /// Frame a boxed number.
    pub fn encode_number(number: NumberBox) -> CodecResult<Vec<u8>> {
        Self::encode(PayloadTag::Number, &number)
    }

    /// Decode a boxed number.
    pub fn decode_number(data: &[u8]) -> CodecResult<NumberBox> {
        Self::decode(PayloadTag::Number, data)
    }
}
