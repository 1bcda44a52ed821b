//! Typed value encoding for keystash entries.
//!
//! Entries hold opaque bytes. This crate layers typed values on top of them
//! through the [`StoredValue`] trait:
//!
//! - raw bytes and UTF-8 strings are stored bare,
//! - numbers and booleans are stored as a boxed [`NumberBox`],
//! - structured values are stored as [`Archived`] objects.
//!
//! Boxed numbers and archived objects are framed by a versioned
//! [`Envelope`] so the format can evolve without misreading old entries.

pub mod envelope;
pub mod error;
pub mod number;
pub mod value;

pub use envelope::{Envelope, PayloadTag, MAGIC, VERSION};
pub use error::{CodecError, CodecResult};
pub use number::NumberBox;
pub use value::{Archived, StoredValue};
