//! parcel-tlv writes tagged, length-framed records: a compact binary format for sending
//! structured objects across a process or machine boundary.
//!
//! Every field is a tag plus the byte length of its body, so a reader can skip any field it
//! doesn't understand. That lets old readers consume data from newer writers and the other way
//! around, without any schema being shared ahead of time.
//!
//! # Format
//!
//! A field header is one little-endian `u32`: `length << 16 | tag`. If the length doesn't fit in
//! 16 bits (it is `0xFFFF` or more), the header becomes `0xFFFF0000 | tag` followed by a second
//! `u32` holding the full length.
//!
//! - Fixed-width values (booleans, integers, floats) know their length up front and get a packed
//!   header followed by the raw value.
//! - Everything else is written as a record: an escaped header with a zero length, the body, then
//!   the length is patched in once the body is done. Records nest.
//! - Absent values are either left out entirely, or written as a zero-length field when the
//!   caller asks for absence to be visible.
//! - A whole object is wrapped in a record tagged with [`OBJECT_MAGIC`].
//!
//! # Writing
//!
//! Implement [`Parcelable`] and use the functions in [`writer`], or derive `serde::Serialize`
//! and call [`to_vec`].
//!
//! ```
//! use parcel_tlv::{writer, FieldValue, Parcel, Parcelable, Result, TlvBuffer};
//!
//! struct Greeting {
//!     id: i32,
//!     text: Option<String>,
//! }
//!
//! impl Parcelable for Greeting {
//!     fn write_to_parcel(&self, buf: &mut dyn TlvBuffer, flags: u32) -> Result<()> {
//!         let start = writer::begin_object(buf)?;
//!         writer::write_scalar(buf, 1, Some(self.id))?;
//!         writer::write_sized(buf, 2, self.text.as_deref().map(FieldValue::Str), flags, false)?;
//!         writer::end_object(buf, start)
//!     }
//! }
//!
//! let bytes = Parcel::marshall(&Greeting { id: 1, text: None }, 0).unwrap();
//! assert_eq!(bytes.len(), 16);
//! ```

mod buffer;
mod error;
mod field;
mod header;
mod kind;
mod parcelable;
mod value;

pub mod ser;
pub mod writer;

pub use self::buffer::{Parcel, TlvBuffer};
pub use self::error::{Error, Result};
pub use self::field::{FieldValue, Scalar};
pub use self::header::FieldHeader;
pub use self::kind::ValueKind;
pub use self::parcelable::{Parcelable, RemoteHandle, WRITE_RETURN_VALUE};
pub use self::ser::{to_buffer, to_vec, to_vec_with, Options};
pub use self::value::Value;

/// Tag of the record that wraps a whole object.
pub const OBJECT_MAGIC: u16 = 0x4F45;

/// Lengths at or above this don't fit the packed header and use the escaped form.
pub const ESCAPE_LEN: u16 = 0xFFFF;
