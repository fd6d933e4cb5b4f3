//! The record-writing protocol.
//!
//! A record is opened with [`begin_record`], which writes an escaped header with a zero length
//! and hands back the position where the body starts. Fields are then appended, and
//! [`end_record`] seeks back to patch the real length in before returning the cursor to the end.
//! Records nest freely, since each one only remembers its own body start.
//!
//! Fixed-width values skip the patching entirely: [`write_scalar`] knows the width up front and
//! emits a packed header with [`write_field`].
//!
//! Nothing here rolls back. If a write fails halfway through a record, the buffer holds a
//! partial, unpatched record and should be thrown away.

use tracing::{debug, trace};

use crate::{
    buffer::TlvBuffer,
    error::{Error, Result},
    field::{FieldValue, Scalar},
    header::{FieldHeader, ESCAPE_MASK},
    parcelable::Parcelable,
    OBJECT_MAGIC,
};

/// Size of the length slot that gets patched in front of a body.
const LEN_SLOT: u64 = 4;

/// Write a field header for a body of known length.
pub fn write_field(buf: &mut dyn TlvBuffer, tag: u16, len: u32) -> Result<()> {
    FieldHeader::new(tag, len).encode(buf)
}

/// Open a record with a placeholder header. Returns the body start, to be passed to
/// [`end_record`].
pub fn begin_record(buf: &mut dyn TlvBuffer, tag: u16) -> Result<u64> {
    buf.write_u32(ESCAPE_MASK | tag as u32)?;
    buf.write_u32(0)?;
    let body_start = buf.position()?;
    trace!(tag, body_start, "record opened");
    Ok(body_start)
}

/// Close a record, patching its length to cover everything written since `body_start`.
pub fn end_record(buf: &mut dyn TlvBuffer, body_start: u64) -> Result<()> {
    let len = patch_len(buf, body_start)?;
    trace!(body_start, len, "record closed");
    Ok(())
}

/// Open the top-level envelope of a whole object.
pub fn begin_object(buf: &mut dyn TlvBuffer) -> Result<u64> {
    begin_record(buf, OBJECT_MAGIC)
}

pub fn end_object(buf: &mut dyn TlvBuffer, body_start: u64) -> Result<()> {
    end_record(buf, body_start)
}

/// Write a fixed-width field. Absent values write nothing at all.
pub fn write_scalar<S: Into<Scalar>>(
    buf: &mut dyn TlvBuffer,
    tag: u16,
    val: Option<S>,
) -> Result<()> {
    let val = match val {
        Some(v) => v.into(),
        None => return Ok(()),
    };
    write_field(buf, tag, val.width())?;
    val.write_raw(buf)
}

/// Write a variable-length field inside its own record.
///
/// An absent value becomes a zero-length field when `may_null` is set, and is omitted
/// otherwise. `flags` are handed to any nested objects.
pub fn write_sized(
    buf: &mut dyn TlvBuffer,
    tag: u16,
    val: Option<FieldValue>,
    flags: u32,
    may_null: bool,
) -> Result<()> {
    match val {
        None => write_absent(buf, tag, may_null),
        Some(val) => {
            let start = begin_record(buf, tag)?;
            val.write_body(buf, flags)?;
            end_record(buf, start)
        }
    }
}

/// Mark a field as absent: a zero-length field if `may_null` is set, nothing otherwise.
pub fn write_absent(buf: &mut dyn TlvBuffer, tag: u16, may_null: bool) -> Result<()> {
    if may_null {
        write_field(buf, tag, 0)
    } else {
        Ok(())
    }
}

/// Open one element of an object array with a placeholder element length.
pub fn begin_part(buf: &mut dyn TlvBuffer) -> Result<u64> {
    buf.write_i32(1)?;
    buf.position()
}

/// Close an object array element, patching its length.
///
/// An element length of zero is how a null element is written, so an element that wrote no
/// bytes reads back as null.
pub fn end_part(buf: &mut dyn TlvBuffer, body_start: u64) -> Result<()> {
    let len = patch_len(buf, body_start)?;
    if len == 0 {
        debug!(body_start, "empty array element is indistinguishable from null");
    }
    Ok(())
}

/// Write one non-null object array element.
pub fn write_part(buf: &mut dyn TlvBuffer, val: &dyn Parcelable, flags: u32) -> Result<()> {
    let start = begin_part(buf)?;
    val.write_to_parcel(buf, flags)?;
    end_part(buf, start)
}

/// Overwrite the `i32` at `pos` without moving the cursor.
pub(crate) fn patch_i32(buf: &mut dyn TlvBuffer, pos: u64, v: i32) -> Result<()> {
    let end = buf.position()?;
    buf.seek_to(pos)?;
    buf.write_i32(v)?;
    buf.seek_to(end)
}

fn patch_len(buf: &mut dyn TlvBuffer, body_start: u64) -> Result<u32> {
    let slot = body_start
        .checked_sub(LEN_SLOT)
        .ok_or(Error::BadRecordStart(body_start))?;
    let end = buf.position()?;
    let len = end
        .checked_sub(body_start)
        .ok_or(Error::BadRecordStart(body_start))?;
    let len = u32::try_from(len).map_err(|_| Error::LengthTooLong {
        max: u32::MAX as usize,
        actual: len as usize,
    })?;
    patch_i32(buf, slot, len as i32)?;
    Ok(len)
}
