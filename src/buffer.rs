//! Byte buffers that TLV records can be written into.
//!
//! The writer only ever appends, asks where the cursor is, and seeks back to patch a length it
//! wrote earlier. [`TlvBuffer`] captures exactly that, and anything implementing
//! [`Write`] + [`Seek`] gets it for free. [`Parcel`] is the in-memory buffer most callers want.

use std::io::{self, Cursor, Seek, SeekFrom, Write};

use byteorder::{LittleEndian, WriteBytesExt};

use crate::{
    error::{Error, Result},
    parcelable::Parcelable,
};

/// A seekable output buffer with little-endian primitive writers.
///
/// All integers and floats are written little-endian. Strings are written as an `i32` byte
/// length followed by the UTF-8 bytes, with no terminator or padding.
pub trait TlvBuffer {
    /// Current cursor position, in bytes from the start of the buffer.
    fn position(&mut self) -> Result<u64>;

    /// Move the cursor to an absolute position.
    fn seek_to(&mut self, pos: u64) -> Result<()>;

    fn write_i32(&mut self, v: i32) -> Result<()>;

    fn write_i64(&mut self, v: i64) -> Result<()>;

    fn write_f32(&mut self, v: f32) -> Result<()>;

    fn write_f64(&mut self, v: f64) -> Result<()>;

    /// Write raw bytes with no length prefix.
    fn write_bytes(&mut self, v: &[u8]) -> Result<()>;

    fn write_u32(&mut self, v: u32) -> Result<()> {
        self.write_i32(v as i32)
    }

    /// Write a count or byte length as an `i32`. Anything past `i32::MAX` is rejected.
    fn write_len(&mut self, len: usize) -> Result<()> {
        let len = i32::try_from(len).map_err(|_| Error::LengthTooLong {
            max: i32::MAX as usize,
            actual: len,
        })?;
        self.write_i32(len)
    }

    /// Write a length-prefixed UTF-8 string.
    fn write_utf8(&mut self, v: &str) -> Result<()> {
        self.write_len(v.len())?;
        self.write_bytes(v.as_bytes())
    }

    /// Write a string that may be null. A null is the length `-1` with no bytes after it.
    fn write_utf8_opt(&mut self, v: Option<&str>) -> Result<()> {
        match v {
            Some(v) => self.write_utf8(v),
            None => self.write_i32(-1),
        }
    }
}

impl<W: Write + Seek> TlvBuffer for W {
    fn position(&mut self) -> Result<u64> {
        Ok(self.stream_position()?)
    }

    fn seek_to(&mut self, pos: u64) -> Result<()> {
        self.seek(SeekFrom::Start(pos))?;
        Ok(())
    }

    fn write_i32(&mut self, v: i32) -> Result<()> {
        Ok(WriteBytesExt::write_i32::<LittleEndian>(self, v)?)
    }

    fn write_i64(&mut self, v: i64) -> Result<()> {
        Ok(WriteBytesExt::write_i64::<LittleEndian>(self, v)?)
    }

    fn write_f32(&mut self, v: f32) -> Result<()> {
        Ok(WriteBytesExt::write_f32::<LittleEndian>(self, v)?)
    }

    fn write_f64(&mut self, v: f64) -> Result<()> {
        Ok(WriteBytesExt::write_f64::<LittleEndian>(self, v)?)
    }

    fn write_bytes(&mut self, v: &[u8]) -> Result<()> {
        Ok(self.write_all(v)?)
    }
}

/// A growable in-memory buffer with a movable write cursor.
///
/// Writing past the end grows the buffer; writing after a seek back overwrites in place.
#[derive(Clone, Debug, Default)]
pub struct Parcel {
    inner: Cursor<Vec<u8>>,
}

impl Parcel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Cursor::new(Vec::with_capacity(capacity)),
        }
    }

    /// Serialize a single value into a fresh buffer and return its bytes.
    pub fn marshall(value: &dyn Parcelable, flags: u32) -> Result<Vec<u8>> {
        let mut parcel = Parcel::new();
        value.write_to_parcel(&mut parcel, flags)?;
        Ok(parcel.into_bytes())
    }

    /// Total number of bytes in the buffer, regardless of cursor position.
    pub fn data_size(&self) -> usize {
        self.inner.get_ref().len()
    }

    pub fn data_position(&self) -> u64 {
        self.inner.position()
    }

    pub fn set_data_position(&mut self, pos: u64) {
        self.inner.set_position(pos)
    }

    /// Append the whole contents of another buffer at the cursor.
    pub fn append_from(&mut self, other: &Parcel) -> Result<()> {
        self.write_bytes(other.as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.inner.get_ref()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.inner.into_inner()
    }
}

impl Write for Parcel {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for Parcel {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}

impl AsRef<[u8]> for Parcel {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

#[cfg(test)]
mod test {
    use super::{Parcel, TlvBuffer};
    use crate::error::Error;
    use std::io::Cursor;

    #[test]
    fn primitives_little_endian() {
        let mut parcel = Parcel::new();
        let buf: &mut dyn TlvBuffer = &mut parcel;
        buf.write_i32(-2).unwrap();
        buf.write_i64(0x0102030405060708).unwrap();
        buf.write_f32(1.0).unwrap();
        buf.write_f64(-2.0).unwrap();
        assert_eq!(
            parcel.as_bytes(),
            &[
                0xfe, 0xff, 0xff, 0xff, // i32
                0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01, // i64
                0x00, 0x00, 0x80, 0x3f, // f32
                0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xc0, // f64
            ]
        );
    }

    #[test]
    fn utf8_is_length_prefixed() {
        let mut parcel = Parcel::new();
        parcel.write_utf8("héllo").unwrap();
        let mut expected = vec![6, 0, 0, 0];
        expected.extend_from_slice("héllo".as_bytes());
        assert_eq!(parcel.as_bytes(), &expected[..]);
    }

    #[test]
    fn seek_back_overwrites_in_place() {
        let mut parcel = Parcel::new();
        parcel.write_i32(0).unwrap();
        parcel.write_i32(7).unwrap();
        let end = TlvBuffer::position(&mut parcel).unwrap();
        assert_eq!(end, 8);
        parcel.seek_to(0).unwrap();
        parcel.write_i32(3).unwrap();
        parcel.seek_to(end).unwrap();
        assert_eq!(parcel.data_size(), 8);
        assert_eq!(parcel.data_position(), 8);
        assert_eq!(parcel.as_bytes(), &[3, 0, 0, 0, 7, 0, 0, 0]);
    }

    #[test]
    fn null_utf8() {
        let mut parcel = Parcel::new();
        parcel.write_utf8_opt(None).unwrap();
        parcel.write_utf8_opt(Some("")).unwrap();
        assert_eq!(parcel.as_bytes(), &[0xff, 0xff, 0xff, 0xff, 0, 0, 0, 0]);
    }

    #[test]
    fn oversized_len() {
        let mut parcel = Parcel::new();
        parcel.write_len(i32::MAX as usize).unwrap();
        assert_eq!(parcel.as_bytes(), &[0xff, 0xff, 0xff, 0x7f]);
        let too_long = i32::MAX as usize + 1;
        assert!(matches!(
            parcel.write_len(too_long),
            Err(Error::LengthTooLong { actual, .. }) if actual == too_long
        ));
        assert_eq!(parcel.data_size(), 4);
    }

    #[test]
    fn rewind_with_data_position() {
        let mut parcel = Parcel::new();
        parcel.write_i32(1).unwrap();
        parcel.write_i32(2).unwrap();
        parcel.set_data_position(0);
        assert_eq!(parcel.data_position(), 0);
        parcel.write_i32(9).unwrap();
        assert_eq!(parcel.data_position(), 4);
        assert_eq!(parcel.as_bytes(), &[9, 0, 0, 0, 2, 0, 0, 0]);
    }

    #[test]
    fn append_from_other() {
        let mut a = Parcel::new();
        a.write_bytes(&[1, 2]).unwrap();
        let mut b = Parcel::new();
        b.write_bytes(&[3, 4, 5]).unwrap();
        a.append_from(&b).unwrap();
        assert_eq!(a.into_bytes(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn cursor_is_a_buffer() {
        let mut cursor = Cursor::new(Vec::new());
        {
            let buf: &mut dyn TlvBuffer = &mut cursor;
            buf.write_u32(0xFFFF0001).unwrap();
        }
        assert_eq!(cursor.into_inner(), vec![0x01, 0x00, 0xff, 0xff]);
    }
}
