//! Serialization.
//!
//! Structs are the unit of encoding. Each struct is written as an object envelope, and its fields
//! become tagged fields numbered from 1 in declaration order. A skipped field still uses up its
//! number, so adding `skip_serializing_if` never shifts the tags after it.
//!
//! Values map onto the wire as:
//! - `bool`, `i8`, `i16`, `i32`, `u8`, `u16` - 4-byte scalar fields
//! - `i64`, `u32`, `u64` - 8-byte scalar fields (`u64` is bit-cast)
//! - `f32`, `f64` - float and double fields
//! - `char`, `str`, unit enum variants - string fields
//! - byte sequences - byte fields
//! - nested structs - a record holding the nested object
//! - sequences and tuples - a record holding a count and then the elements. Numbers are written
//!   raw, strings and bytes length-prefixed, structs as length-prefixed array elements.
//! - `None` and `()` - omitted, or a zero-length field with [`Options::nullable`]. Inside a
//!   sequence they are written as the null element word `0`, or as the null string `-1` when
//!   every other element of the sequence is a string.
//!
//! Maps, enum variants carrying data, sequences nested directly in sequences, and anything that
//! isn't a struct at the top level have no TLV encoding and fail with [`Error::Unsupported`].

use serde::ser::{self, Impossible, Serialize};

use crate::{
    buffer::{Parcel, TlvBuffer},
    error::{Error, Result},
    field::{FieldValue, Scalar},
    writer,
};

/// Settings for the serde encoder.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Options {
    /// Write `None` fields as zero-length fields instead of leaving them out.
    pub nullable: bool,
}

/// Serialize a struct into a new byte vector.
pub fn to_vec<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    to_vec_with(value, Options::default())
}

pub fn to_vec_with<T: Serialize + ?Sized>(value: &T, opts: Options) -> Result<Vec<u8>> {
    let mut parcel = Parcel::new();
    to_buffer(&mut parcel, value, opts)?;
    Ok(parcel.into_bytes())
}

/// Serialize a struct at the current position of an existing buffer.
pub fn to_buffer<T: Serialize + ?Sized>(
    buf: &mut dyn TlvBuffer,
    value: &T,
    opts: Options,
) -> Result<()> {
    value.serialize(ValueSerializer {
        buf,
        opts,
        slot: Slot::Root,
    })?;
    Ok(())
}

/// Where the value being serialized will land.
#[derive(Clone, Copy, Debug)]
enum Slot {
    Root,
    Field(u16),
    Element,
}

/// What a value turned into. Sequences use it to pick the null spelling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Written {
    Null,
    Str,
    Other,
}

struct ValueSerializer<'a> {
    buf: &'a mut dyn TlvBuffer,
    opts: Options,
    slot: Slot,
}

impl<'a> ValueSerializer<'a> {
    fn ser_fail(&self, received: &'static str) -> Error {
        Error::Unsupported(received)
    }

    fn scalar(self, v: Scalar) -> Result<Written> {
        match self.slot {
            Slot::Root => return Err(self.ser_fail(v.name())),
            Slot::Field(tag) => writer::write_scalar(self.buf, tag, Some(v))?,
            Slot::Element => v.write_raw(self.buf)?,
        }
        Ok(Written::Other)
    }

    fn sized(self, v: FieldValue) -> Result<Written> {
        let written = match v {
            FieldValue::Str(_) => Written::Str,
            _ => Written::Other,
        };
        match self.slot {
            Slot::Root => return Err(self.ser_fail(v.name())),
            Slot::Field(tag) => writer::write_sized(self.buf, tag, Some(v), 0, false)?,
            Slot::Element => v.write_body(self.buf, 0)?,
        }
        Ok(written)
    }

    fn absent(self) -> Result<Written> {
        match self.slot {
            Slot::Root => return Err(self.ser_fail("none")),
            Slot::Field(tag) => writer::write_absent(self.buf, tag, self.opts.nullable)?,
            Slot::Element => self.buf.write_i32(0)?,
        }
        Ok(Written::Null)
    }

    fn begin_seq(self) -> Result<SeqSerializer<'a>> {
        let tag = match self.slot {
            Slot::Root => return Err(self.ser_fail("seq")),
            Slot::Element => return Err(self.ser_fail("nested seq")),
            Slot::Field(tag) => tag,
        };
        let start = writer::begin_record(self.buf, tag)?;
        // Count placeholder, patched once the elements are in
        self.buf.write_i32(0)?;
        Ok(SeqSerializer {
            buf: self.buf,
            opts: self.opts,
            start,
            count: 0,
            nulls: Vec::new(),
            only_strs: true,
        })
    }

    fn begin_struct(self) -> Result<StructSerializer<'a>> {
        let frame = match self.slot {
            Slot::Root => Frame::Root,
            Slot::Field(tag) => Frame::Field(writer::begin_record(self.buf, tag)?),
            Slot::Element => Frame::Part(writer::begin_part(self.buf)?),
        };
        let object_start = writer::begin_object(self.buf)?;
        Ok(StructSerializer {
            buf: self.buf,
            opts: self.opts,
            next_tag: 1,
            frame,
            object_start,
        })
    }
}

impl<'a> ser::Serializer for ValueSerializer<'a> {
    type Ok = Written;
    type Error = Error;
    type SerializeSeq = SeqSerializer<'a>;
    type SerializeTuple = SeqSerializer<'a>;
    type SerializeTupleStruct = SeqSerializer<'a>;
    type SerializeTupleVariant = Impossible<Written, Error>;
    type SerializeMap = Impossible<Written, Error>;
    type SerializeStruct = StructSerializer<'a>;
    type SerializeStructVariant = Impossible<Written, Error>;

    fn is_human_readable(&self) -> bool {
        false
    }

    fn serialize_bool(self, v: bool) -> Result<Written> {
        self.scalar(Scalar::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Written> {
        self.scalar(Scalar::Byte(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Written> {
        self.scalar(Scalar::Short(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Written> {
        self.scalar(Scalar::Int(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Written> {
        self.scalar(Scalar::Long(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Written> {
        self.scalar(Scalar::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Written> {
        self.scalar(Scalar::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Written> {
        self.scalar(Scalar::Long(v as i64))
    }

    fn serialize_u64(self, v: u64) -> Result<Written> {
        self.scalar(Scalar::Long(v as i64))
    }

    fn serialize_f32(self, v: f32) -> Result<Written> {
        self.scalar(Scalar::Float(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Written> {
        self.scalar(Scalar::Double(v))
    }

    fn serialize_char(self, v: char) -> Result<Written> {
        let mut tmp = [0u8; 4];
        self.serialize_str(v.encode_utf8(&mut tmp))
    }

    fn serialize_str(self, v: &str) -> Result<Written> {
        self.sized(FieldValue::Str(v))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Written> {
        self.sized(FieldValue::Bytes(v))
    }

    fn serialize_none(self) -> Result<Written> {
        self.absent()
    }

    fn serialize_some<T: Serialize + ?Sized>(self, v: &T) -> Result<Written> {
        v.serialize(self)
    }

    fn serialize_unit(self) -> Result<Written> {
        self.absent()
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Written> {
        self.absent()
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Written> {
        self.serialize_str(variant)
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        v: &T,
    ) -> Result<Written> {
        v.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Written> {
        Err(self.ser_fail("newtype_variant"))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        self.begin_seq()
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        self.begin_seq()
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        self.begin_seq()
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(self.ser_fail("tuple_variant"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(self.ser_fail("map"))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        self.begin_struct()
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(self.ser_fail("struct_variant"))
    }
}

/// Writes elements after a count placeholder. The count is patched in at the end, so the
/// sequence length doesn't need to be known up front.
///
/// Null elements are written as `0` and their positions kept. If every non-null element turns
/// out to be a string, they are patched to the null string `-1`.
struct SeqSerializer<'a> {
    buf: &'a mut dyn TlvBuffer,
    opts: Options,
    start: u64,
    count: i32,
    nulls: Vec<u64>,
    only_strs: bool,
}

impl<'a> ser::SerializeSeq for SeqSerializer<'a> {
    type Ok = Written;
    type Error = Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        let at = self.buf.position()?;
        let written = value.serialize(ValueSerializer {
            buf: &mut *self.buf,
            opts: self.opts,
            slot: Slot::Element,
        })?;
        match written {
            Written::Null => self.nulls.push(at),
            Written::Str => (),
            Written::Other => self.only_strs = false,
        }
        self.count = self
            .count
            .checked_add(1)
            .ok_or(Error::LengthTooLong {
                max: i32::MAX as usize,
                actual: i32::MAX as usize + 1,
            })?;
        Ok(())
    }

    fn end(self) -> Result<Written> {
        if self.only_strs && self.nulls.len() < self.count as usize {
            for &at in &self.nulls {
                writer::patch_i32(self.buf, at, -1)?;
            }
        }
        writer::patch_i32(self.buf, self.start, self.count)?;
        writer::end_record(self.buf, self.start)?;
        Ok(Written::Other)
    }
}

impl<'a> ser::SerializeTuple for SeqSerializer<'a> {
    type Ok = Written;
    type Error = Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Written> {
        ser::SerializeSeq::end(self)
    }
}

impl<'a> ser::SerializeTupleStruct for SeqSerializer<'a> {
    type Ok = Written;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Written> {
        ser::SerializeSeq::end(self)
    }
}

/// How the object envelope of a struct is wrapped.
enum Frame {
    /// Top level, nothing around the envelope.
    Root,
    /// Inside a tagged record.
    Field(u64),
    /// Inside a length-prefixed array element.
    Part(u64),
}

struct StructSerializer<'a> {
    buf: &'a mut dyn TlvBuffer,
    opts: Options,
    next_tag: u16,
    frame: Frame,
    object_start: u64,
}

impl<'a> StructSerializer<'a> {
    fn take_tag(&mut self) -> Result<u16> {
        let tag = self.next_tag;
        self.next_tag = tag
            .checked_add(1)
            .ok_or(Error::Unsupported("struct with more than 65534 fields"))?;
        Ok(tag)
    }
}

impl<'a> ser::SerializeStruct for StructSerializer<'a> {
    type Ok = Written;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        _key: &'static str,
        value: &T,
    ) -> Result<()> {
        let tag = self.take_tag()?;
        value.serialize(ValueSerializer {
            buf: &mut *self.buf,
            opts: self.opts,
            slot: Slot::Field(tag),
        })?;
        Ok(())
    }

    fn skip_field(&mut self, _key: &'static str) -> Result<()> {
        self.take_tag().map(|_| ())
    }

    fn end(self) -> Result<Written> {
        writer::end_object(self.buf, self.object_start)?;
        match self.frame {
            Frame::Root => (),
            Frame::Field(start) => writer::end_record(self.buf, start)?,
            Frame::Part(start) => writer::end_part(self.buf, start)?,
        }
        Ok(Written::Other)
    }
}
