use std::collections::BTreeMap;

use crate::{
    buffer::{Parcel, TlvBuffer},
    error::Result,
    parcelable::{Parcelable, RemoteHandle},
    value::{write_value_list, write_value_map, Value},
    writer,
};

/// A fixed-width value. Its field length is known before anything is written, so it never
/// needs a backpatched header.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
}

impl Scalar {
    pub fn name(&self) -> &'static str {
        use self::Scalar::*;
        match self {
            Bool(_) => "Bool",
            Byte(_) => "Byte",
            Short(_) => "Short",
            Int(_) => "Int",
            Long(_) => "Long",
            Float(_) => "Float",
            Double(_) => "Double",
        }
    }

    /// Encoded width of the value in bytes. Everything narrower than 32 bits is widened.
    pub fn width(&self) -> u32 {
        use self::Scalar::*;
        match self {
            Bool(_) | Byte(_) | Short(_) | Int(_) | Float(_) => 4,
            Long(_) | Double(_) => 8,
        }
    }

    pub(crate) fn write_raw(&self, buf: &mut dyn TlvBuffer) -> Result<()> {
        use self::Scalar::*;
        match *self {
            Bool(v) => buf.write_i32(v as i32),
            Byte(v) => buf.write_i32(v as i32),
            Short(v) => buf.write_i32(v as i32),
            Int(v) => buf.write_i32(v),
            Long(v) => buf.write_i64(v),
            Float(v) => buf.write_f32(v),
            Double(v) => buf.write_f64(v),
        }
    }
}

macro_rules! impl_scalar_from {
    ($t: ty, $p: ident) => {
        impl From<$t> for Scalar {
            fn from(v: $t) -> Self {
                Scalar::$p(v)
            }
        }
    };
}

impl_scalar_from!(bool, Bool);
impl_scalar_from!(i8, Byte);
impl_scalar_from!(i16, Short);
impl_scalar_from!(i32, Int);
impl_scalar_from!(i64, Long);
impl_scalar_from!(f32, Float);
impl_scalar_from!(f64, Double);

impl From<u8> for Scalar {
    fn from(v: u8) -> Self {
        Scalar::Int(v as i32)
    }
}

impl From<u16> for Scalar {
    fn from(v: u16) -> Self {
        Scalar::Int(v as i32)
    }
}

/// A value whose length is only known once it has been written. These are always framed as a
/// record: placeholder header, body, then a patched length.
#[derive(Clone)]
pub enum FieldValue<'a> {
    /// A length-prefixed UTF-8 string.
    Str(&'a str),
    /// An opaque byte sequence.
    Bytes(&'a [u8]),
    IntArray(&'a [i32]),
    /// A string array or string list. Both share one encoding. `None` elements are null strings.
    StrArray(Vec<Option<&'a str>>),
    /// A nested object, which writes its own body.
    Object(&'a dyn Parcelable),
    /// An array of nested objects, each framed with its own length. `None` elements are nulls.
    Objects(Vec<Option<&'a dyn Parcelable>>),
    /// Raw bytes copied from another buffer.
    Splice(&'a [u8]),
    /// An untyped collection of dynamically typed values.
    List(&'a [Value]),
    /// String-keyed dynamically typed values.
    Bundle(&'a BTreeMap<String, Value>),
    Remote(RemoteHandle),
}

impl<'a> FieldValue<'a> {
    pub fn objects<T: Parcelable>(items: &'a [T]) -> Self {
        FieldValue::Objects(
            items
                .iter()
                .map(|v| Some(v as &'a dyn Parcelable))
                .collect(),
        )
    }

    pub fn objects_opt<T: Parcelable>(items: &'a [Option<T>]) -> Self {
        FieldValue::Objects(
            items
                .iter()
                .map(|v| v.as_ref().map(|v| v as &'a dyn Parcelable))
                .collect(),
        )
    }

    pub fn strs_opt(items: &'a [Option<String>]) -> Self {
        FieldValue::StrArray(items.iter().map(|v| v.as_deref()).collect())
    }

    pub fn splice(parcel: &'a Parcel) -> Self {
        FieldValue::Splice(parcel.as_bytes())
    }

    pub fn name(&self) -> &'static str {
        use self::FieldValue::*;
        match self {
            Str(_) => "Str",
            Bytes(_) => "Bytes",
            IntArray(_) => "IntArray",
            StrArray(_) => "StrArray",
            Object(_) => "Object",
            Objects(_) => "Objects",
            Splice(_) => "Splice",
            List(_) => "List",
            Bundle(_) => "Bundle",
            Remote(_) => "Remote",
        }
    }

    /// Write the record body. The surrounding header is the caller's job.
    pub(crate) fn write_body(&self, buf: &mut dyn TlvBuffer, flags: u32) -> Result<()> {
        use self::FieldValue::*;
        match *self {
            Str(v) => buf.write_utf8(v),
            Bytes(v) => write_byte_array(buf, v),
            IntArray(v) => write_int_array(buf, v),
            StrArray(ref v) => write_str_array(buf, v.iter().copied()),
            Object(v) => v.write_to_parcel(buf, flags),
            Objects(ref items) => {
                buf.write_len(items.len())?;
                for item in items {
                    match item {
                        None => buf.write_i32(0)?,
                        Some(v) => writer::write_part(buf, *v, flags)?,
                    }
                }
                Ok(())
            }
            Splice(v) => buf.write_bytes(v),
            List(v) => write_value_list(buf, v),
            Bundle(v) => write_value_map(buf, v),
            Remote(v) => v.write_to_parcel(buf, flags),
        }
    }
}

impl<'a> From<&'a str> for FieldValue<'a> {
    fn from(v: &'a str) -> Self {
        FieldValue::Str(v)
    }
}

impl<'a> From<&'a String> for FieldValue<'a> {
    fn from(v: &'a String) -> Self {
        FieldValue::Str(v)
    }
}

impl<'a> From<&'a [u8]> for FieldValue<'a> {
    fn from(v: &'a [u8]) -> Self {
        FieldValue::Bytes(v)
    }
}

impl<'a> From<&'a [i32]> for FieldValue<'a> {
    fn from(v: &'a [i32]) -> Self {
        FieldValue::IntArray(v)
    }
}

impl<'a> From<&'a [String]> for FieldValue<'a> {
    fn from(v: &'a [String]) -> Self {
        FieldValue::StrArray(v.iter().map(|s| Some(s.as_str())).collect())
    }
}

impl<'a> From<&'a [Value]> for FieldValue<'a> {
    fn from(v: &'a [Value]) -> Self {
        FieldValue::List(v)
    }
}

impl<'a> From<&'a BTreeMap<String, Value>> for FieldValue<'a> {
    fn from(v: &'a BTreeMap<String, Value>) -> Self {
        FieldValue::Bundle(v)
    }
}

impl<'a> From<RemoteHandle> for FieldValue<'a> {
    fn from(v: RemoteHandle) -> Self {
        FieldValue::Remote(v)
    }
}

pub(crate) fn write_byte_array(buf: &mut dyn TlvBuffer, v: &[u8]) -> Result<()> {
    buf.write_len(v.len())?;
    buf.write_bytes(v)
}

pub(crate) fn write_int_array(buf: &mut dyn TlvBuffer, v: &[i32]) -> Result<()> {
    buf.write_len(v.len())?;
    for n in v {
        buf.write_i32(*n)?;
    }
    Ok(())
}

pub(crate) fn write_str_array<'s, I>(buf: &mut dyn TlvBuffer, items: I) -> Result<()>
where
    I: IntoIterator<Item = Option<&'s str>>,
    I::IntoIter: ExactSizeIterator,
{
    let items = items.into_iter();
    buf.write_len(items.len())?;
    for s in items {
        buf.write_utf8_opt(s)?;
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn body(v: &FieldValue) -> Vec<u8> {
        let mut parcel = Parcel::new();
        v.write_body(&mut parcel, 0).unwrap();
        parcel.into_bytes()
    }

    #[test]
    fn scalar_widths() {
        assert_eq!(Scalar::from(true).width(), 4);
        assert_eq!(Scalar::from(1i8).width(), 4);
        assert_eq!(Scalar::from(1i16).width(), 4);
        assert_eq!(Scalar::from(1i32).width(), 4);
        assert_eq!(Scalar::from(1i64).width(), 8);
        assert_eq!(Scalar::from(1f32).width(), 4);
        assert_eq!(Scalar::from(1f64).width(), 8);
    }

    #[test]
    fn scalar_extension() {
        let mut parcel = Parcel::new();
        Scalar::from(-2i8).write_raw(&mut parcel).unwrap();
        Scalar::from(0xFFu8).write_raw(&mut parcel).unwrap();
        Scalar::from(0xFFFFu16).write_raw(&mut parcel).unwrap();
        assert_eq!(
            parcel.as_bytes(),
            &[
                0xfe, 0xff, 0xff, 0xff, // sign-extended
                0xff, 0x00, 0x00, 0x00, // zero-extended
                0xff, 0xff, 0x00, 0x00, // zero-extended
            ]
        );
    }

    #[test]
    fn int_array() {
        let v = [1, -1];
        assert_eq!(
            body(&FieldValue::from(&v[..])),
            vec![2, 0, 0, 0, 1, 0, 0, 0, 0xff, 0xff, 0xff, 0xff]
        );
    }

    #[test]
    fn str_array() {
        let v = vec!["a".to_string(), String::new()];
        assert_eq!(
            body(&FieldValue::from(&v[..])),
            vec![2, 0, 0, 0, 1, 0, 0, 0, b'a', 0, 0, 0, 0]
        );
    }

    #[test]
    fn str_array_with_null() {
        let v = vec![Some("a".to_string()), None, Some(String::new())];
        assert_eq!(
            body(&FieldValue::strs_opt(&v)),
            vec![
                3, 0, 0, 0, // count
                1, 0, 0, 0, b'a', // "a"
                0xff, 0xff, 0xff, 0xff, // null
                0, 0, 0, 0, // ""
            ]
        );
    }

    #[test]
    fn bytes_and_splice() {
        let v = [9u8, 8];
        assert_eq!(body(&FieldValue::Bytes(&v)), vec![2, 0, 0, 0, 9, 8]);
        let mut other = Parcel::new();
        other.write_bytes(&v).unwrap();
        assert_eq!(body(&FieldValue::splice(&other)), vec![9, 8]);
    }

    #[test]
    fn remote() {
        assert_eq!(
            body(&FieldValue::from(RemoteHandle(0x0102))),
            vec![0x02, 0x01, 0, 0, 0, 0, 0, 0]
        );
    }
}
