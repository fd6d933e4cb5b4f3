use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::{
    buffer::TlvBuffer,
    error::Result,
    field::{write_byte_array, write_int_array, write_str_array},
    kind::ValueKind,
};

/// A dynamically typed value, for untyped lists and string-keyed bundles.
///
/// Unlike tagged fields, every `Value` carries its own [`ValueKind`] code on the wire, so a
/// reader can rebuild it without knowing the schema.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Str(String),
    Bytes(Vec<u8>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
    StrArray(Vec<String>),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match *self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Byte(_) => ValueKind::Byte,
            Value::Short(_) => ValueKind::Short,
            Value::Int(_) => ValueKind::Int,
            Value::Long(_) => ValueKind::Long,
            Value::Float(_) => ValueKind::Float,
            Value::Double(_) => ValueKind::Double,
            Value::Str(_) => ValueKind::Str,
            Value::Bytes(_) => ValueKind::ByteArray,
            Value::IntArray(_) => ValueKind::IntArray,
            Value::LongArray(_) => ValueKind::LongArray,
            Value::StrArray(_) => ValueKind::StrArray,
            Value::List(_) => ValueKind::List,
            Value::Map(_) => ValueKind::Map,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        if let Value::Str(ref v) = *self {
            Some(v)
        } else {
            None
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        if let Value::List(ref v) = *self {
            Some(v)
        } else {
            None
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        if let Value::Map(ref v) = *self {
            Some(v)
        } else {
            None
        }
    }

    /// Write the type code followed by the payload.
    pub fn write_to(&self, buf: &mut dyn TlvBuffer) -> Result<()> {
        buf.write_i32(self.kind().into())?;
        match *self {
            Value::Null => Ok(()),
            Value::Bool(v) => buf.write_i32(v as i32),
            Value::Byte(v) => buf.write_i32(v as i32),
            Value::Short(v) => buf.write_i32(v as i32),
            Value::Int(v) => buf.write_i32(v),
            Value::Long(v) => buf.write_i64(v),
            Value::Float(v) => buf.write_f32(v),
            Value::Double(v) => buf.write_f64(v),
            Value::Str(ref v) => buf.write_utf8(v),
            Value::Bytes(ref v) => write_byte_array(buf, v),
            Value::IntArray(ref v) => write_int_array(buf, v),
            Value::LongArray(ref v) => {
                buf.write_len(v.len())?;
                for n in v {
                    buf.write_i64(*n)?;
                }
                Ok(())
            }
            Value::StrArray(ref v) => write_str_array(buf, v.iter().map(|s| Some(s.as_str()))),
            Value::List(ref v) => write_value_list(buf, v),
            Value::Map(ref v) => write_value_map(buf, v),
        }
    }
}

/// Body of an untyped collection: the count, then each value with its type code.
pub(crate) fn write_value_list(buf: &mut dyn TlvBuffer, list: &[Value]) -> Result<()> {
    buf.write_len(list.len())?;
    for v in list {
        v.write_to(buf)?;
    }
    Ok(())
}

/// Body of a bundle: the count, then each key and its typed value, in key order.
pub(crate) fn write_value_map(
    buf: &mut dyn TlvBuffer,
    map: &BTreeMap<String, Value>,
) -> Result<()> {
    buf.write_len(map.len())?;
    for (key, v) in map {
        buf.write_utf8(key)?;
        v.write_to(buf)?;
    }
    Ok(())
}

macro_rules! impl_value_from {
    ($t: ty, $p: ident) => {
        impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::$p(v)
            }
        }
    };
}

impl_value_from!(bool, Bool);
impl_value_from!(i8, Byte);
impl_value_from!(i16, Short);
impl_value_from!(i32, Int);
impl_value_from!(i64, Long);
impl_value_from!(f32, Float);
impl_value_from!(f64, Double);
impl_value_from!(String, Str);
impl_value_from!(Vec<u8>, Bytes);
impl_value_from!(Vec<i32>, IntArray);
impl_value_from!(Vec<i64>, LongArray);
impl_value_from!(Vec<String>, StrArray);
impl_value_from!(Vec<Value>, List);
impl_value_from!(BTreeMap<String, Value>, Map);

impl From<()> for Value {
    fn from((): ()) -> Self {
        Value::Null
    }
}

impl<'a> From<&'a str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl<'a> From<Cow<'a, str>> for Value {
    fn from(v: Cow<'a, str>) -> Self {
        Value::Str(v.into_owned())
    }
}

impl<'a> From<&'a [u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.into())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl<V: Into<Value>> std::iter::FromIterator<V> for Value {
    fn from_iter<T: IntoIterator<Item = V>>(iter: T) -> Self {
        let v: Vec<Value> = iter.into_iter().map(Into::into).collect();
        Value::List(v)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::buffer::Parcel;

    fn encode(v: &Value) -> Vec<u8> {
        let mut parcel = Parcel::new();
        v.write_to(&mut parcel).unwrap();
        parcel.into_bytes()
    }

    #[test]
    fn null() {
        assert_eq!(encode(&Value::Null), vec![0xff, 0xff, 0xff, 0xff]);
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert!(Value::default().is_null());
    }

    #[test]
    fn narrow_ints_widen() {
        assert_eq!(
            encode(&Value::from(-1i8)),
            vec![20, 0, 0, 0, 0xff, 0xff, 0xff, 0xff]
        );
        assert_eq!(
            encode(&Value::from(0x1234i16)),
            vec![5, 0, 0, 0, 0x34, 0x12, 0, 0]
        );
        assert_eq!(encode(&Value::from(true)), vec![9, 0, 0, 0, 1, 0, 0, 0]);
    }

    #[test]
    fn string() {
        assert_eq!(
            encode(&Value::from("ab")),
            vec![0, 0, 0, 0, 2, 0, 0, 0, b'a', b'b']
        );
    }

    #[test]
    fn accessors() {
        let s = Value::from("x");
        assert_eq!(s.as_str(), Some("x"));
        assert_eq!(s.as_list(), None);
        assert_eq!(s.as_map(), None);
        let m = Value::from(BTreeMap::from([("k".to_string(), Value::from(1i32))]));
        assert_eq!(m.as_str(), None);
        assert_eq!(m.as_map().and_then(|m| m.get("k")), Some(&Value::Int(1)));
    }

    #[test]
    fn nested_list() {
        let v: Value = vec![Value::from(1i32), Value::Null].into_iter().collect();
        assert_eq!(
            encode(&v),
            vec![
                11, 0, 0, 0, // list
                2, 0, 0, 0, // count
                1, 0, 0, 0, 1, 0, 0, 0, // int 1
                0xff, 0xff, 0xff, 0xff, // null
            ]
        );
        assert_eq!(v.as_list().map(|l| l.len()), Some(2));
    }

    #[test]
    fn map_in_key_order() {
        let mut map = BTreeMap::new();
        map.insert("b".to_string(), Value::from(2i64));
        map.insert("a".to_string(), Value::from(vec![7i32]));
        let enc = encode(&Value::from(map));
        assert_eq!(
            enc,
            vec![
                2, 0, 0, 0, // map
                2, 0, 0, 0, // count
                1, 0, 0, 0, b'a', // key
                18, 0, 0, 0, 1, 0, 0, 0, 7, 0, 0, 0, // int array
                1, 0, 0, 0, b'b', // key
                6, 0, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0, // long
            ]
        );
    }
}
