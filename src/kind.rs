/// Type codes written in front of each dynamically typed [`Value`](crate::Value).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Str,
    Int,
    Map,
    Short,
    Long,
    Float,
    Double,
    Bool,
    List,
    ByteArray,
    StrArray,
    IntArray,
    LongArray,
    Byte,
}

impl ValueKind {
    /// Return the assigned type code.
    pub fn into_i32(self) -> i32 {
        match self {
            ValueKind::Null => -1,
            ValueKind::Str => 0,
            ValueKind::Int => 1,
            ValueKind::Map => 2,
            ValueKind::Short => 5,
            ValueKind::Long => 6,
            ValueKind::Float => 7,
            ValueKind::Double => 8,
            ValueKind::Bool => 9,
            ValueKind::List => 11,
            ValueKind::ByteArray => 13,
            ValueKind::StrArray => 14,
            ValueKind::IntArray => 18,
            ValueKind::LongArray => 19,
            ValueKind::Byte => 20,
        }
    }

    /// Convert from an assigned type code. Returns `None` if the code isn't recognized.
    pub fn from_i32(v: i32) -> Option<ValueKind> {
        match v {
            -1 => Some(ValueKind::Null),
            0 => Some(ValueKind::Str),
            1 => Some(ValueKind::Int),
            2 => Some(ValueKind::Map),
            5 => Some(ValueKind::Short),
            6 => Some(ValueKind::Long),
            7 => Some(ValueKind::Float),
            8 => Some(ValueKind::Double),
            9 => Some(ValueKind::Bool),
            11 => Some(ValueKind::List),
            13 => Some(ValueKind::ByteArray),
            14 => Some(ValueKind::StrArray),
            18 => Some(ValueKind::IntArray),
            19 => Some(ValueKind::LongArray),
            20 => Some(ValueKind::Byte),
            _ => None,
        }
    }
}

impl From<ValueKind> for i32 {
    fn from(val: ValueKind) -> i32 {
        val.into_i32()
    }
}
