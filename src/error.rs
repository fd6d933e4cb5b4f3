use std::{fmt, io};

use serde::ser;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug)]
pub enum Error {
    /// The underlying buffer failed a read, write, or seek.
    Io(io::Error),
    /// A record or array element grew past what a 32-bit length field can hold.
    LengthTooLong { max: usize, actual: usize },
    /// A field header ended too early while parsing.
    LengthTooShort {
        step: &'static str,
        actual: usize,
        expected: usize,
    },
    /// A record was closed with a body position that `begin_record` could not have returned.
    BadRecordStart(u64),
    /// Occurs when serde serialization fails
    SerdeFail(String),
    /// The serde data model used a shape that has no TLV mapping.
    Unsupported(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Io(ref err) => write!(f, "Buffer I/O failure: {}", err),
            Error::LengthTooLong { max, actual } => write!(
                f,
                "Data too long: was {} bytes, maximum allowed is {}",
                actual, max
            ),
            Error::LengthTooShort {
                step,
                actual,
                expected,
            } => write!(
                f,
                "Expected data length {}, but got {} on step [{}]",
                expected, actual, step
            ),
            Error::BadRecordStart(pos) => {
                write!(f, "Position {} is not the body start of a record", pos)
            }
            Error::SerdeFail(ref msg) => f.write_str(msg),
            Error::Unsupported(ref what) => {
                write!(f, "Can't encode {} as a TLV field", what)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            Error::Io(ref err) => Some(err),
            _ => None,
        }
    }
}

impl std::convert::From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::SerdeFail(msg.to_string())
    }
}
