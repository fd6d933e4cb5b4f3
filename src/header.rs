use byteorder::{LittleEndian, ReadBytesExt};

use crate::{
    buffer::TlvBuffer,
    error::{Error, Result},
    ESCAPE_LEN,
};

/// High half of an escaped header word. The real length follows in its own `u32`.
pub(crate) const ESCAPE_MASK: u32 = (ESCAPE_LEN as u32) << 16;

/// The framing in front of every field: a tag and the byte length of the body that follows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FieldHeader {
    pub tag: u16,
    pub len: u32,
}

impl FieldHeader {
    pub fn new(tag: u16, len: u32) -> Self {
        Self { tag, len }
    }

    /// Whether the length is too large for the packed form and needs the escape word.
    pub fn is_escaped(&self) -> bool {
        self.len >= ESCAPE_LEN as u32
    }

    /// Number of bytes [`encode`](Self::encode) will write.
    pub fn encoded_len(&self) -> usize {
        if self.is_escaped() {
            8
        } else {
            4
        }
    }

    pub fn encode(&self, buf: &mut dyn TlvBuffer) -> Result<()> {
        if self.is_escaped() {
            buf.write_u32(ESCAPE_MASK | self.tag as u32)?;
            buf.write_u32(self.len)
        } else {
            buf.write_u32(self.len << 16 | self.tag as u32)
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let word = if self.is_escaped() {
            ESCAPE_MASK | self.tag as u32
        } else {
            self.len << 16 | self.tag as u32
        };
        let mut out = Vec::with_capacity(self.encoded_len());
        out.extend_from_slice(&word.to_le_bytes());
        if self.is_escaped() {
            out.extend_from_slice(&self.len.to_le_bytes());
        }
        out
    }

    /// Parse a header off the front of `data`, advancing past it.
    ///
    /// Both the packed and the escaped form are accepted. A record placeholder (escaped, length
    /// patched later) parses the same way as any other escaped header.
    pub fn parse(data: &mut &[u8]) -> Result<FieldHeader> {
        let available = data.len();
        let word = data
            .read_u32::<LittleEndian>()
            .map_err(|_| Error::LengthTooShort {
                step: "field header",
                actual: available,
                expected: 4,
            })?;
        let tag = (word & 0xFFFF) as u16;
        if word & ESCAPE_MASK == ESCAPE_MASK {
            let len = data
                .read_u32::<LittleEndian>()
                .map_err(|_| Error::LengthTooShort {
                    step: "escaped field length",
                    actual: available,
                    expected: 8,
                })?;
            Ok(FieldHeader { tag, len })
        } else {
            Ok(FieldHeader {
                tag,
                len: word >> 16,
            })
        }
    }
}
