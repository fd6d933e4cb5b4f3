use crate::{buffer::TlvBuffer, error::Result};

/// Flag bit telling a value it is being written as the result of a call, so it may release
/// resources it would otherwise keep for the caller.
pub const WRITE_RETURN_VALUE: u32 = 0x0001;

/// A value that knows how to write its own body into a TLV buffer.
///
/// Implementations usually open an object envelope with [`begin_object`], write their fields
/// with [`write_scalar`] and [`write_sized`], then close it with [`end_object`]. The `flags` are
/// passed through to nested values unchanged.
///
/// [`begin_object`]: crate::writer::begin_object
/// [`end_object`]: crate::writer::end_object
/// [`write_scalar`]: crate::writer::write_scalar
/// [`write_sized`]: crate::writer::write_sized
pub trait Parcelable {
    fn write_to_parcel(&self, buf: &mut dyn TlvBuffer, flags: u32) -> Result<()>;
}

impl<T: Parcelable + ?Sized> Parcelable for &T {
    fn write_to_parcel(&self, buf: &mut dyn TlvBuffer, flags: u32) -> Result<()> {
        (**self).write_to_parcel(buf, flags)
    }
}

impl<T: Parcelable + ?Sized> Parcelable for Box<T> {
    fn write_to_parcel(&self, buf: &mut dyn TlvBuffer, flags: u32) -> Result<()> {
        (**self).write_to_parcel(buf, flags)
    }
}

/// An opaque token naming an object that lives on the other side of the process boundary.
///
/// Resolving the token is up to the transport; on the wire it is just the 64-bit handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RemoteHandle(pub u64);

impl Parcelable for RemoteHandle {
    fn write_to_parcel(&self, buf: &mut dyn TlvBuffer, _flags: u32) -> Result<()> {
        buf.write_i64(self.0 as i64)
    }
}
