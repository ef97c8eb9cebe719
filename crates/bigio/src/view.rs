//! The byte-addressable view contract shared by every storage strategy.
//!
//! A [`FlatView`] is a stateless window onto a sequence of bytes: it has no
//! cursor, every access names its position explicitly and is bounds-checked
//! against [`FlatView::size`]. Positions are 64-bit, so a single view can
//! address far more than one native mapping can hold.
//!
//! Reads take `&self` and writes `&mut self`. Sub-views and byte-order
//! adapters compose by value, and `&mut V` is itself a view, so a window can
//! borrow its parent instead of owning it:
//!
//! ```
//! use bigio::{ByteOrder, FlatView, SmallMappedView};
//!
//! # fn main() -> bigio::Result<()> {
//! let mut view = SmallMappedView::from_vec(vec![0u8; 16]);
//! {
//!     let mut window = (&mut view).sub_view(4, 8).order(ByteOrder::Little);
//!     window.put_u32(0, 0x0102_0304)?;
//! }
//! assert_eq!(view.get_u32(4)?, 0x0403_0201);
//! # Ok(())
//! # }
//! ```

use crate::bounded::BoundedView;
use crate::bounds::check_range;
use crate::endian::ByteOrder;
use crate::swapped::ByteOrderView;
use crate::Result;
use std::borrow::Cow;
use std::cmp::Ordering;

/// Chunk size used when comparing two views against each other.
const COMPARE_CHUNK: usize = 64 * 1024;

/// Byte-addressable buffer over some backing storage.
pub trait FlatView {
    /// Number of addressable bytes.
    fn size(&self) -> u64;

    /// Byte order used by the multi-byte accessors.
    fn byte_order(&self) -> ByteOrder;

    /// Read one byte.
    fn get_u8(&self, pos: u64) -> Result<u8>;

    /// Read a 16-bit value.
    fn get_u16(&self, pos: u64) -> Result<u16>;

    /// Read a 32-bit value.
    fn get_u32(&self, pos: u64) -> Result<u32>;

    /// Read a 64-bit value.
    fn get_u64(&self, pos: u64) -> Result<u64>;

    /// Copy `dst.len()` bytes starting at `pos` into `dst`.
    fn get_bytes(&self, pos: u64, dst: &mut [u8]) -> Result<()>;

    /// Write one byte.
    fn put_u8(&mut self, pos: u64, value: u8) -> Result<()>;

    /// Write a 16-bit value.
    fn put_u16(&mut self, pos: u64, value: u16) -> Result<()>;

    /// Write a 32-bit value.
    fn put_u32(&mut self, pos: u64, value: u32) -> Result<()>;

    /// Write a 64-bit value.
    fn put_u64(&mut self, pos: u64, value: u64) -> Result<()>;

    /// Copy `src` into the view starting at `pos`.
    fn put_bytes(&mut self, pos: u64, src: &[u8]) -> Result<()>;

    /// Read-only window of `len` bytes at `pos`.
    ///
    /// Implementations borrow the storage directly when the range is
    /// contiguous and fall back to a copy otherwise. The window must not
    /// outlive the next write, which the borrow checker enforces.
    fn bytes_at(&self, pos: u64, len: usize) -> Result<Cow<'_, [u8]>> {
        let mut buf = vec![0u8; len];
        self.get_bytes(pos, &mut buf)?;
        Ok(Cow::Owned(buf))
    }

    /// Compare `other.len()` bytes at `pos` with `other`, bytes unsigned.
    fn compare_bytes(&self, pos: u64, other: &[u8]) -> Result<Ordering> {
        Ok(self.bytes_at(pos, other.len())?.as_ref().cmp(other))
    }

    /// Whether the bytes at `pos` equal `other`.
    fn equals_bytes(&self, pos: u64, other: &[u8]) -> Result<bool> {
        Ok(self.compare_bytes(pos, other)? == Ordering::Equal)
    }

    /// Write pending changes back to the backing store.
    fn flush(&self) -> Result<()> {
        Ok(())
    }

    /// Release resources held by this view. Calling it again is a no-op.
    fn close(&mut self) {}

    /// Read a signed 16-bit value.
    fn get_i16(&self, pos: u64) -> Result<i16> {
        self.get_u16(pos).map(u16::cast_signed)
    }

    /// Read a signed 32-bit value.
    fn get_i32(&self, pos: u64) -> Result<i32> {
        self.get_u32(pos).map(u32::cast_signed)
    }

    /// Read a signed 64-bit value.
    fn get_i64(&self, pos: u64) -> Result<i64> {
        self.get_u64(pos).map(u64::cast_signed)
    }

    /// Write a signed 16-bit value.
    fn put_i16(&mut self, pos: u64, value: i16) -> Result<()> {
        self.put_u16(pos, value.cast_unsigned())
    }

    /// Write a signed 32-bit value.
    fn put_i32(&mut self, pos: u64, value: i32) -> Result<()> {
        self.put_u32(pos, value.cast_unsigned())
    }

    /// Write a signed 64-bit value.
    fn put_i64(&mut self, pos: u64, value: i64) -> Result<()> {
        self.put_u64(pos, value.cast_unsigned())
    }

    /// Window of `length` bytes starting at `pos`.
    ///
    /// Nothing is validated here; every access through the window is checked
    /// against the window length and then against this view.
    fn sub_view(self, pos: u64, length: u64) -> BoundedView<Self>
    where
        Self: Sized,
    {
        BoundedView::new(self, pos, length)
    }

    /// View decoding multi-byte values in `order`.
    ///
    /// Passes accesses straight through when `order` already matches.
    fn order(self, order: ByteOrder) -> ByteOrderView<Self>
    where
        Self: Sized,
    {
        ByteOrderView::new(self, order)
    }
}

impl<V: FlatView + ?Sized> FlatView for &mut V {
    fn size(&self) -> u64 {
        (**self).size()
    }

    fn byte_order(&self) -> ByteOrder {
        (**self).byte_order()
    }

    fn get_u8(&self, pos: u64) -> Result<u8> {
        (**self).get_u8(pos)
    }

    fn get_u16(&self, pos: u64) -> Result<u16> {
        (**self).get_u16(pos)
    }

    fn get_u32(&self, pos: u64) -> Result<u32> {
        (**self).get_u32(pos)
    }

    fn get_u64(&self, pos: u64) -> Result<u64> {
        (**self).get_u64(pos)
    }

    fn get_bytes(&self, pos: u64, dst: &mut [u8]) -> Result<()> {
        (**self).get_bytes(pos, dst)
    }

    fn put_u8(&mut self, pos: u64, value: u8) -> Result<()> {
        (**self).put_u8(pos, value)
    }

    fn put_u16(&mut self, pos: u64, value: u16) -> Result<()> {
        (**self).put_u16(pos, value)
    }

    fn put_u32(&mut self, pos: u64, value: u32) -> Result<()> {
        (**self).put_u32(pos, value)
    }

    fn put_u64(&mut self, pos: u64, value: u64) -> Result<()> {
        (**self).put_u64(pos, value)
    }

    fn put_bytes(&mut self, pos: u64, src: &[u8]) -> Result<()> {
        (**self).put_bytes(pos, src)
    }

    fn bytes_at(&self, pos: u64, len: usize) -> Result<Cow<'_, [u8]>> {
        (**self).bytes_at(pos, len)
    }

    fn compare_bytes(&self, pos: u64, other: &[u8]) -> Result<Ordering> {
        (**self).compare_bytes(pos, other)
    }

    fn equals_bytes(&self, pos: u64, other: &[u8]) -> Result<bool> {
        (**self).equals_bytes(pos, other)
    }

    fn flush(&self) -> Result<()> {
        (**self).flush()
    }

    fn close(&mut self) {
        (**self).close();
    }
}

/// Total order of two views by content.
///
/// Bytes compare unsigned in storage order, byte order settings play no
/// part. When one view is a strict prefix of the other the shorter one is
/// smaller.
pub fn compare_views<L, R>(left: &L, right: &R) -> Result<Ordering>
where
    L: FlatView + ?Sized,
    R: FlatView + ?Sized,
{
    let common = left.size().min(right.size());
    let mut pos = 0;
    while pos < common {
        let len = (common - pos).min(COMPARE_CHUNK as u64) as usize;
        let a = left.bytes_at(pos, len)?;
        let b = right.bytes_at(pos, len)?;
        let order = a.as_ref().cmp(b.as_ref());
        if order != Ordering::Equal {
            return Ok(order);
        }
        pos += len as u64;
    }
    Ok(left.size().cmp(&right.size()))
}

/// Whether `length` bytes at `pos` in `left` equal those at `offset` in `right`.
///
/// Both ranges are bounds-checked before any byte is compared.
pub fn equals_range<L, R>(left: &L, pos: u64, right: &R, offset: u64, length: u64) -> Result<bool>
where
    L: FlatView + ?Sized,
    R: FlatView + ?Sized,
{
    check_range(pos, length, left.size())?;
    check_range(offset, length, right.size())?;
    let mut done = 0;
    while done < length {
        let len = (length - done).min(COMPARE_CHUNK as u64) as usize;
        let a = left.bytes_at(pos + done, len)?;
        let b = right.bytes_at(offset + done, len)?;
        if a != b {
            return Ok(false);
        }
        done += len as u64;
    }
    Ok(true)
}
