//! Offset and length window over another view.

use crate::bounds::check_range;
use crate::endian::ByteOrder;
use crate::view::FlatView;
use crate::{FlatError, Result};
use std::borrow::Cow;
use std::cmp::Ordering;

/// Window of `length` bytes starting at `offset` within `inner`.
///
/// Nothing is validated when the window is created. Each access is first
/// checked against the window length and then handed to `inner`, which
/// applies its own checks.
#[derive(Debug)]
pub struct BoundedView<V> {
    inner: V,
    offset: u64,
    length: u64,
}

impl<V: FlatView> BoundedView<V> {
    /// Window of `length` bytes at `offset`.
    pub const fn new(inner: V, offset: u64, length: u64) -> Self {
        Self {
            inner,
            offset,
            length,
        }
    }

    /// Start of the window in the underlying view.
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// Underlying view.
    pub const fn get_ref(&self) -> &V {
        &self.inner
    }

    /// Give back the underlying view.
    pub fn into_inner(self) -> V {
        self.inner
    }

    /// Translate a window position into the underlying view.
    fn locate(&self, pos: u64, length: u64) -> Result<u64> {
        check_range(pos, length, self.length)?;
        self.offset
            .checked_add(pos)
            .ok_or_else(|| FlatError::PositionOutOfRange {
                pos: self.offset,
                size: self.inner.size(),
            })
    }
}

impl<V: FlatView> FlatView for BoundedView<V> {
    fn size(&self) -> u64 {
        self.length
    }

    fn byte_order(&self) -> ByteOrder {
        self.inner.byte_order()
    }

    fn get_u8(&self, pos: u64) -> Result<u8> {
        self.inner.get_u8(self.locate(pos, 1)?)
    }

    fn get_u16(&self, pos: u64) -> Result<u16> {
        self.inner.get_u16(self.locate(pos, 2)?)
    }

    fn get_u32(&self, pos: u64) -> Result<u32> {
        self.inner.get_u32(self.locate(pos, 4)?)
    }

    fn get_u64(&self, pos: u64) -> Result<u64> {
        self.inner.get_u64(self.locate(pos, 8)?)
    }

    fn get_bytes(&self, pos: u64, dst: &mut [u8]) -> Result<()> {
        let at = self.locate(pos, dst.len() as u64)?;
        self.inner.get_bytes(at, dst)
    }

    fn put_u8(&mut self, pos: u64, value: u8) -> Result<()> {
        let at = self.locate(pos, 1)?;
        self.inner.put_u8(at, value)
    }

    fn put_u16(&mut self, pos: u64, value: u16) -> Result<()> {
        let at = self.locate(pos, 2)?;
        self.inner.put_u16(at, value)
    }

    fn put_u32(&mut self, pos: u64, value: u32) -> Result<()> {
        let at = self.locate(pos, 4)?;
        self.inner.put_u32(at, value)
    }

    fn put_u64(&mut self, pos: u64, value: u64) -> Result<()> {
        let at = self.locate(pos, 8)?;
        self.inner.put_u64(at, value)
    }

    fn put_bytes(&mut self, pos: u64, src: &[u8]) -> Result<()> {
        let at = self.locate(pos, src.len() as u64)?;
        self.inner.put_bytes(at, src)
    }

    fn bytes_at(&self, pos: u64, len: usize) -> Result<Cow<'_, [u8]>> {
        let at = self.locate(pos, len as u64)?;
        self.inner.bytes_at(at, len)
    }

    fn compare_bytes(&self, pos: u64, other: &[u8]) -> Result<Ordering> {
        let at = self.locate(pos, other.len() as u64)?;
        self.inner.compare_bytes(at, other)
    }

    fn equals_bytes(&self, pos: u64, other: &[u8]) -> Result<bool> {
        let at = self.locate(pos, other.len() as u64)?;
        self.inner.equals_bytes(at, other)
    }

    fn flush(&self) -> Result<()> {
        self.inner.flush()
    }

    // The window never owns the lifetime of what it looks into.
    fn close(&mut self) {}
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::SmallMappedView;

    fn numbered(len: usize) -> SmallMappedView {
        SmallMappedView::from_vec((0..len).map(|i| i as u8).collect())
    }

    #[test]
    fn test_window_translates_positions() {
        let window = numbered(32).sub_view(10, 8);
        assert_eq!(window.size(), 8);
        assert_eq!(window.offset(), 10);
        assert_eq!(window.get_u8(0).unwrap(), 10);
        assert_eq!(window.get_u32(4).unwrap(), 0x0e0f_1011);
    }

    #[test]
    fn test_window_checks_own_length() {
        // parent has plenty of room, the window does not
        let mut window = numbered(32).sub_view(10, 8);
        assert!(window.get_u8(7).is_ok());
        assert!(window.get_u8(8).unwrap_err().is_out_of_range());
        assert!(window.get_u16(7).unwrap_err().is_out_of_range());
        assert!(window.put_u64(1, 0).unwrap_err().is_out_of_range());
        assert!(window.get_bytes(6, &mut [0; 3]).unwrap_err().is_out_of_range());
    }

    #[test]
    fn test_window_beyond_parent_fails_lazily() {
        let window = numbered(16).sub_view(12, 100);
        assert_eq!(window.size(), 100);
        assert_eq!(window.get_u8(3).unwrap(), 15);
        assert!(window.get_u8(4).unwrap_err().is_out_of_range());
    }

    #[test]
    fn test_offset_overflow_rejected() {
        let window = numbered(16).sub_view(u64::MAX - 1, 10);
        assert!(matches!(
            window.get_u8(5),
            Err(FlatError::PositionOutOfRange { .. })
        ));
    }

    #[test]
    fn test_writes_reach_parent() {
        let mut parent = numbered(16);
        {
            let mut window = (&mut parent).sub_view(4, 4);
            window.put_u16(1, 0xa1a2).unwrap();
            window.put_bytes(3, &[0xff]).unwrap();
        }
        assert_eq!(
            parent.as_bytes().unwrap()[4..8],
            [4, 0xa1, 0xa2, 0xff]
        );
    }

    #[test]
    fn test_nested_windows() {
        let window = numbered(64).sub_view(8, 32).sub_view(4, 8);
        assert_eq!(window.get_u8(0).unwrap(), 12);
        assert!(window.compare_bytes(0, &[12, 13]).unwrap().is_eq());
        assert!(window.get_u8(8).is_err());
    }

    #[test]
    fn test_close_keeps_parent_open() {
        let mut parent = numbered(8);
        {
            let mut window = (&mut parent).sub_view(0, 4);
            window.close();
            assert_eq!(window.get_u8(1).unwrap(), 1);
        }
        assert!(!parent.is_closed());
    }

    #[test]
    fn test_window_inherits_byte_order() {
        let window = numbered(8)
            .with_byte_order(ByteOrder::Little)
            .sub_view(2, 4);
        assert_eq!(window.byte_order(), ByteOrder::Little);
        assert_eq!(window.get_u16(0).unwrap(), 0x0302);
        assert!(matches!(window.bytes_at(0, 2).unwrap(), Cow::Borrowed(_)));
    }
}
