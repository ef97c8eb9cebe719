//! Byte order adapter over another view.

use crate::endian::ByteOrder;
use crate::view::FlatView;
use crate::Result;
use std::borrow::Cow;
use std::cmp::Ordering;

/// View that decodes multi-byte values of `inner` in a chosen byte order.
///
/// When the requested order equals the order of `inner`, every access is
/// passed through untouched. Byte and range accesses never change.
#[derive(Debug)]
pub struct ByteOrderView<V> {
    inner: V,
    order: ByteOrder,
    swap: bool,
}

impl<V: FlatView> ByteOrderView<V> {
    /// Decode `inner` in `order`.
    pub fn new(inner: V, order: ByteOrder) -> Self {
        let swap = inner.byte_order() != order;
        Self { inner, order, swap }
    }

    /// Whether accesses are byte-swapped relative to `inner`.
    pub const fn is_swapping(&self) -> bool {
        self.swap
    }

    /// Give back the underlying view.
    pub fn into_inner(self) -> V {
        self.inner
    }
}

macro_rules! swap_if {
    ($self:ident, $value:expr) => {
        if $self.swap {
            $value.swap_bytes()
        } else {
            $value
        }
    };
}

impl<V: FlatView> FlatView for ByteOrderView<V> {
    fn size(&self) -> u64 {
        self.inner.size()
    }

    fn byte_order(&self) -> ByteOrder {
        self.order
    }

    fn get_u8(&self, pos: u64) -> Result<u8> {
        self.inner.get_u8(pos)
    }

    fn get_u16(&self, pos: u64) -> Result<u16> {
        Ok(swap_if!(self, self.inner.get_u16(pos)?))
    }

    fn get_u32(&self, pos: u64) -> Result<u32> {
        Ok(swap_if!(self, self.inner.get_u32(pos)?))
    }

    fn get_u64(&self, pos: u64) -> Result<u64> {
        Ok(swap_if!(self, self.inner.get_u64(pos)?))
    }

    fn get_bytes(&self, pos: u64, dst: &mut [u8]) -> Result<()> {
        self.inner.get_bytes(pos, dst)
    }

    fn put_u8(&mut self, pos: u64, value: u8) -> Result<()> {
        self.inner.put_u8(pos, value)
    }

    fn put_u16(&mut self, pos: u64, value: u16) -> Result<()> {
        let value = swap_if!(self, value);
        self.inner.put_u16(pos, value)
    }

    fn put_u32(&mut self, pos: u64, value: u32) -> Result<()> {
        let value = swap_if!(self, value);
        self.inner.put_u32(pos, value)
    }

    fn put_u64(&mut self, pos: u64, value: u64) -> Result<()> {
        let value = swap_if!(self, value);
        self.inner.put_u64(pos, value)
    }

    fn put_bytes(&mut self, pos: u64, src: &[u8]) -> Result<()> {
        self.inner.put_bytes(pos, src)
    }

    fn bytes_at(&self, pos: u64, len: usize) -> Result<Cow<'_, [u8]>> {
        self.inner.bytes_at(pos, len)
    }

    fn compare_bytes(&self, pos: u64, other: &[u8]) -> Result<Ordering> {
        self.inner.compare_bytes(pos, other)
    }

    fn equals_bytes(&self, pos: u64, other: &[u8]) -> Result<bool> {
        self.inner.equals_bytes(pos, other)
    }

    fn flush(&self) -> Result<()> {
        self.inner.flush()
    }

    fn close(&mut self) {
        self.inner.close();
    }
}
