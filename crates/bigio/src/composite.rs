//! View stitched together from fixed-size segments.
//!
//! A single native mapping is limited to [`SMALL_MAPPING_LIMIT`] bytes, so
//! larger resources are mapped as an ordered list of segments of
//! `1 << shift` bytes each (only the last may be shorter). A position
//! resolves to a segment by its high bits and to an offset inside that
//! segment by its low bits.
//!
//! Primitives that fit in one segment are decoded directly from that
//! segment. A primitive straddling a boundary is split in half recursively
//! (`u64` into two `u32`, `u32` into two `u16`, `u16` into two bytes) and
//! the halves are joined in the active byte order, which yields exactly
//! what one contiguous buffer would.
//!
//! Range operations walk the segments with a cursor: a partial first
//! chunk, whole middle segments, a partial last chunk.
//!
//! [`SMALL_MAPPING_LIMIT`]: crate::small::SMALL_MAPPING_LIMIT

use crate::bounds::{check_access, check_range};
use crate::config::{MapMode, MapOptions};
use crate::endian::{self, ByteOrder};
use crate::region::Region;
use crate::view::FlatView;
use crate::{FlatError, Result};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fs::File;
use std::io;
use tracing::{debug, warn};

/// Default segment size as a power of two (1 GiB).
pub const DEFAULT_SEGMENT_SHIFT: u32 = 30;

/// Largest accepted segment shift.
pub const MAX_SEGMENT_SHIFT: u32 = 30;

/// Default segment size in bytes.
pub const SEGMENT_SIZE: u64 = 1 << DEFAULT_SEGMENT_SHIFT;

/// Largest logical size of a composite view.
pub const MAX_COMPOSITE_SIZE: u64 = 1 << 62;

/// [`FlatView`] over an ordered list of segments.
pub struct CompositeMappedView {
    segments: Vec<Region>,
    size: u64,
    order: ByteOrder,
    shift: u32,
    writable: bool,
    closed: bool,
}

impl CompositeMappedView {
    /// Map the region of `file` described by `options`, one segment at a time.
    ///
    /// # Errors
    ///
    /// Returns [`FlatError::Unsupported`] when the region exceeds
    /// [`MAX_COMPOSITE_SIZE`] and [`FlatError::Mapping`] naming the first
    /// segment the platform refused. Segments mapped before the failure are
    /// released.
    pub fn map(file: &File, options: &MapOptions) -> Result<Self> {
        options.validate()?;
        let resource_size = file.metadata()?.len();
        let length = options.resolve_length(resource_size)?;
        check_capacity(length)?;
        options.fit_file(file, resource_size, length)?;
        let mut view = Self::try_from_fn(length, options, |_, offset, len| {
            Region::map(file, options.mode, options.offset + offset, len)
        })?;
        // An empty region has no segment to carry the mode
        view.writable &= options.mode == MapMode::ReadWrite;
        Ok(view)
    }

    /// Anonymous zero-filled writable view of `length` bytes.
    pub fn anonymous(length: u64, options: &MapOptions) -> Result<Self> {
        options.validate()?;
        Self::try_from_fn(length, options, |_, _, len| Region::anonymous(len))
    }

    /// Writable view holding a copy of `bytes` in heap segments.
    pub fn from_bytes(bytes: &[u8], options: &MapOptions) -> Result<Self> {
        options.validate()?;
        Self::try_from_fn(bytes.len() as u64, options, |_, offset, len| {
            let start = offset as usize;
            Ok(Region::Heap(bytes[start..start + len].to_vec()))
        })
    }

    /// Build a view from segments produced by `map_segment`.
    ///
    /// `map_segment` receives the segment index, the segment's offset
    /// relative to the mapped region and its length. Either every segment
    /// is produced or none survives.
    pub(crate) fn try_from_fn<F>(length: u64, options: &MapOptions, mut map_segment: F) -> Result<Self>
    where
        F: FnMut(usize, u64, usize) -> io::Result<Region>,
    {
        check_capacity(length)?;
        let shift = options.segment_shift;
        let segment_size = 1u64 << shift;
        let count = usize::try_from(length.div_ceil(segment_size)).map_err(|_| {
            FlatError::Unsupported {
                requested: length,
                max: (usize::MAX as u64).saturating_mul(segment_size),
            }
        })?;

        let mut segments = Vec::new();
        segments
            .try_reserve_exact(count)
            .map_err(|_| FlatError::Unsupported {
                requested: length,
                max: MAX_COMPOSITE_SIZE,
            })?;
        for index in 0..count {
            let offset = (index as u64) << shift;
            let len = (length - offset).min(segment_size) as usize;
            match map_segment(index, offset, len) {
                Ok(region) => segments.push(region),
                Err(source) => {
                    warn!(
                        "Mapping segment {}/{} failed, releasing {} mapped segments: {}",
                        index,
                        count,
                        segments.len(),
                        source
                    );
                    return Err(FlatError::Mapping {
                        segment: index,
                        offset: options.offset.saturating_add(offset),
                        source,
                    });
                }
            }
        }

        let writable = segments.iter().all(Region::is_writable);
        debug!(
            "Mapped composite view: {} bytes in {} segments of {} bytes ({})",
            length,
            count,
            segment_size,
            if writable { "read-write" } else { "read-only" }
        );
        Ok(Self {
            segments,
            size: length,
            order: options.byte_order,
            shift,
            writable,
            closed: false,
        })
    }

    /// Same segments, decoding multi-byte values in `order`.
    #[must_use]
    pub fn with_byte_order(mut self, order: ByteOrder) -> Self {
        self.order = order;
        self
    }

    /// Number of mapped segments.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Segment size in bytes.
    pub const fn segment_size(&self) -> u64 {
        1 << self.shift
    }

    /// Whether writes are accepted.
    pub const fn is_writable(&self) -> bool {
        self.writable && !self.closed
    }

    /// Whether [`FlatView::close`] has been called.
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    const fn segment_of(&self, pos: u64) -> usize {
        (pos >> self.shift) as usize
    }

    const fn local_pos(&self, pos: u64) -> usize {
        (pos & (self.segment_size() - 1)) as usize
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(FlatError::Closed);
        }
        Ok(())
    }

    fn ensure_writable(&self) -> Result<()> {
        self.ensure_open()?;
        if !self.writable {
            return Err(FlatError::ReadOnly);
        }
        Ok(())
    }

    /// Segment pieces covering `length` bytes at `pos`.
    const fn chunks(&self, pos: u64, length: u64) -> Chunks {
        Chunks {
            pos,
            remaining: length,
            shift: self.shift,
        }
    }

    fn segment(&self, index: usize) -> &[u8] {
        self.segments[index].as_slice()
    }

    fn byte(&self, pos: u64) -> u8 {
        self.segment(self.segment_of(pos))[self.local_pos(pos)]
    }

    /// `N` bytes at `pos` when they all lie in one segment.
    fn contiguous<const N: usize>(&self, pos: u64) -> Option<[u8; N]> {
        let local = self.local_pos(pos);
        self.segment(self.segment_of(pos))
            .get(local..local + N)?
            .try_into()
            .ok()
    }

    fn read_u16(&self, pos: u64) -> u16 {
        match self.contiguous(pos) {
            Some(bytes) => endian::read_u16(self.order, bytes),
            None => endian::join_u16(self.order, self.byte(pos), self.byte(pos + 1)),
        }
    }

    fn read_u32(&self, pos: u64) -> u32 {
        match self.contiguous(pos) {
            Some(bytes) => endian::read_u32(self.order, bytes),
            None => endian::join_u32(self.order, self.read_u16(pos), self.read_u16(pos + 2)),
        }
    }

    fn read_u64(&self, pos: u64) -> u64 {
        match self.contiguous(pos) {
            Some(bytes) => endian::read_u64(self.order, bytes),
            None => endian::join_u64(self.order, self.read_u32(pos), self.read_u32(pos + 4)),
        }
    }

    fn write_byte(&mut self, pos: u64, value: u8) -> Result<()> {
        let (index, local) = (self.segment_of(pos), self.local_pos(pos));
        self.segments[index].as_mut_slice()?[local] = value;
        Ok(())
    }

    /// Store `bytes` at `pos` if they fit in one segment.
    fn write_contiguous<const N: usize>(&mut self, pos: u64, bytes: [u8; N]) -> Result<bool> {
        let (index, local) = (self.segment_of(pos), self.local_pos(pos));
        match self.segments[index].as_mut_slice()?.get_mut(local..local + N) {
            Some(dst) => {
                dst.copy_from_slice(&bytes);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn write_u16(&mut self, pos: u64, value: u16) -> Result<()> {
        if self.write_contiguous(pos, endian::write_u16(self.order, value))? {
            return Ok(());
        }
        let (first, second) = endian::split_u16(self.order, value);
        self.write_byte(pos, first)?;
        self.write_byte(pos + 1, second)
    }

    fn write_u32(&mut self, pos: u64, value: u32) -> Result<()> {
        if self.write_contiguous(pos, endian::write_u32(self.order, value))? {
            return Ok(());
        }
        let (first, second) = endian::split_u32(self.order, value);
        self.write_u16(pos, first)?;
        self.write_u16(pos + 2, second)
    }

    fn write_u64(&mut self, pos: u64, value: u64) -> Result<()> {
        if self.write_contiguous(pos, endian::write_u64(self.order, value))? {
            return Ok(());
        }
        let (first, second) = endian::split_u64(self.order, value);
        self.write_u32(pos, first)?;
        self.write_u32(pos + 4, second)
    }

    fn check_read(&self, pos: u64, width: usize) -> Result<()> {
        self.ensure_open()?;
        check_access(pos, width, self.size)
    }

    fn check_write(&self, pos: u64, width: usize) -> Result<()> {
        self.ensure_writable()?;
        check_access(pos, width, self.size)
    }
}

fn check_capacity(length: u64) -> Result<()> {
    if length > MAX_COMPOSITE_SIZE {
        return Err(FlatError::Unsupported {
            requested: length,
            max: MAX_COMPOSITE_SIZE,
        });
    }
    Ok(())
}

/// Cursor over the segment pieces of a byte range.
///
/// Yields `(segment, local offset, length)` triples in address order.
struct Chunks {
    pos: u64,
    remaining: u64,
    shift: u32,
}

impl Iterator for Chunks {
    type Item = (usize, usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let segment_size = 1u64 << self.shift;
        let local = self.pos & (segment_size - 1);
        let len = (segment_size - local).min(self.remaining);
        let item = ((self.pos >> self.shift) as usize, local as usize, len as usize);
        self.pos += len;
        self.remaining -= len;
        Some(item)
    }
}

impl FlatView for CompositeMappedView {
    fn size(&self) -> u64 {
        self.size
    }

    fn byte_order(&self) -> ByteOrder {
        self.order
    }

    fn get_u8(&self, pos: u64) -> Result<u8> {
        self.check_read(pos, 1)?;
        Ok(self.byte(pos))
    }

    fn get_u16(&self, pos: u64) -> Result<u16> {
        self.check_read(pos, 2)?;
        Ok(self.read_u16(pos))
    }

    fn get_u32(&self, pos: u64) -> Result<u32> {
        self.check_read(pos, 4)?;
        Ok(self.read_u32(pos))
    }

    fn get_u64(&self, pos: u64) -> Result<u64> {
        self.check_read(pos, 8)?;
        Ok(self.read_u64(pos))
    }

    fn get_bytes(&self, pos: u64, dst: &mut [u8]) -> Result<()> {
        self.ensure_open()?;
        check_range(pos, dst.len() as u64, self.size)?;
        let mut done = 0;
        for (index, local, len) in self.chunks(pos, dst.len() as u64) {
            dst[done..done + len].copy_from_slice(&self.segment(index)[local..local + len]);
            done += len;
        }
        Ok(())
    }

    fn put_u8(&mut self, pos: u64, value: u8) -> Result<()> {
        self.check_write(pos, 1)?;
        self.write_byte(pos, value)
    }

    fn put_u16(&mut self, pos: u64, value: u16) -> Result<()> {
        self.check_write(pos, 2)?;
        self.write_u16(pos, value)
    }

    fn put_u32(&mut self, pos: u64, value: u32) -> Result<()> {
        self.check_write(pos, 4)?;
        self.write_u32(pos, value)
    }

    fn put_u64(&mut self, pos: u64, value: u64) -> Result<()> {
        self.check_write(pos, 8)?;
        self.write_u64(pos, value)
    }

    fn put_bytes(&mut self, pos: u64, src: &[u8]) -> Result<()> {
        self.ensure_writable()?;
        check_range(pos, src.len() as u64, self.size)?;
        let mut done = 0;
        for (index, local, len) in self.chunks(pos, src.len() as u64) {
            self.segments[index].as_mut_slice()?[local..local + len]
                .copy_from_slice(&src[done..done + len]);
            done += len;
        }
        Ok(())
    }

    fn bytes_at(&self, pos: u64, len: usize) -> Result<Cow<'_, [u8]>> {
        self.ensure_open()?;
        check_range(pos, len as u64, self.size)?;
        if len == 0 {
            return Ok(Cow::Borrowed(&[]));
        }
        let (index, local) = (self.segment_of(pos), self.local_pos(pos));
        if let Some(window) = self.segment(index).get(local..local + len) {
            return Ok(Cow::Borrowed(window));
        }
        let mut copy = vec![0u8; len];
        self.get_bytes(pos, &mut copy)?;
        Ok(Cow::Owned(copy))
    }

    fn compare_bytes(&self, pos: u64, other: &[u8]) -> Result<Ordering> {
        self.ensure_open()?;
        check_range(pos, other.len() as u64, self.size)?;
        let mut done = 0;
        for (index, local, len) in self.chunks(pos, other.len() as u64) {
            let order = self.segment(index)[local..local + len].cmp(&other[done..done + len]);
            if order != Ordering::Equal {
                return Ok(order);
            }
            done += len;
        }
        Ok(Ordering::Equal)
    }

    fn equals_bytes(&self, pos: u64, other: &[u8]) -> Result<bool> {
        self.ensure_open()?;
        check_range(pos, other.len() as u64, self.size)?;
        let mut done = 0;
        for (index, local, len) in self.chunks(pos, other.len() as u64) {
            if self.segment(index)[local..local + len] != other[done..done + len] {
                return Ok(false);
            }
            done += len;
        }
        Ok(true)
    }

    fn flush(&self) -> Result<()> {
        self.ensure_open()?;
        for segment in &self.segments {
            segment.flush()?;
        }
        Ok(())
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        debug!("Releasing {} composite segments", self.segments.len());
        self.segments.clear();
        self.closed = true;
    }
}
