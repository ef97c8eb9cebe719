//! View backed by exactly one native mapping.
//!
//! Every access resolves to a single slice operation, which makes this the
//! reference the composite view is measured against.

use crate::bounds::{check_access, check_range};
use crate::config::MapOptions;
use crate::endian::{self, ByteOrder};
use crate::region::Region;
use crate::view::FlatView;
use crate::{FlatError, Result};
use std::borrow::Cow;
use std::fs::File;
use tracing::debug;

/// Largest region a single native mapping may cover (2^31 - 1 bytes).
pub const SMALL_MAPPING_LIMIT: u64 = i32::MAX as u64;

/// [`FlatView`] over one mapping of at most [`SMALL_MAPPING_LIMIT`] bytes.
pub struct SmallMappedView {
    region: Option<Region>,
    size: u64,
    order: ByteOrder,
}

impl SmallMappedView {
    /// Map the region of `file` described by `options`.
    ///
    /// # Errors
    ///
    /// Returns [`FlatError::Unsupported`] when the region is larger than
    /// [`SMALL_MAPPING_LIMIT`] and [`FlatError::Mapping`] when the platform
    /// refuses the mapping.
    pub fn map(file: &File, options: &MapOptions) -> Result<Self> {
        options.validate()?;
        let resource_size = file.metadata()?.len();
        let length = options.resolve_length(resource_size)?;
        let len = checked_len(length)?;
        options.fit_file(file, resource_size, length)?;
        let region =
            Region::map(file, options.mode, options.offset, len).map_err(|source| {
                FlatError::Mapping {
                    segment: 0,
                    offset: options.offset,
                    source,
                }
            })?;
        debug!(
            "Mapped {} bytes at offset {} ({})",
            length, options.offset, options.mode
        );
        Ok(Self::from_region(region, options.byte_order))
    }

    /// Anonymous zero-filled writable view of `length` bytes.
    pub fn anonymous(length: u64) -> Result<Self> {
        let len = checked_len(length)?;
        let region = Region::anonymous(len).map_err(|source| FlatError::Mapping {
            segment: 0,
            offset: 0,
            source,
        })?;
        Ok(Self::from_region(region, ByteOrder::default()))
    }

    /// Writable view over heap bytes, big-endian.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self::from_region(Region::Heap(bytes), ByteOrder::default())
    }

    pub(crate) fn from_region(region: Region, order: ByteOrder) -> Self {
        Self {
            size: region.len() as u64,
            region: Some(region),
            order,
        }
    }

    /// Same storage, decoding multi-byte values in `order`.
    #[must_use]
    pub fn with_byte_order(mut self, order: ByteOrder) -> Self {
        self.order = order;
        self
    }

    /// Whether writes are accepted.
    pub fn is_writable(&self) -> bool {
        self.region.as_ref().is_some_and(Region::is_writable)
    }

    /// Whether [`FlatView::close`] has been called.
    pub const fn is_closed(&self) -> bool {
        self.region.is_none()
    }

    /// The whole content as one slice.
    pub fn as_bytes(&self) -> Result<&[u8]> {
        self.region
            .as_ref()
            .map(Region::as_slice)
            .ok_or(FlatError::Closed)
    }

    fn as_bytes_mut(&mut self) -> Result<&mut [u8]> {
        self.region
            .as_mut()
            .ok_or(FlatError::Closed)?
            .as_mut_slice()
    }

    fn read_array<const N: usize>(&self, pos: u64) -> Result<[u8; N]> {
        let bytes = self.as_bytes()?;
        check_access(pos, N, self.size)?;
        let start = pos as usize;
        let mut out = [0u8; N];
        out.copy_from_slice(&bytes[start..start + N]);
        Ok(out)
    }

    fn write_array<const N: usize>(&mut self, pos: u64, value: [u8; N]) -> Result<()> {
        let size = self.size;
        let bytes = self.as_bytes_mut()?;
        check_access(pos, N, size)?;
        let start = pos as usize;
        bytes[start..start + N].copy_from_slice(&value);
        Ok(())
    }
}

fn checked_len(length: u64) -> Result<usize> {
    if length > SMALL_MAPPING_LIMIT {
        return Err(FlatError::Unsupported {
            requested: length,
            max: SMALL_MAPPING_LIMIT,
        });
    }
    usize::try_from(length).map_err(|_| FlatError::Unsupported {
        requested: length,
        max: usize::MAX as u64,
    })
}

impl FlatView for SmallMappedView {
    fn size(&self) -> u64 {
        self.size
    }

    fn byte_order(&self) -> ByteOrder {
        self.order
    }

    fn get_u8(&self, pos: u64) -> Result<u8> {
        self.read_array::<1>(pos).map(|[b]| b)
    }

    fn get_u16(&self, pos: u64) -> Result<u16> {
        Ok(endian::read_u16(self.order, self.read_array(pos)?))
    }

    fn get_u32(&self, pos: u64) -> Result<u32> {
        Ok(endian::read_u32(self.order, self.read_array(pos)?))
    }

    fn get_u64(&self, pos: u64) -> Result<u64> {
        Ok(endian::read_u64(self.order, self.read_array(pos)?))
    }

    fn get_bytes(&self, pos: u64, dst: &mut [u8]) -> Result<()> {
        let bytes = self.as_bytes()?;
        check_range(pos, dst.len() as u64, self.size)?;
        let start = pos as usize;
        dst.copy_from_slice(&bytes[start..start + dst.len()]);
        Ok(())
    }

    fn put_u8(&mut self, pos: u64, value: u8) -> Result<()> {
        self.write_array(pos, [value])
    }

    fn put_u16(&mut self, pos: u64, value: u16) -> Result<()> {
        self.write_array(pos, endian::write_u16(self.order, value))
    }

    fn put_u32(&mut self, pos: u64, value: u32) -> Result<()> {
        self.write_array(pos, endian::write_u32(self.order, value))
    }

    fn put_u64(&mut self, pos: u64, value: u64) -> Result<()> {
        self.write_array(pos, endian::write_u64(self.order, value))
    }

    fn put_bytes(&mut self, pos: u64, src: &[u8]) -> Result<()> {
        let size = self.size;
        let bytes = self.as_bytes_mut()?;
        check_range(pos, src.len() as u64, size)?;
        let start = pos as usize;
        bytes[start..start + src.len()].copy_from_slice(src);
        Ok(())
    }

    fn bytes_at(&self, pos: u64, len: usize) -> Result<Cow<'_, [u8]>> {
        let bytes = self.as_bytes()?;
        check_range(pos, len as u64, self.size)?;
        let start = pos as usize;
        Ok(Cow::Borrowed(&bytes[start..start + len]))
    }

    fn flush(&self) -> Result<()> {
        match &self.region {
            Some(region) => Ok(region.flush()?),
            None => Err(FlatError::Closed),
        }
    }

    fn close(&mut self) {
        if self.region.take().is_some() {
            debug!("Released mapping of {} bytes", self.size);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::MapMode;
    use std::io::Write;

    fn pattern(len: usize) -> Vec<u8> {
        (0..len).map(|i| i as u8).collect()
    }

    #[test]
    fn test_read_big_endian() {
        let view = SmallMappedView::from_vec(pattern(64));
        assert_eq!(view.get_u8(7).unwrap(), 7);
        assert_eq!(view.get_u16(7).unwrap(), 0x0708);
        assert_eq!(view.get_u32(7).unwrap(), 0x0708_090a);
        assert_eq!(view.get_u64(7).unwrap(), 0x0708_090a_0b0c_0d0e);
        let mut bytes = [0u8; 8];
        view.get_bytes(7, &mut bytes).unwrap();
        assert_eq!(bytes, [7, 8, 9, 10, 11, 12, 13, 14]);
    }

    #[test]
    fn test_read_little_endian() {
        let view = SmallMappedView::from_vec(pattern(64)).with_byte_order(ByteOrder::Little);
        assert_eq!(view.byte_order(), ByteOrder::Little);
        assert_eq!(view.get_u16(7).unwrap(), 0x0807);
        assert_eq!(view.get_u32(7).unwrap(), 0x0a09_0807);
        assert_eq!(view.get_u64(7).unwrap(), 0x0e0d_0c0b_0a09_0807);
    }

    #[test]
    fn test_write_round_trip() {
        let mut view = SmallMappedView::from_vec(vec![0; 32]).with_byte_order(ByteOrder::Little);
        view.put_u16(2, 0x0506).unwrap();
        view.put_u32(4, 0x0708_090a).unwrap();
        view.put_u64(8, 0x0102_0304_0506_0708).unwrap();
        view.put_bytes(16, &[1, 2, 3]).unwrap();
        let bytes = view.as_bytes().unwrap();
        assert_eq!(&bytes[2..4], &[6, 5]);
        assert_eq!(&bytes[4..8], &[10, 9, 8, 7]);
        assert_eq!(&bytes[8..16], &[8, 7, 6, 5, 4, 3, 2, 1]);
        assert_eq!(&bytes[16..19], &[1, 2, 3]);
    }

    #[test]
    fn test_boundary_access() {
        let mut view = SmallMappedView::from_vec(pattern(10));
        assert_eq!(view.get_u8(9).unwrap(), 9);
        assert!(view.get_u8(10).unwrap_err().is_out_of_range());
        assert!(view.get_u16(9).unwrap_err().is_out_of_range());
        assert!(view.get_u64(3).unwrap_err().is_out_of_range());
        assert!(view.put_u32(8, 1).unwrap_err().is_out_of_range());
        // failed write leaves content untouched
        assert_eq!(view.as_bytes().unwrap(), pattern(10).as_slice());
    }

    #[test]
    fn test_window_is_borrowed() {
        let view = SmallMappedView::from_vec(pattern(16));
        let window = view.bytes_at(4, 4).unwrap();
        assert!(matches!(window, Cow::Borrowed(_)));
        assert_eq!(window.as_ref(), &[4, 5, 6, 7]);
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut view = SmallMappedView::from_vec(pattern(4));
        view.close();
        view.close();
        assert!(view.is_closed());
        assert!(matches!(view.get_u8(0), Err(FlatError::Closed)));
        assert!(matches!(view.put_u8(0, 1), Err(FlatError::Closed)));
    }

    #[test]
    fn test_map_file_region() {
        let mut file = tempfile::tempfile().expect("temp file");
        file.write_all(&pattern(256)).unwrap();

        let options = MapOptions::read_only().with_region(16, 32);
        let mut view = SmallMappedView::map(&file, &options).unwrap();
        assert_eq!(view.size(), 32);
        assert_eq!(view.get_u8(0).unwrap(), 16);
        assert!(!view.is_writable());
        assert!(matches!(view.put_u8(0, 1), Err(FlatError::ReadOnly)));
    }

    #[test]
    fn test_empty_file_keeps_mode() {
        let file = tempfile::tempfile().expect("temp file");

        let mut view = SmallMappedView::map(&file, &MapOptions::read_only()).unwrap();
        assert_eq!(view.size(), 0);
        assert!(!view.is_writable());
        assert!(matches!(view.put_bytes(0, &[]), Err(FlatError::ReadOnly)));

        let mut view = SmallMappedView::map(&file, &MapOptions::read_write()).unwrap();
        assert!(view.is_writable());
        view.put_bytes(0, &[]).unwrap();
    }

    #[test]
    fn test_map_file_writes_through() {
        let mut file = tempfile::tempfile().expect("temp file");
        file.write_all(&[0; 64]).unwrap();

        let options = MapOptions::read_write().with_byte_order(ByteOrder::Little);
        {
            let mut view = SmallMappedView::map(&file, &options).unwrap();
            view.put_u32(10, 0xdead_beef).unwrap();
            view.flush().unwrap();
        }
        let view = SmallMappedView::map(&file, &MapOptions::default().with_mode(MapMode::ReadOnly))
            .unwrap();
        assert_eq!(view.get_u32(10).unwrap(), 0xefbe_adde);
    }

    #[test]
    fn test_oversized_mapping_unsupported() {
        let file = tempfile::tempfile().expect("temp file");
        let options = MapOptions::read_only().with_region(0, SMALL_MAPPING_LIMIT + 1);
        assert!(matches!(
            SmallMappedView::map(&file, &options),
            Err(FlatError::Unsupported { requested, max })
                if requested == SMALL_MAPPING_LIMIT + 1 && max == SMALL_MAPPING_LIMIT
        ));
    }

    #[test]
    fn test_anonymous_zeroed() {
        let view = SmallMappedView::anonymous(4096).unwrap();
        assert_eq!(view.size(), 4096);
        assert!(view.is_writable());
        assert_eq!(view.get_u64(4088).unwrap(), 0);
    }
}
