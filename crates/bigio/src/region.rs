//! A single native mapping backing a view or one of its segments.

use crate::config::MapMode;
use crate::{FlatError, Result};
use memmap2::{Mmap, MmapMut, MmapOptions};
use std::fs::File;
use std::io;

/// One contiguous block of storage.
///
/// Dropping a region releases its mapping.
pub(crate) enum Region {
    /// Read-only file mapping
    ReadOnly(Mmap),
    /// Writable file or anonymous mapping
    ReadWrite(MmapMut),
    /// Plain heap memory
    Heap(Vec<u8>),
    /// Zero-length file region, keeping the mode it was requested with
    Empty(MapMode),
}

impl Region {
    /// Map `len` bytes of `file` starting at `offset`.
    ///
    /// Zero-length requests produce an empty region since the platform
    /// refuses empty mappings.
    pub(crate) fn map(file: &File, mode: MapMode, offset: u64, len: usize) -> io::Result<Self> {
        if len == 0 {
            return Ok(Self::Empty(mode));
        }
        let mut options = MmapOptions::new();
        options.offset(offset).len(len);

        // The mapping stays valid for as long as the region lives; callers
        // own the single-writer discipline for the underlying file.
        #[allow(unsafe_code)]
        let region = match mode {
            MapMode::ReadOnly => Self::ReadOnly(unsafe { options.map(file)? }),
            MapMode::ReadWrite => Self::ReadWrite(unsafe { options.map_mut(file)? }),
        };
        Ok(region)
    }

    /// Anonymous zero-filled writable memory.
    pub(crate) fn anonymous(len: usize) -> io::Result<Self> {
        if len == 0 {
            return Ok(Self::Heap(Vec::new()));
        }
        Ok(Self::ReadWrite(MmapMut::map_anon(len)?))
    }

    pub(crate) fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub(crate) fn as_slice(&self) -> &[u8] {
        match self {
            Self::ReadOnly(map) => &map[..],
            Self::ReadWrite(map) => &map[..],
            Self::Heap(bytes) => &bytes[..],
            Self::Empty(_) => &[],
        }
    }

    pub(crate) fn as_mut_slice(&mut self) -> Result<&mut [u8]> {
        match self {
            Self::ReadOnly(_) | Self::Empty(MapMode::ReadOnly) => Err(FlatError::ReadOnly),
            Self::ReadWrite(map) => Ok(&mut map[..]),
            Self::Heap(bytes) => Ok(&mut bytes[..]),
            Self::Empty(MapMode::ReadWrite) => Ok(&mut []),
        }
    }

    pub(crate) const fn is_writable(&self) -> bool {
        !matches!(self, Self::ReadOnly(_) | Self::Empty(MapMode::ReadOnly))
    }

    /// Write dirty pages of a writable file mapping back to storage.
    pub(crate) fn flush(&self) -> io::Result<()> {
        match self {
            Self::ReadWrite(map) => map.flush(),
            Self::ReadOnly(_) | Self::Heap(_) | Self::Empty(_) => Ok(()),
        }
    }
}
