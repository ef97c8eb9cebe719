//! Mapping factory choosing the storage strategy by size.

use crate::composite::{CompositeMappedView, DEFAULT_SEGMENT_SHIFT};
use crate::config::{MapMode, MapOptions};
use crate::endian::ByteOrder;
use crate::small::{SMALL_MAPPING_LIMIT, SmallMappedView};
use crate::view::FlatView;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::path::Path;
use tracing::debug;

/// Storage strategy backing a [`MappedView`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// One native mapping
    Small,
    /// Several fixed-size segments
    Composite,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Small => "small",
            Self::Composite => "composite",
        })
    }
}

/// Mapped view of a resource using whichever strategy fits its size.
pub enum MappedView {
    /// Region fits in one mapping
    Small(SmallMappedView),
    /// Region is split into segments
    Composite(CompositeMappedView),
}

/// Pick the strategy for a region of `length` bytes.
///
/// Regions up to [`SMALL_MAPPING_LIMIT`] use one mapping. A segment size
/// below the default forces segments for anything larger than one segment.
pub fn strategy_for(length: u64, options: &MapOptions) -> Strategy {
    let segmented = options.segment_shift != DEFAULT_SEGMENT_SHIFT;
    if length > SMALL_MAPPING_LIMIT || (segmented && length > options.segment_size()) {
        Strategy::Composite
    } else {
        Strategy::Small
    }
}

impl MappedView {
    /// Map the region of an open file.
    pub fn map(file: &File, options: &MapOptions) -> Result<Self> {
        options.validate()?;
        let length = options.resolve_length(file.metadata()?.len())?;
        let view = match strategy_for(length, options) {
            Strategy::Small => Self::Small(SmallMappedView::map(file, options)?),
            Strategy::Composite => Self::Composite(CompositeMappedView::map(file, options)?),
        };
        debug!(
            "Mapped {} bytes with {} strategy ({} segments)",
            view.size(),
            view.strategy(),
            view.segment_count()
        );
        Ok(view)
    }

    /// Open the file at `path` in the configured mode and map it.
    ///
    /// The file handle is dropped once mapped; the mappings stay valid.
    pub fn open(path: impl AsRef<Path>, options: &MapOptions) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(options.mode == MapMode::ReadWrite)
            .open(path)?;
        debug!("Opened {} ({})", path.display(), options.mode);
        Self::map(&file, options)
    }

    /// Anonymous zero-filled writable memory of `length` bytes.
    pub fn anonymous(length: u64, options: &MapOptions) -> Result<Self> {
        options.validate()?;
        Ok(match strategy_for(length, options) {
            Strategy::Small => Self::Small(
                SmallMappedView::anonymous(length)?.with_byte_order(options.byte_order),
            ),
            Strategy::Composite => {
                Self::Composite(CompositeMappedView::anonymous(length, options)?)
            }
        })
    }

    /// Strategy in use.
    pub const fn strategy(&self) -> Strategy {
        match self {
            Self::Small(_) => Strategy::Small,
            Self::Composite(_) => Strategy::Composite,
        }
    }

    /// Number of native mappings held.
    pub fn segment_count(&self) -> usize {
        match self {
            Self::Small(view) => usize::from(!view.is_closed()),
            Self::Composite(view) => view.segment_count(),
        }
    }

    /// Whether writes are accepted.
    pub fn is_writable(&self) -> bool {
        match self {
            Self::Small(view) => view.is_writable(),
            Self::Composite(view) => view.is_writable(),
        }
    }

    /// Same storage, decoding multi-byte values in `order`.
    #[must_use]
    pub fn with_byte_order(self, order: ByteOrder) -> Self {
        match self {
            Self::Small(view) => Self::Small(view.with_byte_order(order)),
            Self::Composite(view) => Self::Composite(view.with_byte_order(order)),
        }
    }
}

macro_rules! delegate {
    ($self:ident, $view:ident => $call:expr) => {
        match $self {
            MappedView::Small($view) => $call,
            MappedView::Composite($view) => $call,
        }
    };
}

impl FlatView for MappedView {
    fn size(&self) -> u64 {
        delegate!(self, v => v.size())
    }

    fn byte_order(&self) -> ByteOrder {
        delegate!(self, v => v.byte_order())
    }

    fn get_u8(&self, pos: u64) -> Result<u8> {
        delegate!(self, v => v.get_u8(pos))
    }

    fn get_u16(&self, pos: u64) -> Result<u16> {
        delegate!(self, v => v.get_u16(pos))
    }

    fn get_u32(&self, pos: u64) -> Result<u32> {
        delegate!(self, v => v.get_u32(pos))
    }

    fn get_u64(&self, pos: u64) -> Result<u64> {
        delegate!(self, v => v.get_u64(pos))
    }

    fn get_bytes(&self, pos: u64, dst: &mut [u8]) -> Result<()> {
        delegate!(self, v => v.get_bytes(pos, dst))
    }

    fn put_u8(&mut self, pos: u64, value: u8) -> Result<()> {
        delegate!(self, v => v.put_u8(pos, value))
    }

    fn put_u16(&mut self, pos: u64, value: u16) -> Result<()> {
        delegate!(self, v => v.put_u16(pos, value))
    }

    fn put_u32(&mut self, pos: u64, value: u32) -> Result<()> {
        delegate!(self, v => v.put_u32(pos, value))
    }

    fn put_u64(&mut self, pos: u64, value: u64) -> Result<()> {
        delegate!(self, v => v.put_u64(pos, value))
    }

    fn put_bytes(&mut self, pos: u64, src: &[u8]) -> Result<()> {
        delegate!(self, v => v.put_bytes(pos, src))
    }

    fn bytes_at(&self, pos: u64, len: usize) -> Result<Cow<'_, [u8]>> {
        delegate!(self, v => v.bytes_at(pos, len))
    }

    fn compare_bytes(&self, pos: u64, other: &[u8]) -> Result<Ordering> {
        delegate!(self, v => v.compare_bytes(pos, other))
    }

    fn equals_bytes(&self, pos: u64, other: &[u8]) -> Result<bool> {
        delegate!(self, v => v.equals_bytes(pos, other))
    }

    fn flush(&self) -> Result<()> {
        delegate!(self, v => v.flush())
    }

    fn close(&mut self) {
        delegate!(self, v => v.close());
    }
}
