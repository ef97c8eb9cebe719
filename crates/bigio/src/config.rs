//! Configuration for mapping a resource into a view

use crate::composite::{DEFAULT_SEGMENT_SHIFT, MAX_SEGMENT_SHIFT};
use crate::endian::ByteOrder;
use crate::{FlatError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::str::FromStr;
use tracing::debug;

/// Access mode of a mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MapMode {
    /// Mapping can only be read
    #[default]
    ReadOnly,
    /// Mapping can be read and written; writes reach the resource
    ReadWrite,
}

impl fmt::Display for MapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ReadOnly => "read-only",
            Self::ReadWrite => "read-write",
        })
    }
}

impl FromStr for MapMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "read-only" | "ro" | "r" => Ok(Self::ReadOnly),
            "read-write" | "rw" => Ok(Self::ReadWrite),
            other => Err(format!("unknown map mode: {other}")),
        }
    }
}

/// Options controlling how a resource is mapped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapOptions {
    /// Access mode
    pub mode: MapMode,

    /// Offset of the mapped region within the resource
    pub offset: u64,

    /// Length of the mapped region, `None` maps to the end of the resource
    pub length: Option<u64>,

    /// Byte order of multi-byte accessors
    pub byte_order: ByteOrder,

    /// Segment size of composite views as a power of two
    pub segment_shift: u32,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            mode: MapMode::ReadOnly,
            offset: 0,
            length: None,
            byte_order: ByteOrder::Big,
            segment_shift: DEFAULT_SEGMENT_SHIFT,
        }
    }
}

impl MapOptions {
    /// Options for a read-only mapping of the whole resource
    pub fn read_only() -> Self {
        Self::default()
    }

    /// Options for a writable mapping of the whole resource
    pub fn read_write() -> Self {
        Self {
            mode: MapMode::ReadWrite,
            ..Default::default()
        }
    }

    /// Set the access mode
    #[must_use]
    pub const fn with_mode(mut self, mode: MapMode) -> Self {
        self.mode = mode;
        self
    }

    /// Map only `length` bytes starting at `offset`
    #[must_use]
    pub const fn with_region(mut self, offset: u64, length: u64) -> Self {
        self.offset = offset;
        self.length = Some(length);
        self
    }

    /// Start the mapping at `offset`, running to the end of the resource
    #[must_use]
    pub const fn with_offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    /// Set the byte order of multi-byte accessors
    #[must_use]
    pub const fn with_byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    /// Set the composite segment size to `1 << shift` bytes
    #[must_use]
    pub const fn with_segment_shift(mut self, shift: u32) -> Self {
        self.segment_shift = shift;
        self
    }

    /// Segment size in bytes
    pub const fn segment_size(&self) -> u64 {
        1 << self.segment_shift
    }

    /// Validate option consistency
    ///
    /// # Errors
    ///
    /// Returns [`FlatError::InvalidConfig`] when the segment shift is out of range
    pub fn validate(&self) -> Result<()> {
        if self.segment_shift > MAX_SEGMENT_SHIFT {
            return Err(FlatError::InvalidConfig(format!(
                "segment shift {} exceeds maximum {MAX_SEGMENT_SHIFT}",
                self.segment_shift
            )));
        }
        Ok(())
    }

    /// Resolve the mapped length against the size of the resource.
    ///
    /// # Errors
    ///
    /// Returns [`FlatError::InvalidConfig`] when the offset lies past the end
    pub(crate) fn resolve_length(&self, resource_size: u64) -> Result<u64> {
        match self.length {
            Some(length) => Ok(length),
            None => resource_size.checked_sub(self.offset).ok_or_else(|| {
                FlatError::InvalidConfig(format!(
                    "offset {} beyond resource size {resource_size}",
                    self.offset
                ))
            }),
        }
    }

    /// Make sure `length` bytes at the configured offset exist in `file`.
    ///
    /// Read-write mappings grow the file to cover the region, read-only
    /// mappings must lie inside it.
    ///
    /// # Errors
    ///
    /// Returns [`FlatError::InvalidConfig`] when the region overflows or a
    /// read-only region ends past the file, [`FlatError::Io`] when growing
    /// the file fails.
    pub(crate) fn fit_file(&self, file: &File, resource_size: u64, length: u64) -> Result<()> {
        let end = self.offset.checked_add(length).ok_or_else(|| {
            FlatError::InvalidConfig(format!(
                "region of {length} bytes at offset {} overflows",
                self.offset
            ))
        })?;
        if end <= resource_size {
            return Ok(());
        }
        match self.mode {
            MapMode::ReadOnly => Err(FlatError::InvalidConfig(format!(
                "read-only region ends at {end}, beyond resource size {resource_size}"
            ))),
            MapMode::ReadWrite => {
                debug!("Growing resource from {} to {} bytes", resource_size, end);
                file.set_len(end)?;
                Ok(())
            }
        }
    }
}
