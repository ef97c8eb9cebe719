//! Error types for flat view operations

use thiserror::Error;

/// Result type for flat view operations.
pub type Result<T> = std::result::Result<T, FlatError>;

/// Errors that can occur while mapping, accessing or sorting a flat view.
#[derive(Debug, Error)]
pub enum FlatError {
    /// Access position lies outside the view.
    #[error("position out of bounds: {pos} (size {size})")]
    PositionOutOfRange {
        /// Offending position
        pos: u64,
        /// Size of the view that rejected the access
        size: u64,
    },

    /// Access starts inside the view but its length runs past the end.
    #[error("length out of bounds: {length} at position {pos} (size {size})")]
    LengthOutOfRange {
        /// Start of the access
        pos: u64,
        /// Offending length
        length: u64,
        /// Size of the view that rejected the access
        size: u64,
    },

    /// Sorted area is not a whole number of records.
    #[error("area length {length} is not a multiple of record size {record_size}")]
    Unaligned {
        /// Length of the area to sort
        length: u64,
        /// Record size requested by the caller
        record_size: usize,
    },

    /// Requested size exceeds what the mapping strategy can represent.
    #[error("unsupported mapping size {requested} bytes, maximum is {max}")]
    Unsupported {
        /// Requested logical size
        requested: u64,
        /// Maximum size of the chosen strategy
        max: u64,
    },

    /// Native mapping of one segment failed.
    #[error("failed to map segment {segment} at offset {offset}: {source}")]
    Mapping {
        /// Index of the segment that could not be mapped
        segment: usize,
        /// Resource offset of that segment
        offset: u64,
        /// Underlying mapping error
        #[source]
        source: std::io::Error,
    },

    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Write attempted through a read-only mapping.
    #[error("view is mapped read-only")]
    ReadOnly,

    /// Access attempted after the view was closed.
    #[error("view is closed")]
    Closed,

    /// Mapping options rejected.
    #[error("Configuration error: {0}")]
    InvalidConfig(String),
}

impl FlatError {
    /// Whether this error reports a position or length outside a view.
    pub const fn is_out_of_range(&self) -> bool {
        matches!(
            self,
            Self::PositionOutOfRange { .. } | Self::LengthOutOfRange { .. }
        )
    }

    /// Whether this error comes from the underlying storage.
    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Mapping { .. } | Self::Io(_))
    }
}
