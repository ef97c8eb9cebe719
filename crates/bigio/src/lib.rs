//! Byte-addressable views over memory-mapped storage larger than a single
//! native mapping, and an in-place sort for fixed-size records stored in
//! them.
//!
//! Every storage strategy implements the [`FlatView`] trait:
//!
//! - **[`SmallMappedView`]**: one native mapping of up to 2^31 - 1 bytes
//! - **[`CompositeMappedView`]**: 1 GiB segments stitched into one address
//!   space of up to 2^62 bytes
//! - **[`BoundedView`]**: an offset and length window over another view
//! - **[`ByteOrderView`]**: another view decoded in the opposite byte order
//!
//! [`MappedView`] picks the small or composite strategy from the size of
//! the mapped region. [`sort`] and [`sort_by_offset`] reorder records in
//! place through the trait, touching no more memory than two records.
//!
//! # Example
//!
//! ```rust,no_run
//! use bigio::{ByteOrder, FlatView, MapOptions, MappedView};
//!
//! # fn example() -> bigio::Result<()> {
//! let options = MapOptions::read_write().with_byte_order(ByteOrder::Little);
//! let mut view = MappedView::open("records.bin", &options)?;
//! let size = view.size();
//! bigio::sort_by_offset(&mut view, 28, 0, size, |v, a, b| {
//!     Ok(v.get_i32(a)?.cmp(&v.get_i32(b)?))
//! })?;
//! view.flush()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

// Errors
pub mod error;

// Bounds and byte order primitives
pub mod bounds;
pub mod endian;

// View contract
pub mod view;

// Native mappings
mod region;

// Storage strategies
pub mod composite;
pub mod mapped;
pub mod small;

// Adapters
pub mod bounded;
pub mod swapped;

// Configuration
pub mod config;

// Record sorting
pub mod sort;

pub use bounded::BoundedView;
pub use composite::{CompositeMappedView, MAX_COMPOSITE_SIZE, SEGMENT_SIZE};
pub use config::{MapMode, MapOptions};
pub use endian::ByteOrder;
pub use error::{FlatError, Result};
pub use mapped::{MappedView, Strategy};
pub use small::{SMALL_MAPPING_LIMIT, SmallMappedView};
pub use sort::{retarget_pivot, sort, sort_by_offset};
pub use swapped::ByteOrderView;
pub use view::{FlatView, compare_views, equals_range};
