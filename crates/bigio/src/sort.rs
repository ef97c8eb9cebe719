//! In-place sorting of fixed-size records stored in a view.
//!
//! Records never leave the view except through two scratch buffers of one
//! record each, used to exchange two records. The algorithm is a three-way
//! quicksort:
//!
//! - the pivot is the middle record of the range;
//! - one pass splits the range into records below, equal to and above the
//!   pivot, equal records staying where the scan found them;
//! - the smaller outer part is sorted recursively, the larger one by the
//!   same loop with narrowed bounds, so the stack depth stays logarithmic.
//!
//! The pivot is compared in place, so every exchange that moves the pivot
//! record updates the tracked pivot offset through [`retarget_pivot`].

use crate::bounds::check_range;
use crate::view::FlatView;
use crate::{FlatError, Result};
use std::cmp::Ordering;
use tracing::debug;

/// Sort the records in `length` bytes at `start` with a window comparator.
///
/// `compare` receives read-only windows of `record_size` bytes each.
///
/// # Errors
///
/// Returns [`FlatError::Unaligned`] when `length` is not a multiple of
/// `record_size`, and the view's own error when `start..start + length` lies
/// outside it. Nothing is modified when either check fails. A range of zero
/// or one record is left alone without touching the view.
///
/// ```
/// use bigio::{FlatView, SmallMappedView};
///
/// # fn main() -> bigio::Result<()> {
/// let mut view = SmallMappedView::from_vec(vec![3, 0, 2, 0, 1, 0]);
/// bigio::sort(&mut view, 2, 0, 6, |a, b| a.cmp(b))?;
/// assert_eq!(view.as_bytes()?, &[1, 0, 2, 0, 3, 0]);
/// # Ok(())
/// # }
/// ```
pub fn sort<V, C>(
    view: &mut V,
    record_size: usize,
    start: u64,
    length: u64,
    mut compare: C,
) -> Result<()>
where
    V: FlatView + ?Sized,
    C: FnMut(&[u8], &[u8]) -> Ordering,
{
    sort_by_offset(view, record_size, start, length, |view: &V, left, right| {
        let left = view.bytes_at(left, record_size)?;
        let right = view.bytes_at(right, record_size)?;
        Ok(compare(&left, &right))
    })
}

/// Sort the records in `length` bytes at `start`, comparing by offset.
///
/// `compare` receives the view and the offsets of two records and reads
/// whatever it needs from them. Its errors abort the sort and are returned
/// unchanged.
///
/// ```
/// use bigio::{ByteOrder, FlatView, SmallMappedView};
///
/// # fn main() -> bigio::Result<()> {
/// let mut view = SmallMappedView::from_vec(vec![0; 12]).with_byte_order(ByteOrder::Little);
/// for (i, value) in [7i32, -1, 3].into_iter().enumerate() {
///     view.put_i32(i as u64 * 4, value)?;
/// }
/// bigio::sort_by_offset(&mut view, 4, 0, 12, |v, a, b| Ok(v.get_i32(a)?.cmp(&v.get_i32(b)?)))?;
/// assert_eq!(view.get_i32(0)?, -1);
/// assert_eq!(view.get_i32(8)?, 7);
/// # Ok(())
/// # }
/// ```
pub fn sort_by_offset<V, C>(
    view: &mut V,
    record_size: usize,
    start: u64,
    length: u64,
    compare: C,
) -> Result<()>
where
    V: FlatView + ?Sized,
    C: FnMut(&V, u64, u64) -> Result<Ordering>,
{
    let width = record_size as u64;
    if width == 0 || length % width != 0 {
        return Err(FlatError::Unaligned {
            length,
            record_size,
        });
    }
    if length <= width {
        return Ok(());
    }
    check_range(start, length, view.size())?;

    let records = length / width;
    debug!(
        "Sorting {} records of {} bytes at offset {}",
        records, record_size, start
    );
    let mut sorter = Sorter {
        view,
        width,
        left: vec![0; record_size],
        right: vec![0; record_size],
        compare,
    };
    sorter.sort_range(start, start + length)?;
    debug!("Sorted {} records", records);
    Ok(())
}

/// Where the pivot record lives after records at `a` and `b` are exchanged.
#[inline]
pub const fn retarget_pivot(pivot: u64, a: u64, b: u64) -> u64 {
    if pivot == a {
        b
    } else if pivot == b {
        a
    } else {
        pivot
    }
}

struct Sorter<'a, V: ?Sized, C> {
    view: &'a mut V,
    width: u64,
    left: Vec<u8>,
    right: Vec<u8>,
    compare: C,
}

impl<V, C> Sorter<'_, V, C>
where
    V: FlatView + ?Sized,
    C: FnMut(&V, u64, u64) -> Result<Ordering>,
{
    fn compare(&mut self, a: u64, b: u64) -> Result<Ordering> {
        (self.compare)(&*self.view, a, b)
    }

    /// Exchange the records at `a` and `b`, returning the new pivot offset.
    fn swap(&mut self, a: u64, b: u64, pivot: u64) -> Result<u64> {
        if a != b {
            self.view.get_bytes(a, &mut self.left)?;
            self.view.get_bytes(b, &mut self.right)?;
            self.view.put_bytes(a, &self.right)?;
            self.view.put_bytes(b, &self.left)?;
        }
        Ok(retarget_pivot(pivot, a, b))
    }

    /// Sort records in the half-open byte range `start..end`.
    fn sort_range(&mut self, mut start: u64, mut end: u64) -> Result<()> {
        let width = self.width;
        loop {
            let span = end - start;
            if span <= 2 * width {
                if span == 2 * width && self.compare(start, start + width)? == Ordering::Greater {
                    self.swap(start, start + width, start)?;
                }
                return Ok(());
            }

            let (lt, gt) = self.partition(start, end)?;
            if lt - start < end - gt {
                self.sort_range(start, lt)?;
                start = gt;
            } else {
                self.sort_range(gt, end)?;
                end = lt;
            }
        }
    }

    /// Split `start..end` around its middle record.
    ///
    /// On return records in `start..lt` compare below the pivot, records in
    /// `lt..gt` equal to it and records in `gt..end` above it.
    fn partition(&mut self, start: u64, end: u64) -> Result<(u64, u64)> {
        let width = self.width;
        let records = (end - start) / width;
        let mut pivot = start + (records - 1) / 2 * width;

        let (mut lt, mut eq, mut gt) = (start, start, end);
        while eq < gt {
            match self.compare(eq, pivot)? {
                Ordering::Less => {
                    pivot = self.swap(eq, lt, pivot)?;
                    lt += width;
                    eq += width;
                }
                Ordering::Greater => {
                    gt -= width;
                    pivot = self.swap(eq, gt, pivot)?;
                }
                Ordering::Equal => eq += width,
            }
        }
        Ok((lt, gt))
    }
}
