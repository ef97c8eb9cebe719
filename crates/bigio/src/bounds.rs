//! Overflow-safe bounds checks shared by every view.
//!
//! Legal sizes, positions and lengths all stay below 2^63, so any operand
//! out of that range, and any subtraction that wraps, shows up in the top
//! bit. The fast path ORs every term together and tests that bit once:
//!
//! ```text
//! pos | length | (pos + length) | (size - length - pos)
//! ```
//!
//! Only a rejected access pays for the exact comparison, which also decides
//! whether the position or the length was the offending term.

use crate::{FlatError, Result};

const SIGN_BIT: u64 = 1 << 63;

/// Check that `length` bytes starting at `pos` lie inside `size` bytes.
///
/// # Errors
///
/// Returns [`FlatError::PositionOutOfRange`] when `pos` is past the end and
/// [`FlatError::LengthOutOfRange`] when the range starts inside but extends
/// beyond `size`.
#[inline]
pub fn check_range(pos: u64, length: u64, size: u64) -> Result<()> {
    let terms =
        pos | length | pos.wrapping_add(length) | size.wrapping_sub(length).wrapping_sub(pos);
    if terms & SIGN_BIT != 0 {
        return check_exact(pos, length, size);
    }
    Ok(())
}

/// Check a fixed-width primitive access, `width` being 1, 2, 4 or 8.
#[inline]
pub fn check_access(pos: u64, width: usize, size: u64) -> Result<()> {
    check_range(pos, width as u64, size)
}

/// Exact check for values the fast path could not vouch for.
///
/// Views larger than 2^63 bytes never exist in practice, but a window may
/// be declared with such a length; those accesses land here and are
/// accepted when they are genuinely in range.
#[cold]
fn check_exact(pos: u64, length: u64, size: u64) -> Result<()> {
    if pos > size {
        return Err(FlatError::PositionOutOfRange { pos, size });
    }
    match pos.checked_add(length) {
        Some(end) if end <= size => Ok(()),
        _ => Err(FlatError::LengthOutOfRange { pos, length, size }),
    }
}
