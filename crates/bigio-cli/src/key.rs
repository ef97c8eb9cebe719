//! Record ordering: typed integer keys or whole-record bytes.

use crate::KeyArgs;
use anyhow::{Result, bail};
use bigio::FlatView;
use std::cmp::Ordering;

/// Integer key at a fixed offset inside each record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySpec {
    /// Offset within the record
    pub offset: u64,
    /// Width in bytes, 1, 2, 4 or 8
    pub width: u8,
    /// Signed interpretation
    pub signed: bool,
}

impl KeySpec {
    /// Key described by `args`, `None` when no key was requested.
    pub fn from_args(args: &KeyArgs, record_size: usize) -> Result<Option<Self>> {
        let Some(width) = args.key_width else {
            return Ok(None);
        };
        let key = Self {
            offset: args.key_offset.unwrap_or(0),
            width,
            signed: args.signed,
        };
        let end = key.offset.checked_add(u64::from(key.width));
        if end.is_none_or(|end| end > record_size as u64) {
            bail!(
                "key of {} bytes at offset {} does not fit in {}-byte records",
                key.width,
                key.offset,
                record_size
            );
        }
        Ok(Some(key))
    }

    /// Key of the record at `record`.
    pub fn value<V: FlatView + ?Sized>(&self, view: &V, record: u64) -> bigio::Result<i128> {
        let pos = record + self.offset;
        Ok(match (self.width, self.signed) {
            (1, false) => i128::from(view.get_u8(pos)?),
            (1, true) => i128::from(view.get_u8(pos)?.cast_signed()),
            (2, false) => i128::from(view.get_u16(pos)?),
            (2, true) => i128::from(view.get_i16(pos)?),
            (4, false) => i128::from(view.get_u32(pos)?),
            (4, true) => i128::from(view.get_i32(pos)?),
            (_, false) => i128::from(view.get_u64(pos)?),
            (_, true) => i128::from(view.get_i64(pos)?),
        })
    }

    /// Order the records at `a` and `b` by key.
    pub fn compare<V: FlatView + ?Sized>(&self, view: &V, a: u64, b: u64) -> bigio::Result<Ordering> {
        Ok(self.value(view, a)?.cmp(&self.value(view, b)?))
    }
}

/// Order two records by key, or bytewise when `key` is `None`.
pub fn compare_records<V: FlatView + ?Sized>(
    key: Option<&KeySpec>,
    record_size: usize,
    view: &V,
    a: u64,
    b: u64,
) -> bigio::Result<Ordering> {
    match key {
        Some(key) => key.compare(view, a, b),
        None => Ok(view
            .bytes_at(a, record_size)?
            .as_ref()
            .cmp(view.bytes_at(b, record_size)?.as_ref())),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bigio::{ByteOrder, SmallMappedView};

    fn args(offset: Option<u64>, width: Option<u8>, signed: bool) -> KeyArgs {
        KeyArgs {
            key_offset: offset,
            key_width: width,
            signed,
        }
    }

    #[test]
    fn test_no_key() {
        assert_eq!(KeySpec::from_args(&args(None, None, false), 8).unwrap(), None);
    }

    #[test]
    fn test_key_must_fit_record() {
        assert!(KeySpec::from_args(&args(Some(6), Some(4), false), 8).is_err());
        let key = KeySpec::from_args(&args(Some(4), Some(4), true), 8)
            .unwrap()
            .unwrap();
        assert_eq!(key.offset, 4);
        assert!(key.signed);
    }

    #[test]
    fn test_signed_and_unsigned_keys() {
        let view = SmallMappedView::from_vec(vec![0xff, 0xff, 0x00, 0x01]);
        let unsigned = KeySpec {
            offset: 0,
            width: 2,
            signed: false,
        };
        let signed = KeySpec {
            signed: true,
            ..unsigned
        };
        assert_eq!(unsigned.value(&view, 0).unwrap(), 0xffff);
        assert_eq!(signed.value(&view, 0).unwrap(), -1);
        assert_eq!(signed.compare(&view, 0, 2).unwrap(), Ordering::Less);
        assert_eq!(unsigned.compare(&view, 0, 2).unwrap(), Ordering::Greater);
    }

    #[test]
    fn test_key_follows_byte_order() {
        let view = SmallMappedView::from_vec(vec![0x01, 0x00, 0x00, 0x02])
            .with_byte_order(ByteOrder::Little);
        let key = KeySpec {
            offset: 0,
            width: 2,
            signed: false,
        };
        assert_eq!(key.compare(&view, 0, 2).unwrap(), Ordering::Less);
        assert_eq!(key.value(&view, 2).unwrap(), 0x0200);
    }

    #[test]
    fn test_bytewise_records() {
        let view = SmallMappedView::from_vec(vec![1, 2, 1, 3]);
        assert_eq!(
            compare_records(None, 2, &view, 0, 2).unwrap(),
            Ordering::Less
        );
    }
}
