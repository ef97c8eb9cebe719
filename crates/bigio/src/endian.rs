//! Byte order selection and order-aware assembly of multi-byte values.
//!
//! The `join_*` functions rebuild a value from its two halves as they appear
//! in storage (`first` at the lower address), the `split_*` functions do the
//! reverse. Together they let a view decode a value that straddles two
//! independent mappings exactly as one contiguous buffer would.

#![allow(clippy::cast_lossless)]

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Byte order used to decode multi-byte primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ByteOrder {
    /// Most significant byte first. Default for every view.
    #[default]
    Big,
    /// Least significant byte first.
    Little,
}

impl ByteOrder {
    /// Byte order of the host.
    #[cfg(target_endian = "little")]
    pub const NATIVE: Self = Self::Little;
    /// Byte order of the host.
    #[cfg(target_endian = "big")]
    pub const NATIVE: Self = Self::Big;

    /// The opposite byte order.
    pub const fn swapped(self) -> Self {
        match self {
            Self::Big => Self::Little,
            Self::Little => Self::Big,
        }
    }

    /// Lower-case name as used in configuration.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Big => "big",
            Self::Little => "little",
        }
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ByteOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "big" | "be" | "big-endian" => Ok(Self::Big),
            "little" | "le" | "little-endian" => Ok(Self::Little),
            other => Err(format!("unknown byte order: {other}")),
        }
    }
}

/// Combine two bytes in storage order into a `u16`.
#[inline]
pub const fn join_u16(order: ByteOrder, first: u8, second: u8) -> u16 {
    match order {
        ByteOrder::Big => ((first as u16) << 8) | second as u16,
        ByteOrder::Little => ((second as u16) << 8) | first as u16,
    }
}

/// Combine two `u16` halves in storage order into a `u32`.
#[inline]
pub const fn join_u32(order: ByteOrder, first: u16, second: u16) -> u32 {
    match order {
        ByteOrder::Big => ((first as u32) << 16) | second as u32,
        ByteOrder::Little => ((second as u32) << 16) | first as u32,
    }
}

/// Combine two `u32` halves in storage order into a `u64`.
#[inline]
pub const fn join_u64(order: ByteOrder, first: u32, second: u32) -> u64 {
    match order {
        ByteOrder::Big => ((first as u64) << 32) | second as u64,
        ByteOrder::Little => ((second as u64) << 32) | first as u64,
    }
}

/// Split a `u16` into the bytes stored at the lower and the higher address.
#[inline]
pub const fn split_u16(order: ByteOrder, value: u16) -> (u8, u8) {
    let (high, low) = ((value >> 8) as u8, value as u8);
    match order {
        ByteOrder::Big => (high, low),
        ByteOrder::Little => (low, high),
    }
}

/// Split a `u32` into the halves stored at the lower and the higher address.
#[inline]
pub const fn split_u32(order: ByteOrder, value: u32) -> (u16, u16) {
    let (high, low) = ((value >> 16) as u16, value as u16);
    match order {
        ByteOrder::Big => (high, low),
        ByteOrder::Little => (low, high),
    }
}

/// Split a `u64` into the halves stored at the lower and the higher address.
#[inline]
pub const fn split_u64(order: ByteOrder, value: u64) -> (u32, u32) {
    let (high, low) = ((value >> 32) as u32, value as u32);
    match order {
        ByteOrder::Big => (high, low),
        ByteOrder::Little => (low, high),
    }
}

macro_rules! contiguous_codec {
    ($read:ident, $write:ident, $ty:ty, $width:literal) => {
        /// Decode a value from contiguous storage bytes.
        #[inline]
        pub const fn $read(order: ByteOrder, bytes: [u8; $width]) -> $ty {
            match order {
                ByteOrder::Big => <$ty>::from_be_bytes(bytes),
                ByteOrder::Little => <$ty>::from_le_bytes(bytes),
            }
        }

        /// Encode a value into contiguous storage bytes.
        #[inline]
        pub const fn $write(order: ByteOrder, value: $ty) -> [u8; $width] {
            match order {
                ByteOrder::Big => value.to_be_bytes(),
                ByteOrder::Little => value.to_le_bytes(),
            }
        }
    };
}

contiguous_codec!(read_u16, write_u16, u16, 2);
contiguous_codec!(read_u32, write_u32, u32, 4);
contiguous_codec!(read_u64, write_u64, u64, 8);

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_join_matches_contiguous_decode() {
        let bytes = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
        for order in [ByteOrder::Big, ByteOrder::Little] {
            let a = join_u16(order, bytes[0], bytes[1]);
            let b = join_u16(order, bytes[2], bytes[3]);
            let c = join_u16(order, bytes[4], bytes[5]);
            let d = join_u16(order, bytes[6], bytes[7]);
            assert_eq!(a, read_u16(order, [0x01, 0x02]));
            let lo = join_u32(order, a, b);
            let hi = join_u32(order, c, d);
            assert_eq!(lo, read_u32(order, [0x01, 0x02, 0x03, 0x04]));
            assert_eq!(join_u64(order, lo, hi), read_u64(order, bytes));
        }
    }

    #[test]
    fn test_concrete_values() {
        assert_eq!(join_u16(ByteOrder::Big, 0xff, 0x00), 0xff00);
        assert_eq!(join_u16(ByteOrder::Little, 0xff, 0x00), 0x00ff);
        assert_eq!(split_u32(ByteOrder::Big, 0x0708_090a), (0x0708, 0x090a));
        assert_eq!(split_u32(ByteOrder::Little, 0x0708_090a), (0x090a, 0x0708));
    }

    #[test]
    fn test_byte_order_names() {
        assert_eq!("big".parse::<ByteOrder>(), Ok(ByteOrder::Big));
        assert_eq!("LE".parse::<ByteOrder>(), Ok(ByteOrder::Little));
        assert!("middle".parse::<ByteOrder>().is_err());
        assert_eq!(ByteOrder::Little.to_string(), "little");
        assert_eq!(ByteOrder::Big.swapped(), ByteOrder::Little);
        assert_eq!(ByteOrder::default(), ByteOrder::Big);
    }

    fn byte_order() -> impl Strategy<Value = ByteOrder> {
        prop_oneof![Just(ByteOrder::Big), Just(ByteOrder::Little)]
    }

    proptest! {
        #[test]
        fn split_then_join_is_identity(order in byte_order(), value in any::<u64>()) {
            let (a, b) = split_u64(order, value);
            let (a0, a1) = split_u32(order, a);
            let (b0, b1) = split_u32(order, b);
            prop_assert_eq!(join_u32(order, a0, a1), a);
            prop_assert_eq!(join_u32(order, b0, b1), b);
            prop_assert_eq!(join_u64(order, a, b), value);
            let (c0, c1) = split_u16(order, a0);
            prop_assert_eq!(join_u16(order, c0, c1), a0);
        }

        #[test]
        fn split_matches_contiguous_encode(order in byte_order(), value in any::<u32>()) {
            let bytes = write_u32(order, value);
            let (first, second) = split_u32(order, value);
            prop_assert_eq!(write_u16(order, first), [bytes[0], bytes[1]]);
            prop_assert_eq!(write_u16(order, second), [bytes[2], bytes[3]]);
        }
    }
}
