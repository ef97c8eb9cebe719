//! bigio command-line library
//!
//! Argument types and command handlers behind the `bigio` binary.

pub mod commands;
pub mod key;

pub use crate::commands::{
    get::handle as handle_get, info::handle as handle_info, sort::handle as handle_sort,
    verify::handle as handle_verify,
};
pub use crate::key::KeySpec;

use anyhow::{Result, bail};
use bigio::{ByteOrder, MapMode, MapOptions};
use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show size and mapping layout of a file
    Info {
        /// File to inspect
        file: PathBuf,

        #[command(flatten)]
        map: MapArgs,
    },

    /// Read one value at a position
    Get {
        /// File to read from
        file: PathBuf,

        /// Byte position of the value
        #[arg(short, long)]
        pos: u64,

        /// Width of the value in bytes (1, 2, 4 or 8)
        #[arg(short, long, default_value = "1", value_parser = parse_width)]
        width: u8,

        #[command(flatten)]
        map: MapArgs,
    },

    /// Sort fixed-size records of a file in place
    Sort(RecordArgs),

    /// Check that the records of a file are sorted
    Verify(RecordArgs),
}

/// How a file is mapped
#[derive(Args, Debug, Clone)]
pub struct MapArgs {
    /// Byte order of multi-byte values
    #[arg(long, default_value = "big")]
    pub byte_order: ByteOrder,

    /// Segment size as a power of two
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(0..=30))]
    pub segment_shift: u32,
}

impl MapArgs {
    /// Mapping options for `mode`.
    pub fn options(&self, mode: MapMode) -> MapOptions {
        MapOptions::default()
            .with_mode(mode)
            .with_byte_order(self.byte_order)
            .with_segment_shift(self.segment_shift)
    }
}

/// Records area and ordering of a record file
#[derive(Args, Debug, Clone)]
pub struct RecordArgs {
    /// Record file
    pub file: PathBuf,

    /// Size of one record in bytes
    #[arg(short, long)]
    pub record_size: usize,

    /// Byte offset of the first record
    #[arg(long, default_value_t = 0)]
    pub start: u64,

    /// Length of the record area in bytes, defaults to the rest of the file
    #[arg(long)]
    pub length: Option<u64>,

    #[command(flatten)]
    pub key: KeyArgs,

    #[command(flatten)]
    pub map: MapArgs,
}

impl RecordArgs {
    /// Length of the record area in a file of `size` bytes.
    pub fn area_length(&self, size: u64) -> Result<u64> {
        match self.length {
            Some(length) => Ok(length),
            None => match size.checked_sub(self.start) {
                Some(length) => Ok(length),
                None => bail!("start {} is beyond file size {size}", self.start),
            },
        }
    }
}

/// Typed sort key inside each record
#[derive(Args, Debug, Clone, Default)]
pub struct KeyArgs {
    /// Offset of the key within a record
    #[arg(long, requires = "key_width")]
    pub key_offset: Option<u64>,

    /// Width of the key in bytes (1, 2, 4 or 8); without a key records compare bytewise
    #[arg(long, value_parser = parse_width)]
    pub key_width: Option<u8>,

    /// Interpret the key as a signed integer
    #[arg(long, requires = "key_width")]
    pub signed: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain text output
    Text,
    /// JSON output
    Json,
}

/// Parse a primitive width.
pub fn parse_width(s: &str) -> std::result::Result<u8, String> {
    match s.parse::<u8>() {
        Ok(width @ (1 | 2 | 4 | 8)) => Ok(width),
        _ => Err(format!("invalid width '{s}', expected 1, 2, 4 or 8")),
    }
}

/// Print `value` as one line of JSON.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}
