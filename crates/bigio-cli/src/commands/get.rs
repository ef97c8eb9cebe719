use crate::{MapArgs, OutputFormat, print_json};
use anyhow::{Context, Result};
use bigio::{ByteOrder, FlatView, MapMode, MappedView};
use serde::Serialize;
use std::path::Path;

/// One value read from a file
#[derive(Debug, Serialize)]
pub struct GetReport {
    pub pos: u64,
    pub width: u8,
    pub byte_order: ByteOrder,
    pub value: u64,
}

pub fn handle(file: &Path, pos: u64, width: u8, map: &MapArgs, format: OutputFormat) -> Result<()> {
    let view = MappedView::open(file, &map.options(MapMode::ReadOnly))
        .with_context(|| format!("Failed to map {}", file.display()))?;
    let value = read_value(&view, pos, width)
        .with_context(|| format!("Failed to read {width} bytes at {pos}"))?;
    let report = GetReport {
        pos,
        width,
        byte_order: view.byte_order(),
        value,
    };
    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => {
            println!("0x{:0digits$x}", report.value, digits = usize::from(width) * 2);
        }
    }
    Ok(())
}

/// Read an unsigned value of `width` bytes.
pub fn read_value<V: FlatView + ?Sized>(view: &V, pos: u64, width: u8) -> bigio::Result<u64> {
    Ok(match width {
        1 => u64::from(view.get_u8(pos)?),
        2 => u64::from(view.get_u16(pos)?),
        4 => u64::from(view.get_u32(pos)?),
        _ => view.get_u64(pos)?,
    })
}
