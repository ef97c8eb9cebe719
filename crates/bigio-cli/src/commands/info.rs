use crate::{MapArgs, OutputFormat, print_json};
use anyhow::{Context, Result};
use bigio::{ByteOrder, FlatView, MapMode, MappedView, Strategy};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Layout of a mapped file
#[derive(Debug, Serialize)]
pub struct InfoReport {
    pub path: PathBuf,
    pub size: u64,
    pub strategy: Strategy,
    pub segments: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment_size: Option<u64>,
    pub byte_order: ByteOrder,
}

pub fn handle(file: &Path, map: &MapArgs, format: OutputFormat) -> Result<()> {
    let report = inspect(file, map)?;
    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => {
            println!("Path:       {}", report.path.display());
            println!("Size:       {} bytes", report.size);
            println!("Strategy:   {}", report.strategy);
            println!("Segments:   {}", report.segments);
            if let Some(segment_size) = report.segment_size {
                println!("Segment:    {segment_size} bytes");
            }
            println!("Byte order: {}", report.byte_order);
        }
    }
    Ok(())
}

pub fn inspect(file: &Path, map: &MapArgs) -> Result<InfoReport> {
    let options = map.options(MapMode::ReadOnly);
    let view = MappedView::open(file, &options)
        .with_context(|| format!("Failed to map {}", file.display()))?;
    debug!("Inspecting {} ({} bytes)", file.display(), view.size());
    Ok(InfoReport {
        path: file.to_path_buf(),
        size: view.size(),
        strategy: view.strategy(),
        segments: view.segment_count(),
        segment_size: match view.strategy() {
            Strategy::Composite => Some(options.segment_size()),
            Strategy::Small => None,
        },
        byte_order: view.byte_order(),
    })
}
