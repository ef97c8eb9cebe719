use crate::key::KeySpec;
use crate::{OutputFormat, RecordArgs, print_json};
use anyhow::{Context, Result};
use bigio::{FlatView, MapMode, MappedView};
use serde::Serialize;
use std::time::Instant;
use tracing::info;

/// Outcome of an in-place sort
#[derive(Debug, Serialize)]
pub struct SortReport {
    pub records: u64,
    pub record_size: usize,
    pub elapsed_ms: u128,
}

pub fn handle(args: &RecordArgs, format: OutputFormat) -> Result<()> {
    let key = KeySpec::from_args(&args.key, args.record_size)?;
    let mut view = MappedView::open(&args.file, &args.map.options(MapMode::ReadWrite))
        .with_context(|| format!("Failed to map {}", args.file.display()))?;
    let length = args.area_length(view.size())?;

    let started = Instant::now();
    let sorted = match key {
        Some(key) => bigio::sort_by_offset(
            &mut view,
            args.record_size,
            args.start,
            length,
            |v, a, b| key.compare(v, a, b),
        ),
        None => bigio::sort(&mut view, args.record_size, args.start, length, |a, b| {
            a.cmp(b)
        }),
    };
    sorted.with_context(|| format!("Failed to sort {}", args.file.display()))?;
    view.flush().context("Failed to flush sorted records")?;

    let report = SortReport {
        records: length / args.record_size as u64,
        record_size: args.record_size,
        elapsed_ms: started.elapsed().as_millis(),
    };
    info!(
        "Sorted {} records of {} bytes in {} ms",
        report.records, report.record_size, report.elapsed_ms
    );
    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => println!("Sorted {} records", report.records),
    }
    Ok(())
}
