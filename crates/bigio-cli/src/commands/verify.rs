use crate::key::{KeySpec, compare_records};
use crate::{OutputFormat, RecordArgs, print_json};
use anyhow::{Context, Result, bail};
use bigio::{FlatError, FlatView, MapMode, MappedView};
use serde::Serialize;
use std::cmp::Ordering;

/// Ordering check of a record area
#[derive(Debug, Serialize)]
pub struct VerifyReport {
    pub records: u64,
    pub sorted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_unsorted: Option<u64>,
}

pub fn handle(args: &RecordArgs, format: OutputFormat) -> Result<()> {
    let key = KeySpec::from_args(&args.key, args.record_size)?;
    let view = MappedView::open(&args.file, &args.map.options(MapMode::ReadOnly))
        .with_context(|| format!("Failed to map {}", args.file.display()))?;
    let length = args.area_length(view.size())?;
    let report = verify(&view, args.record_size, args.start, length, key.as_ref())?;

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => match report.first_unsorted {
            None => println!("{} records sorted", report.records),
            Some(index) => println!("Record {index} of {} is out of order", report.records),
        },
    }
    if let Some(index) = report.first_unsorted {
        bail!("record {index} is out of order");
    }
    Ok(())
}

/// Find the first record that orders before its predecessor.
pub fn verify<V: FlatView + ?Sized>(
    view: &V,
    record_size: usize,
    start: u64,
    length: u64,
    key: Option<&KeySpec>,
) -> bigio::Result<VerifyReport> {
    let width = record_size as u64;
    if width == 0 || length % width != 0 {
        return Err(FlatError::Unaligned {
            length,
            record_size,
        });
    }
    let records = length / width;
    let mut first_unsorted = None;
    for index in 1..records {
        let current = start + index * width;
        if compare_records(key, record_size, view, current - width, current)? == Ordering::Greater {
            first_unsorted = Some(index);
            break;
        }
    }
    Ok(VerifyReport {
        records,
        sorted: first_unsorted.is_none(),
        first_unsorted,
    })
}
