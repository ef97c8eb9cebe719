//! Record sorting benchmarks.
//!
//! Sorts 28-byte records keyed by a leading little-endian `i32`, comparing
//! the window comparator, the offset comparator and `slice::sort_unstable`
//! over the same records held in memory.
//!
//! Run with:
//! ```bash
//! cargo bench --bench flat_sort
//! ```

#![allow(clippy::expect_used)]

use bigio::{ByteOrder, CompositeMappedView, FlatView, MapOptions, SmallMappedView};
use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::{RngExt, SeedableRng};
use std::hint::black_box;

const RECORD_SIZE: usize = 28;

fn records(count: usize) -> Vec<u8> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(0x0b5e_55ed);
    let mut bytes = vec![0u8; count * RECORD_SIZE];
    rng.fill(&mut bytes[..]);
    bytes
}

fn key(record: &[u8]) -> i32 {
    i32::from_le_bytes([record[0], record[1], record[2], record[3]])
}

fn bench_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("flat_sort");

    for count in [1_000usize, 100_000] {
        let input = records(count);
        let length = input.len() as u64;

        group.bench_function(BenchmarkId::new("window", count), |b| {
            b.iter_batched(
                || SmallMappedView::from_vec(input.clone()),
                |mut view| {
                    bigio::sort(&mut view, RECORD_SIZE, 0, length, |x, y| key(x).cmp(&key(y)))
                        .expect("sort failed");
                    black_box(view)
                },
                BatchSize::LargeInput,
            );
        });

        group.bench_function(BenchmarkId::new("offset", count), |b| {
            b.iter_batched(
                || SmallMappedView::from_vec(input.clone()).with_byte_order(ByteOrder::Little),
                |mut view| {
                    bigio::sort_by_offset(&mut view, RECORD_SIZE, 0, length, |v, x, y| {
                        Ok(v.get_i32(x)?.cmp(&v.get_i32(y)?))
                    })
                    .expect("sort failed");
                    black_box(view)
                },
                BatchSize::LargeInput,
            );
        });

        group.bench_function(BenchmarkId::new("composite_offset", count), |b| {
            let options = MapOptions::default()
                .with_segment_shift(16)
                .with_byte_order(ByteOrder::Little);
            b.iter_batched(
                || CompositeMappedView::from_bytes(&input, &options).expect("composite view"),
                |mut view| {
                    bigio::sort_by_offset(&mut view, RECORD_SIZE, 0, length, |v, x, y| {
                        Ok(v.get_i32(x)?.cmp(&v.get_i32(y)?))
                    })
                    .expect("sort failed");
                    black_box(view)
                },
                BatchSize::LargeInput,
            );
        });

        group.bench_function(BenchmarkId::new("slice", count), |b| {
            b.iter_batched(
                || {
                    input
                        .chunks(RECORD_SIZE)
                        .map(<[u8]>::to_vec)
                        .collect::<Vec<_>>()
                },
                |mut rows| {
                    rows.sort_unstable_by_key(|r| key(r));
                    black_box(rows)
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_sort);
criterion_main!(benches);
