//! Criterion microbenches for dataset decoding.
//!
//! Run with: `cargo bench`
//!
//! These benchmarks measure the performance of:
//! - per-token type inference (infer_value)
//! - delimited-text decoding into typed records (from_csv_str)
//! - payload dispatch through accessor::decode

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::collections::BTreeSet;
use std::hint::black_box;

use vega_datasets::accessor::{decode, Format};
use vega_datasets::record::infer_value;
use vega_datasets::record::io_csv::from_csv_str;

// A slice of seattle-weather.csv, inlined so the benches need no data checkout
const WEATHER_CSV: &str = "date,precipitation,temp_max,temp_min,wind,weather
2012-01-01,0.0,12.8,5.0,4.7,drizzle
2012-01-02,10.9,10.6,2.8,4.5,rain
2012-01-03,0.8,11.7,7.2,2.3,rain
2012-01-04,20.3,12.2,5.6,4.7,rain
2012-01-05,1.3,8.9,2.8,6.1,rain
2012-01-06,2.5,4.4,2.2,2.2,rain
2012-01-07,0.0,7.2,2.8,2.3,rain
2012-01-08,0.0,10.0,2.8,2.0,sun
2012-01-09,4.3,9.4,5.0,3.4,rain
2012-01-10,1.0,6.1,0.6,3.4,rain
";

const TOKENS: &[&str] = &[
    "42",
    " -1.5e3 ",
    "0x1F",
    "true",
    "",
    "NaN",
    "2012-01-01",
    "2012-01-01T08:30:00Z",
    "02134",
    "drizzle",
];

/// Benchmark inference over a mix of token kinds.
fn bench_infer_value(c: &mut Criterion) {
    let mut group = c.benchmark_group("infer");
    group.throughput(Throughput::Elements(TOKENS.len() as u64));

    group.bench_function("infer_value", |b| {
        b.iter(|| {
            for token in TOKENS {
                black_box(infer_value(black_box(token)));
            }
        })
    });

    group.finish();
}

/// Benchmark CSV decoding, with and without a raw column.
fn bench_csv_decode(c: &mut Criterion) {
    let no_raw = BTreeSet::new();
    let raw: BTreeSet<String> = ["date".to_string()].into_iter().collect();

    let mut group = c.benchmark_group("csv_decode");
    group.throughput(Throughput::Bytes(WEATHER_CSV.len() as u64));

    group.bench_function("from_csv_str", |b| {
        b.iter(|| {
            let records = from_csv_str(black_box(WEATHER_CSV), &no_raw).unwrap();
            black_box(records)
        })
    });

    group.bench_function("from_csv_str_raw_date", |b| {
        b.iter(|| {
            let records = from_csv_str(black_box(WEATHER_CSV), &raw).unwrap();
            black_box(records)
        })
    });

    group.finish();
}

/// Benchmark format dispatch on raw payload bytes.
fn bench_decode(c: &mut Criterion) {
    let bytes = WEATHER_CSV.as_bytes();
    let no_raw = BTreeSet::new();

    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Bytes(bytes.len() as u64));

    group.bench_function("delimited_text", |b| {
        b.iter(|| {
            let content = decode(
                "seattle-weather.csv",
                Format::DelimitedText,
                black_box(bytes),
                &no_raw,
            )
            .unwrap();
            black_box(content)
        })
    });

    group.bench_function("raw_text", |b| {
        b.iter(|| {
            let content =
                decode("seattle-weather.txt", Format::RawText, black_box(bytes), &no_raw).unwrap();
            black_box(content)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_infer_value, bench_csv_decode, bench_decode);
criterion_main!(benches);
