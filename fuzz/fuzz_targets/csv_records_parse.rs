//! Fuzz target for delimited-text decoding.
//!
//! This fuzzer feeds arbitrary byte sequences to the CSV record reader,
//! with an `id` column kept raw, checking for panics or hangs.

#![no_main]

use std::collections::BTreeSet;

use libfuzzer_sys::fuzz_target;
use vega_datasets::record::io_csv::from_csv_slice;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let raw: BTreeSet<String> = ["id".to_string()].into_iter().collect();
    let _ = from_csv_slice(data, &raw);
});
