//! Fuzz target for tab-separated decoding, including one-column files
//! where empty lines become rows.

#![no_main]

use libfuzzer_sys::fuzz_target;
use vega_datasets::record::io_csv::fuzz_parse_tsv;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let _ = fuzz_parse_tsv(data);
});
