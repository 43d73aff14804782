//! Fuzz target for per-token type inference.
//!
//! Every UTF-8 token must produce a value without panicking, and the string
//! fallback must hand back the token unchanged.

#![no_main]

use libfuzzer_sys::fuzz_target;
use vega_datasets::record::{infer_value, Value};

fuzz_target!(|data: &[u8]| {
    let Ok(token) = std::str::from_utf8(data) else {
        return;
    };

    if let Value::String(text) = infer_value(token) {
        assert_eq!(text, token);
    }
});
