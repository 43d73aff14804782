#![allow(dead_code)]

use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// Any short token, including control characters and non-ASCII text.
pub fn arb_token() -> BoxedStrategy<String> {
    prop_oneof![
        ".{0,24}",
        "[ \t]{0,2}[-+]?[0-9]{1,6}(\\.[0-9]{0,4})?([eE][-+]?[0-9]{1,2})?[ \t]{0,2}",
        "[0-9]{4}(-[0-9]{2}(-[0-9]{2})?)?(T[0-9]{2}:[0-9]{2}(:[0-9]{2})?Z?)?",
    ]
    .boxed()
}

/// Tokens made of letters only, never a literal, number or date.
pub fn arb_word() -> BoxedStrategy<String> {
    "[a-zA-Z]{1,12}"
        .prop_filter("not a literal", |w| {
            !matches!(w.as_str(), "true" | "false" | "NaN" | "Infinity")
        })
        .boxed()
}

/// Finite numbers as their shortest decimal spelling.
pub fn arb_number() -> BoxedStrategy<f64> {
    prop_oneof![
        (-1_000_000i64..1_000_000).prop_map(|n| n as f64),
        (-1.0e6f64..1.0e6),
        proptest::num::f64::NORMAL,
    ]
    .boxed()
}

/// A header plus rows of non-empty cells that never need quoting.
pub fn arb_table(
    max_cols: usize,
    max_rows: usize,
) -> BoxedStrategy<(Vec<String>, Vec<Vec<String>>)> {
    (1..=max_cols)
        .prop_flat_map(move |cols| {
            let header = proptest::collection::btree_set("[a-z]{1,8}", cols)
                .prop_map(|set| set.into_iter().collect::<Vec<_>>());
            let rows = proptest::collection::vec(
                proptest::collection::vec("[a-zA-Z0-9.][a-zA-Z0-9 .]{0,7}", cols),
                0..=max_rows,
            );
            (header, rows)
        })
        .boxed()
}
