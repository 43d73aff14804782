//! Typed records for delimited-text datasets.
//!
//! This module owns the value model ([`Value`], [`Record`]), the per-token
//! type inference that turns raw text into typed values, and the payload
//! readers used by the accessor and the catalog builder.
//!
//! # Example
//!
//! ```
//! use vega_datasets::record::{infer_value, Value};
//!
//! assert_eq!(infer_value("true"), Value::Bool(true));
//! assert_eq!(infer_value("150"), Value::Number(150.0));
//! assert!(infer_value("2020-01-01").as_date().is_some());
//! ```

mod infer;
pub mod io_csv;
pub mod io_json;
mod value;

pub use infer::{coerce_number, infer_value, parse_date};
pub use value::{Record, Value};
