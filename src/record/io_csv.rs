//! Delimited-text reader producing typed records.
//!
//! The first row is the header. Every later row becomes one [`Record`] whose
//! fields are typed with [`infer_value`], except for columns named in the
//! caller's raw-column set, which are kept verbatim as strings (identifiers
//! such as zip or FIPS codes would otherwise lose their leading zeros).
//!
//! Rows with a different field count than the header are a parse error; no
//! partial result is returned. In a one-column file an empty line is a row
//! with a missing value, so it becomes a record holding `Null`.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use csv::StringRecord;

use super::{infer_value, Record, Value};
use crate::error::DatasetError;

/// Field separator for `.csv` datasets.
pub const COMMA: u8 = b',';
/// Field separator for `.tsv` datasets.
pub const TAB: u8 = b'\t';

/// Parses delimited text with the given separator.
///
/// # Arguments
/// * `text` - The full payload, header row first
/// * `delimiter` - Field separator byte
/// * `raw_columns` - Columns excluded from type inference
///
/// # Errors
/// Returns the underlying `csv` error for malformed quoting or ragged rows.
pub fn parse_delimited(
    text: &str,
    delimiter: u8,
    raw_columns: &BTreeSet<String>,
) -> Result<Vec<Record>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let keep_raw: Vec<bool> = headers
        .iter()
        .map(|column| raw_columns.contains(column))
        .collect();

    // The csv reader skips empty lines, but in a one-column file an empty
    // line is a row whose only field is missing.
    let single_column = headers.len() == 1;
    let empty_row = StringRecord::from(vec![""]);
    let bytes = text.as_bytes();

    let mut records = Vec::new();
    let mut row = StringRecord::new();
    loop {
        let start = reader.position().byte() as usize;
        let more = reader.read_record(&mut row)?;

        if single_column {
            let mut empty = empty_lines_at(bytes, start);
            if !more {
                // The last line terminator closes the final row.
                empty = empty.saturating_sub(1);
            }
            for _ in 0..empty {
                records.push(typed_record(&headers, &empty_row, &keep_raw));
            }
        }

        if !more {
            break;
        }
        records.push(typed_record(&headers, &row, &keep_raw));
    }

    Ok(records)
}

fn typed_record(headers: &StringRecord, row: &StringRecord, keep_raw: &[bool]) -> Record {
    let mut record = Record::with_capacity(headers.len());
    for ((column, field), raw) in headers.iter().zip(row.iter()).zip(keep_raw) {
        let value = if *raw {
            Value::String(field.to_string())
        } else {
            infer_value(field)
        };
        record.push(column, value);
    }
    record
}

/// Counts the empty lines starting at byte `start`. A `\n` that completes
/// the previous row's `\r\n` is not a line of its own.
fn empty_lines_at(bytes: &[u8], start: usize) -> usize {
    let mut i = start;
    if i > 0 && bytes.get(i - 1) == Some(&b'\r') && bytes.get(i) == Some(&b'\n') {
        i += 1;
    }

    let mut count = 0;
    while let Some(&byte) = bytes.get(i) {
        match byte {
            b'\r' if bytes.get(i + 1) == Some(&b'\n') => i += 1,
            b'\r' | b'\n' => {}
            _ => break,
        }
        count += 1;
        i += 1;
    }
    count
}

/// Parses comma-separated text.
///
/// # Example
/// ```
/// use std::collections::BTreeSet;
/// use vega_datasets::record::io_csv::from_csv_str;
/// use vega_datasets::record::Value;
///
/// let raw: BTreeSet<String> = ["zip_code".to_string()].into();
/// let records = from_csv_str("zip_code,count\n02134,150\n", &raw)?;
///
/// assert_eq!(records[0].get("zip_code"), Some(&Value::String("02134".into())));
/// assert_eq!(records[0].get("count"), Some(&Value::Number(150.0)));
/// # Ok::<(), csv::Error>(())
/// ```
pub fn from_csv_str(
    text: &str,
    raw_columns: &BTreeSet<String>,
) -> Result<Vec<Record>, csv::Error> {
    parse_delimited(text, COMMA, raw_columns)
}

/// Parses comma-separated bytes, replacing invalid UTF-8.
///
/// Useful for fuzzing and for payloads fetched as raw bytes.
pub fn from_csv_slice(
    bytes: &[u8],
    raw_columns: &BTreeSet<String>,
) -> Result<Vec<Record>, csv::Error> {
    from_csv_str(&String::from_utf8_lossy(bytes), raw_columns)
}

/// Reads a delimited-text file from disk.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn read_delimited(
    path: &Path,
    delimiter: u8,
    raw_columns: &BTreeSet<String>,
) -> Result<Vec<Record>, DatasetError> {
    let bytes = fs::read(path).map_err(DatasetError::Io)?;
    parse_delimited(&String::from_utf8_lossy(&bytes), delimiter, raw_columns).map_err(|source| {
        DatasetError::CsvParse {
            name: path.display().to_string(),
            source,
        }
    })
}

/// Fuzz-only entrypoint for tab-separated parsing with no raw columns.
#[cfg(feature = "fuzzing")]
pub fn fuzz_parse_tsv(bytes: &[u8]) -> Result<usize, csv::Error> {
    let text = String::from_utf8_lossy(bytes);
    parse_delimited(&text, TAB, &BTreeSet::new()).map(|records| records.len())
}
