//! JSON payload reader.
//!
//! JSON already carries explicit types, so payloads are decoded as-is into a
//! [`serde_json::Value`] with no inference applied.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde_json::Value as JsonValue;

use crate::error::DatasetError;

/// Decodes a JSON payload from bytes.
pub fn from_json_slice(bytes: &[u8]) -> Result<JsonValue, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// Decodes a JSON payload from a string.
///
/// Useful for testing without file I/O.
pub fn from_json_str(json: &str) -> Result<JsonValue, serde_json::Error> {
    serde_json::from_str(json)
}

/// Reads a JSON file from disk.
///
/// # Errors
/// Returns an error if the file cannot be opened or does not hold valid JSON.
pub fn read_json(path: &Path) -> Result<JsonValue, DatasetError> {
    let file = File::open(path).map_err(DatasetError::Io)?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|source| DatasetError::JsonParse {
        name: path.display().to_string(),
        source,
    })
}
