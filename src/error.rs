use std::path::PathBuf;
use thiserror::Error;

/// The main error type for vega-datasets operations.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown dataset '{0}'")]
    UnknownDataset(String),

    #[error("No registry given: pass --registry <file> or --data-dir <dir>")]
    NoRegistry,

    #[error("Invalid URL '{input}': {source}")]
    InvalidUrl {
        input: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Fetching {url} returned HTTP status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed to parse JSON from {name}: {source}")]
    JsonParse {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse delimited text from {name}: {source}")]
    CsvParse {
        name: String,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to write JSON to {path}: {source}")]
    JsonWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse YAML from {path}: {source}")]
    YamlParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to write YAML to {path}: {source}")]
    YamlWrite {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to scan {path}: {source}")]
    DirectoryWalk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Invalid package metadata in {path}: {message}")]
    PackageMetadata { path: PathBuf, message: String },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}
