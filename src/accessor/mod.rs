//! Typed dataset accessor.
//!
//! [`Datasets`] combines the read-only [`Registry`] and [`FieldOverrides`]
//! tables with a [`Fetch`] backend. Looking a name up yields an
//! [`Accessor`] whose URL is available without fetching; calling
//! [`Accessor::load`] performs one retrieval and decodes the payload
//! according to the dataset's [`Format`]:
//!
//! | Extension    | Format                    | Result                      |
//! |--------------|---------------------------|-----------------------------|
//! | `.json`      | [`Format::Json`]          | [`Content::Json`]           |
//! | `.csv`       | [`Format::DelimitedText`] | [`Content::Records`] (typed)|
//! | anything else| [`Format::RawText`]       | [`Content::Text`]           |
//!
//! `Datasets` is `Send + Sync`; concurrent loads share nothing mutable.

pub mod fetch;

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value as JsonValue;
use url::Url;

use crate::error::DatasetError;
use crate::overrides::FieldOverrides;
use crate::record::{io_csv, io_json, Record};
use crate::registry::Registry;

pub use fetch::{Fetch, FileFetcher};

#[cfg(feature = "remote")]
pub use fetch::HttpFetcher;

/// Decoding strategy selected from a dataset name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Json,
    DelimitedText,
    RawText,
}

impl Format {
    /// Selects the format from the name's final extension (case-sensitive).
    ///
    /// ```
    /// use vega_datasets::accessor::Format;
    ///
    /// assert_eq!(Format::from_name("cars.json"), Format::Json);
    /// assert_eq!(Format::from_name("zipcodes.csv"), Format::DelimitedText);
    /// assert_eq!(Format::from_name("unemployment.tsv"), Format::RawText);
    /// ```
    pub fn from_name(name: &str) -> Self {
        let file_name = name.rsplit('/').next().unwrap_or(name);
        match file_name.rsplit_once('.').map(|(_, ext)| ext) {
            Some("json") => Format::Json,
            Some("csv") => Format::DelimitedText,
            _ => Format::RawText,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Json => "json",
            Format::DelimitedText => "csv",
            Format::RawText => "text",
        };
        write!(f, "{}", name)
    }
}

/// A decoded dataset payload.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Content {
    Json(JsonValue),
    Records(Vec<Record>),
    Text(String),
}

impl Content {
    pub fn as_json(&self) -> Option<&JsonValue> {
        match self {
            Content::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_records(&self) -> Option<&[Record]> {
        match self {
            Content::Records(records) => Some(records),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Decodes a fetched payload.
///
/// Payloads are read as UTF-8 text (invalid sequences replaced) for the
/// delimited-text and raw-text formats. `raw_columns` only applies to
/// delimited text.
///
/// # Errors
/// Returns [`DatasetError::JsonParse`] or [`DatasetError::CsvParse`] for
/// malformed payloads; no partial result is produced.
pub fn decode(
    name: &str,
    format: Format,
    bytes: &[u8],
    raw_columns: &BTreeSet<String>,
) -> Result<Content, DatasetError> {
    match format {
        Format::Json => io_json::from_json_slice(bytes)
            .map(Content::Json)
            .map_err(|source| DatasetError::JsonParse {
                name: name.to_string(),
                source,
            }),
        Format::DelimitedText => io_csv::from_csv_slice(bytes, raw_columns)
            .map(Content::Records)
            .map_err(|source| DatasetError::CsvParse {
                name: name.to_string(),
                source,
            }),
        Format::RawText => Ok(Content::Text(String::from_utf8_lossy(bytes).into_owned())),
    }
}

/// The registry, override table and fetch backend, shared read-only.
#[derive(Clone)]
pub struct Datasets {
    registry: Arc<Registry>,
    overrides: Arc<FieldOverrides>,
    fetcher: Arc<dyn Fetch>,
}

impl Datasets {
    pub fn new(
        registry: Arc<Registry>,
        overrides: Arc<FieldOverrides>,
        fetcher: Arc<dyn Fetch>,
    ) -> Self {
        Self {
            registry,
            overrides,
            fetcher,
        }
    }

    /// Builds a collection that retrieves over HTTP(S).
    #[cfg(feature = "remote")]
    pub fn with_http(registry: Arc<Registry>, overrides: Arc<FieldOverrides>) -> Self {
        Self::new(registry, overrides, Arc::new(HttpFetcher::new()))
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn overrides(&self) -> &FieldOverrides {
        &self.overrides
    }

    /// Looks up the accessor for `name`. `None` when the name is not
    /// registered.
    pub fn accessor<'a>(&'a self, name: &'a str) -> Option<Accessor<'a>> {
        let url = self.registry.get(name)?;
        Some(Accessor {
            datasets: self,
            name,
            url,
            format: Format::from_name(name),
        })
    }

    /// Fetches and decodes the dataset registered as `name`.
    ///
    /// # Errors
    /// Returns [`DatasetError::UnknownDataset`] for unregistered names, and
    /// otherwise whatever [`Accessor::load`] returns.
    pub fn load(&self, name: &str) -> Result<Content, DatasetError> {
        self.accessor(name)
            .ok_or_else(|| DatasetError::UnknownDataset(name.to_string()))?
            .load()
    }
}

impl fmt::Debug for Datasets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Datasets")
            .field("registry", &self.registry.len())
            .field("overrides", &self.overrides)
            .finish_non_exhaustive()
    }
}

/// Handle for a single registered dataset.
#[derive(Clone, Copy)]
pub struct Accessor<'a> {
    datasets: &'a Datasets,
    name: &'a str,
    url: &'a Url,
    format: Format,
}

impl<'a> Accessor<'a> {
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Where the dataset is retrieved from. Reading it fetches nothing.
    pub fn url(&self) -> &'a Url {
        self.url
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// Performs one retrieval and decodes the payload.
    ///
    /// # Errors
    /// Retrieval failures ([`DatasetError::Fetch`], [`DatasetError::HttpStatus`])
    /// and decode failures are returned as-is; nothing is retried.
    pub fn load(&self) -> Result<Content, DatasetError> {
        tracing::debug!(dataset = self.name, url = %self.url, format = %self.format, "fetching dataset");
        let bytes = self.datasets.fetcher.fetch(self.url)?;
        tracing::debug!(dataset = self.name, bytes = bytes.len(), "fetched dataset");

        decode(
            self.name,
            self.format,
            &bytes,
            self.datasets.overrides.columns_for(self.name),
        )
    }
}

impl fmt::Debug for Accessor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accessor")
            .field("name", &self.name)
            .field("url", &self.url.as_str())
            .field("format", &self.format)
            .finish()
    }
}
