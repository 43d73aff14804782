//! Field override table: columns kept as opaque text.
//!
//! Some columns look numeric but are identifiers (zip codes, FIPS codes).
//! Listing them here keeps them out of type inference so values such as
//! `02134` keep their leading zeros.
//!
//! The table is loaded once and never mutated. A YAML (or JSON) file maps
//! dataset names to column lists:
//!
//! ```yaml
//! zipcodes.csv: [zip_code]
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DatasetError;

static NO_COLUMNS: BTreeSet<String> = BTreeSet::new();

/// Per-dataset sets of columns excluded from type inference.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldOverrides {
    by_dataset: BTreeMap<String, BTreeSet<String>>,
}

impl FieldOverrides {
    /// An empty table: every column is inferred.
    pub fn new() -> Self {
        Self::default()
    }

    /// The curated table shipped with the crate.
    pub fn builtin() -> Self {
        Self::from_entries([
            ("zipcodes.csv", &["zip_code"][..]),
            ("population_engineers_hurricanes.csv", &["id"][..]),
        ])
    }

    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a [&'a str])>,
    {
        let by_dataset = entries
            .into_iter()
            .map(|(name, columns)| {
                (
                    name.to_string(),
                    columns.iter().map(|c| c.to_string()).collect(),
                )
            })
            .collect();
        Self { by_dataset }
    }

    /// Columns of `dataset` that must stay text. Empty when the dataset has
    /// no overrides.
    pub fn columns_for(&self, dataset: &str) -> &BTreeSet<String> {
        self.by_dataset.get(dataset).unwrap_or(&NO_COLUMNS)
    }

    pub fn datasets(&self) -> impl Iterator<Item = &str> {
        self.by_dataset.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.by_dataset.is_empty()
    }
}

/// Parses an override table from YAML (JSON is accepted as well).
pub fn from_yaml_str(yaml: &str) -> Result<FieldOverrides, serde_yaml::Error> {
    serde_yaml::from_str(yaml)
}

/// Reads an override table from a file.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn read_overrides(path: &Path) -> Result<FieldOverrides, DatasetError> {
    let text = fs::read_to_string(path).map_err(DatasetError::Io)?;
    from_yaml_str(&text).map_err(|source| DatasetError::YamlParse {
        path: path.to_path_buf(),
        source,
    })
}
