//! Metadata catalog builder.
//!
//! Runs offline over a dataset directory and produces a Data Package shaped
//! catalog: package metadata from `package.json`, one resource per dataset
//! file with an inferred column schema for tabular files, merged with the
//! manually curated [`Annotations`].
//!
//! # Resource classification
//!
//! | Suffix                       | Resource                                  |
//! |------------------------------|-------------------------------------------|
//! | `.csv`, `.tsv`               | table, schema inferred from a row sample  |
//! | `.parquet`                   | table, no schema                          |
//! | `.json`                      | table, TopoJSON/GeoJSON map, or plain JSON|
//! | `.png`                       | file                                      |
//! | `.arrow`                     | skipped                                   |
//! | anything else                | skipped with a warning                    |
//!
//! A `.json` table is an array of flat objects or a single flat object,
//! which counts as one row.
//!
//! The catalog is never read by the accessor; the two only share the
//! dataset files.

pub mod annotations;
pub mod package;
pub mod report;
pub mod schema;

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::DatasetError;
use crate::record::io_csv::{COMMA, TAB};
use crate::record::io_json;
use crate::registry::data_files;

pub use annotations::{read_annotations, Annotations};
pub use package::{read_package_metadata, PackageMeta};
pub use schema::{Field, FieldType, Schema};

/// A citation for where a dataset came from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Source {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// A license citation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct License {
    pub name: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Kind of catalog resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Table,
    Json,
    Map,
    File,
}

/// Delimited-text dialect, recorded when it differs from plain CSV.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialect {
    pub delimiter: String,
}

/// One dataset file in the catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub path: String,
    pub format: String,
    pub mediatype: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    pub bytes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialect: Option<Dialect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<Source>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub licenses: Vec<License>,
}

/// The full catalog document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(flatten)]
    pub package: PackageMeta,
    pub resources: Vec<Resource>,
}

impl Catalog {
    pub fn resource(&self, path: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.path == path)
    }
}

/// Result of a catalog build: the catalog plus everything that was skipped
/// or left unmatched.
#[derive(Clone, Debug)]
pub struct CatalogBuild {
    pub catalog: Catalog,
    pub warnings: Vec<String>,
}

/// Builds the catalog for every file under `data_dir`.
///
/// # Errors
/// Returns an error if the directory cannot be scanned or a tabular/JSON file
/// cannot be parsed. Unsupported files and unmatched annotations are
/// warnings, not errors.
pub fn build_catalog(
    data_dir: &Path,
    package: PackageMeta,
    annotations: &Annotations,
) -> Result<CatalogBuild, DatasetError> {
    tracing::info!(
        "Collecting resources for '{}@{}' ...",
        package.name,
        package.version
    );

    let mut warnings = Vec::new();
    let mut resources = Vec::new();
    let mut taken_names = BTreeSet::new();

    for (name, path) in data_files(data_dir)? {
        let Some(mut resource) = infer_resource(&name, &path, &mut warnings)? else {
            continue;
        };
        resource.name = unique_name(&resource.name, &resource.format, &mut taken_names);
        resources.push(resource);
    }
    tracing::info!("Collected {} resources", resources.len());

    warnings.extend(annotations::apply(annotations, &mut resources));
    for warning in &warnings {
        tracing::warn!("{}", warning);
    }

    Ok(CatalogBuild {
        catalog: Catalog { package, resources },
        warnings,
    })
}

/// Describes a single dataset file, or `None` when the file is skipped.
fn infer_resource(
    name: &str,
    path: &Path,
    warnings: &mut Vec<String>,
) -> Result<Option<Resource>, DatasetError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();

    let (resource_type, format, mediatype, schema, dialect) = match extension {
        "csv" => (
            ResourceType::Table,
            "csv",
            "text/csv",
            Some(schema::read_delimited_schema(path, COMMA)?),
            None,
        ),
        "tsv" => (
            ResourceType::Table,
            "tsv",
            "text/tab-separated-values",
            Some(schema::read_delimited_schema(path, TAB)?),
            Some(Dialect {
                delimiter: "\t".to_string(),
            }),
        ),
        "parquet" => (
            ResourceType::Table,
            "parquet",
            "application/vnd.apache.parquet",
            None,
            None,
        ),
        "json" => {
            let value = io_json::read_json(path)?;
            let (resource_type, format, mediatype, schema) = classify_json(&value);
            (resource_type, format, mediatype, schema, None)
        }
        "png" => (ResourceType::File, "png", "image/png", None, None),
        "arrow" => {
            tracing::debug!(resource = name, "skipping unsupported arrow file");
            return Ok(None);
        }
        other => {
            warnings.push(format!(
                "skipping unexpected extension '{}': {}",
                other, name
            ));
            return Ok(None);
        }
    };

    let bytes = fs::metadata(path).map_err(DatasetError::Io)?.len();
    let encoding = (resource_type != ResourceType::File && format != "parquet")
        .then(|| "utf-8".to_string());

    tracing::debug!(resource = name, format, bytes, "described resource");
    Ok(Some(Resource {
        name: slug(name),
        resource_type,
        path: name.to_string(),
        format: format.to_string(),
        mediatype: mediatype.to_string(),
        encoding,
        bytes,
        description: None,
        dialect,
        schema,
        sources: Vec::new(),
        licenses: Vec::new(),
    }))
}

/// Separates table-shaped JSON from maps and other nested documents.
fn classify_json(
    value: &JsonValue,
) -> (ResourceType, &'static str, &'static str, Option<Schema>) {
    if let Some(schema) = schema::infer_json_schema(value) {
        return (ResourceType::Table, "json", "text/json", Some(schema));
    }
    match value.get("type").and_then(JsonValue::as_str) {
        Some("Topology") => (ResourceType::Map, "topojson", "text/topojson", None),
        Some(_) => (ResourceType::Map, "geojson", "application/geo+json", None),
        None => (ResourceType::Json, "json", "text/json", None),
    }
}

/// Resource name derived from the file name: lowercase stem, with anything
/// outside `[a-z0-9._-]` replaced by `-`.
fn slug(path: &str) -> String {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    let stem = file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(file_name);
    stem.chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

fn unique_name(base: &str, format: &str, taken: &mut BTreeSet<String>) -> String {
    let mut name = base.to_string();
    if taken.contains(&name) {
        name = format!("{}_{}", base, format);
    }
    let mut counter = 2;
    while taken.contains(&name) {
        name = format!("{}_{}_{}", base, format, counter);
        counter += 1;
    }
    taken.insert(name.clone());
    name
}

// ============================================================================
// Output
// ============================================================================

/// Serializes the catalog as pretty-printed JSON.
pub fn to_json_string(catalog: &Catalog) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(catalog)
}

/// Serializes the catalog as YAML.
pub fn to_yaml_string(catalog: &Catalog) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(catalog)
}

/// Writes `<stem>.json` and/or `<stem>.yaml` into `out_dir`.
///
/// `output` is one of `json`, `yaml` or `both`. Returns the written paths.
pub fn write_catalog(
    catalog: &Catalog,
    out_dir: &Path,
    stem: &str,
    output: &str,
) -> Result<Vec<PathBuf>, DatasetError> {
    let (json, yaml) = match output {
        "json" => (true, false),
        "yaml" => (false, true),
        "both" => (true, true),
        other => {
            return Err(DatasetError::UnsupportedFormat(format!(
                "'{}' (supported: json, yaml, both)",
                other
            )));
        }
    };

    let mut written = Vec::new();
    if json {
        let path = out_dir.join(format!("{}.json", stem));
        let text = to_json_string(catalog).map_err(|source| DatasetError::JsonWrite {
            path: path.clone(),
            source,
        })?;
        tracing::info!("Writing {}", path.display());
        fs::write(&path, text + "\n").map_err(DatasetError::Io)?;
        written.push(path);
    }
    if yaml {
        let path = out_dir.join(format!("{}.yaml", stem));
        let text = to_yaml_string(catalog).map_err(|source| DatasetError::YamlWrite {
            path: path.clone(),
            source,
        })?;
        tracing::info!("Writing {}", path.display());
        fs::write(&path, text).map_err(DatasetError::Io)?;
        written.push(path);
    }

    Ok(written)
}
