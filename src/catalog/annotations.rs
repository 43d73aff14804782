//! Manually curated resource annotations.
//!
//! Annotations are kept in a YAML file keyed by resource path:
//!
//! ```yaml
//! cars.json:
//!   description: Classic car specifications from the 1970s and 1980s.
//!   sources:
//!     - title: StatLib Datasets Archive
//!       path: http://lib.stat.cmu.edu/datasets/
//!   fields:
//!     Origin:
//!       description: Region of manufacture.
//!       categories: [USA, Europe, Japan]
//! ```
//!
//! Merging never fails: entries that do not match a resource or a column
//! are reported back as warnings.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::schema::FieldType;
use super::{License, Resource, Source};
use crate::error::DatasetError;

/// Annotation table keyed by resource path.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Annotations {
    pub resources: BTreeMap<String, ResourceAnnotation>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceAnnotation {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub licenses: Vec<License>,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldAnnotation>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldAnnotation {
    /// Declared type, replacing the inferred one.
    #[serde(default, rename = "type")]
    pub field_type: Option<FieldType>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub categories: Option<Vec<String>>,
}

/// Parses an annotation table from YAML.
pub fn from_yaml_str(yaml: &str) -> Result<Annotations, serde_yaml::Error> {
    if yaml.trim().is_empty() {
        return Ok(Annotations::default());
    }
    serde_yaml::from_str(yaml)
}

/// Reads an annotation table from a file.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn read_annotations(path: &Path) -> Result<Annotations, DatasetError> {
    let text = fs::read_to_string(path).map_err(DatasetError::Io)?;
    from_yaml_str(&text).map_err(|source| DatasetError::YamlParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Applies annotations to the inferred resources, returning a warning for
/// every annotation that matched nothing.
pub(crate) fn apply(annotations: &Annotations, resources: &mut [Resource]) -> Vec<String> {
    let mut warnings = Vec::new();

    for (path, annotation) in &annotations.resources {
        let Some(resource) = resources.iter_mut().find(|r| &r.path == path) else {
            warnings.push(format!("annotation for unknown resource '{}'", path));
            continue;
        };

        if annotation.description.is_some() {
            resource.description = annotation.description.clone();
        }
        if !annotation.sources.is_empty() {
            resource.sources = annotation.sources.clone();
        }
        if !annotation.licenses.is_empty() {
            resource.licenses = annotation.licenses.clone();
        }

        for (column, field_annotation) in &annotation.fields {
            let field = resource
                .schema
                .as_mut()
                .and_then(|schema| schema.field_mut(column));
            let Some(field) = field else {
                warnings.push(format!(
                    "annotation for unknown field '{}' in '{}'",
                    column, path
                ));
                continue;
            };

            if let Some(field_type) = field_annotation.field_type {
                field.field_type = field_type;
            }
            if field_annotation.description.is_some() {
                field.description = field_annotation.description.clone();
            }
            if field_annotation.categories.is_some() {
                field.categories = field_annotation.categories.clone();
            }
        }
    }

    warnings
}
