//! Package-level metadata taken from the repository's `package.json`.

use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::{License, Source};
use crate::error::DatasetError;
use crate::record::io_json;

/// Package-level fields of the catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PackageMeta {
    pub name: String,
    pub version: String,
    pub homepage: String,
    pub description: String,
    pub licenses: Vec<License>,
    pub sources: Vec<Source>,
    pub created: String,
}

/// Reads `package.json` and maps it onto catalog package metadata.
///
/// `created` is set to the current UTC time.
///
/// # Errors
/// Returns [`DatasetError::PackageMetadata`] when a required key is missing
/// or not a string.
pub fn read_package_metadata(path: &Path) -> Result<PackageMeta, DatasetError> {
    let value = io_json::read_json(path)?;
    package_metadata_from_json(&value).map_err(|message| DatasetError::PackageMetadata {
        path: path.to_path_buf(),
        message,
    })
}

/// Maps a parsed `package.json` onto catalog package metadata.
pub fn package_metadata_from_json(value: &JsonValue) -> Result<PackageMeta, String> {
    let field = |key: &str| -> Result<String, String> {
        value
            .get(key)
            .and_then(JsonValue::as_str)
            .map(str::to_string)
            .ok_or_else(|| format!("missing string field '{}'", key))
    };

    let repository = match value.get("repository") {
        Some(JsonValue::String(url)) => url.clone(),
        Some(repo) => repo
            .get("url")
            .and_then(JsonValue::as_str)
            .map(str::to_string)
            .ok_or_else(|| "missing string field 'repository.url'".to_string())?,
        None => return Err("missing field 'repository'".to_string()),
    };
    let homepage = normalize_repository_url(&repository);
    let license = field("license")?;

    Ok(PackageMeta {
        name: field("name")?,
        version: field("version")?,
        description: field("description")?,
        licenses: vec![License {
            path: format!(
                "https://opensource.org/license/{}",
                license.to_ascii_lowercase()
            ),
            title: license_title(&license).map(str::to_string),
            name: license,
        }],
        sources: vec![Source {
            title: None,
            path: format!("{}/blob/next/SOURCES.md", homepage),
            email: None,
            version: None,
        }],
        homepage,
        created: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    })
}

/// Turns npm repository URLs (`git+https://...git`) into browsable ones.
fn normalize_repository_url(url: &str) -> String {
    let url = url.strip_prefix("git+").unwrap_or(url);
    let url = url.strip_suffix(".git").unwrap_or(url);
    url.trim_end_matches('/').to_string()
}

fn license_title(spdx: &str) -> Option<&'static str> {
    match spdx {
        "BSD-3-Clause" => Some("The 3-Clause BSD License"),
        "MIT" => Some("The MIT License"),
        "Apache-2.0" => Some("Apache License, Version 2.0"),
        _ => None,
    }
}
