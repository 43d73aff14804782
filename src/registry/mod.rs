//! Dataset registry: the static name -> URL index.
//!
//! A registry is built once, either from the contents of a dataset directory
//! or from a registry JSON file (`{"<name>": "<url>", ...}`), and is
//! read-only afterwards. Names include the file extension and use `/`
//! separators for files in subdirectories.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use url::Url;
use walkdir::{DirEntry, WalkDir};

use crate::error::DatasetError;

/// Published location of the dataset directory.
pub const DEFAULT_BASE_URL: &str = "https://cdn.jsdelivr.net/npm/vega-datasets/data/";

/// Ordered mapping from dataset name to retrieval URL.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Registry {
    entries: BTreeMap<String, Url>,
}

impl Registry {
    /// Builds a registry from explicit entries. Later duplicates replace
    /// earlier ones.
    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Url)>,
        K: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(name, url)| (name.into(), url))
                .collect(),
        }
    }

    /// Builds a registry with one entry per file under `dir`.
    ///
    /// Hidden files and directories are skipped. Each URL is `base_url`
    /// with the file's relative path appended as path segments.
    ///
    /// # Errors
    /// Returns an error if `base_url` is not a valid base URL or the directory
    /// cannot be scanned.
    pub fn from_dir(dir: &Path, base_url: &str) -> Result<Self, DatasetError> {
        let base = parse_base_url(base_url)?;
        let mut entries = BTreeMap::new();

        for (name, _) in data_files(dir)? {
            let url = dataset_url(&base, &name)?;
            entries.insert(name, url);
        }

        tracing::debug!(dir = %dir.display(), count = entries.len(), "built registry from directory");
        Ok(Self { entries })
    }

    /// Returns the URL registered for `name`.
    pub fn get(&self, name: &str) -> Option<&Url> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Dataset names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Url)> {
        self.entries.iter().map(|(name, url)| (name.as_str(), url))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parses a base URL, making sure it names a directory (trailing `/`).
pub fn parse_base_url(input: &str) -> Result<Url, DatasetError> {
    let mut url = Url::parse(input).map_err(|source| DatasetError::InvalidUrl {
        input: input.to_string(),
        source,
    })?;

    if url.cannot_be_a_base() {
        return Err(DatasetError::InvalidUrl {
            input: input.to_string(),
            source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
        });
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Appends a `/`-separated dataset name to a base URL, percent-encoding
/// each segment.
pub fn dataset_url(base: &Url, name: &str) -> Result<Url, DatasetError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| DatasetError::InvalidUrl {
            input: base.to_string(),
            source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
        })?
        .pop_if_empty()
        .extend(name.split('/'));
    Ok(url)
}

/// Lists the regular files under `dir` as `(relative name, path)` pairs,
/// sorted by name and skipping hidden entries.
pub fn data_files(dir: &Path) -> Result<Vec<(String, PathBuf)>, DatasetError> {
    let mut files = Vec::new();

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_hidden(entry));

    for entry in walker {
        let entry = entry.map_err(|source| DatasetError::DirectoryWalk {
            path: dir.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        files.push((rel_string(dir, entry.path()), entry.path().to_path_buf()));
    }

    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn rel_string(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.to_string_lossy().replace('\\', "/")
}

// ============================================================================
// Registry JSON
// ============================================================================

/// Reads a registry from a JSON file mapping names to URLs.
///
/// # Errors
/// Returns an error if the file cannot be read, is not a JSON object of
/// strings, or holds an invalid URL.
pub fn read_registry_json(path: &Path) -> Result<Registry, DatasetError> {
    let text = fs::read_to_string(path).map_err(DatasetError::Io)?;
    from_json_str(&text).map_err(|err| match err {
        DatasetError::JsonParse { source, .. } => DatasetError::JsonParse {
            name: path.display().to_string(),
            source,
        },
        other => other,
    })
}

/// Parses a registry from a JSON string.
pub fn from_json_str(json: &str) -> Result<Registry, DatasetError> {
    let raw: BTreeMap<String, String> =
        serde_json::from_str(json).map_err(|source| DatasetError::JsonParse {
            name: "<registry>".to_string(),
            source,
        })?;

    let mut entries = BTreeMap::new();
    for (name, url) in raw {
        let parsed = Url::parse(&url).map_err(|source| DatasetError::InvalidUrl {
            input: url.clone(),
            source,
        })?;
        entries.insert(name, parsed);
    }
    Ok(Registry { entries })
}

/// Serializes a registry as a pretty-printed JSON object.
pub fn to_json_string(registry: &Registry) -> Result<String, serde_json::Error> {
    let raw: BTreeMap<&str, &str> = registry
        .entries
        .iter()
        .map(|(name, url)| (name.as_str(), url.as_str()))
        .collect();
    serde_json::to_string_pretty(&raw)
}

/// Writes a registry to a JSON file.
pub fn write_registry_json(path: &Path, registry: &Registry) -> Result<(), DatasetError> {
    let json = to_json_string(registry).map_err(|source| DatasetError::JsonWrite {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json + "\n").map_err(DatasetError::Io)
}
