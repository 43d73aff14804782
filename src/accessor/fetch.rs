//! Retrieval backends.
//!
//! A [`Fetch`] turns a URL into the full response body. Each call performs
//! exactly one retrieval; nothing is cached, retried or timed out.

use std::fs;

use url::Url;

use crate::error::DatasetError;

/// Retrieves the full body behind a URL.
pub trait Fetch: Send + Sync {
    fn fetch(&self, url: &Url) -> Result<Vec<u8>, DatasetError>;
}

/// Reads `file://` URLs from the local filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileFetcher;

impl Fetch for FileFetcher {
    fn fetch(&self, url: &Url) -> Result<Vec<u8>, DatasetError> {
        let path = url.to_file_path().map_err(|()| DatasetError::Fetch {
            url: url.to_string(),
            message: "not a local file URL".to_string(),
        })?;
        fs::read(&path).map_err(|source| DatasetError::Fetch {
            url: url.to_string(),
            message: source.to_string(),
        })
    }
}

/// Plain HTTP(S) GET with no headers, auth or query parameters.
///
/// `file://` URLs are delegated to [`FileFetcher`] so a registry built for a
/// local checkout can be loaded offline.
#[cfg(feature = "remote")]
#[derive(Clone)]
pub struct HttpFetcher {
    agent: ureq::Agent,
}

#[cfg(feature = "remote")]
impl HttpFetcher {
    pub fn new() -> Self {
        let config = ureq::Agent::config_builder().build();
        Self {
            agent: config.into(),
        }
    }
}

#[cfg(feature = "remote")]
impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "remote")]
impl Fetch for HttpFetcher {
    fn fetch(&self, url: &Url) -> Result<Vec<u8>, DatasetError> {
        if url.scheme() == "file" {
            return FileFetcher.fetch(url);
        }

        let mut response = self
            .agent
            .get(url.as_str())
            .call()
            .map_err(|source| match source {
                ureq::Error::StatusCode(status) => DatasetError::HttpStatus {
                    url: url.to_string(),
                    status,
                },
                other => DatasetError::Fetch {
                    url: url.to_string(),
                    message: other.to_string(),
                },
            })?;

        response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(|source| DatasetError::Fetch {
                url: url.to_string(),
                message: source.to_string(),
            })
    }
}

/// The fetcher used when the caller does not supply one.
#[cfg(feature = "remote")]
pub fn default_fetcher() -> HttpFetcher {
    HttpFetcher::new()
}

/// The fetcher used when the caller does not supply one.
#[cfg(not(feature = "remote"))]
pub fn default_fetcher() -> FileFetcher {
    FileFetcher
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_fetcher_reads_local_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("note.txt");
        fs::write(&path, "hello").expect("write");

        let url = Url::from_file_path(&path).expect("file url");
        assert_eq!(FileFetcher.fetch(&url).expect("fetch"), b"hello");
    }

    #[test]
    fn file_fetcher_missing_file_is_fetch_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let url = Url::from_file_path(dir.path().join("missing.txt")).expect("file url");

        assert!(matches!(
            FileFetcher.fetch(&url),
            Err(DatasetError::Fetch { .. })
        ));
    }

    #[test]
    fn file_fetcher_rejects_http_urls() {
        let url = Url::parse("https://example.org/a.csv").expect("url");
        assert!(FileFetcher.fetch(&url).is_err());
    }
}
