//! Compose source resolution.
//!
//! A stack's `compose` location is either a directory relative to the
//! manifest file or a remote base URL. Remote documents are downloaded into
//! temporary files owned by a [`TempFiles`] arena that lives for the whole
//! run.

use std::io::Write;
use std::path::{Component, Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{ManifestError, ManifestResult};

/// Fetches remote documents.
pub trait RemoteFetcher {
    /// GET `url`. Returns `Ok(None)` for a response outside the 2xx range.
    fn fetch(&self, url: &str) -> ManifestResult<Option<String>>;
}

/// Blocking HTTP fetcher.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl RemoteFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> ManifestResult<Option<String>> {
        debug!("GET {}", url);
        let fetch_error = |e: reqwest::Error| ManifestError::Fetch {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = self.client.get(url).send().map_err(fetch_error)?;
        if !response.status().is_success() {
            debug!("GET {} returned HTTP {}", url, response.status());
            return Ok(None);
        }

        response.text().map(Some).map_err(fetch_error)
    }
}

/// Temporary files created during a run.
///
/// Every file is removed when the arena is closed or dropped, whichever
/// comes first.
#[derive(Debug, Default)]
pub struct TempFiles {
    files: Vec<NamedTempFile>,
}

impl TempFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `contents` to a new temporary file whose name ends in `suffix`.
    pub fn persist(&mut self, suffix: &str, location: &str, contents: &str) -> ManifestResult<PathBuf> {
        let temp_error = |source: std::io::Error| ManifestError::TempFile {
            location: location.to_string(),
            source,
        };

        let mut file = tempfile::Builder::new()
            .prefix("rancher-deploy-")
            .suffix(suffix)
            .tempfile()
            .map_err(temp_error)?;
        file.write_all(contents.as_bytes()).map_err(temp_error)?;
        file.flush().map_err(temp_error)?;

        let path = file.path().to_path_buf();
        debug!("Stored {} as {:?}", location, path);
        self.files.push(file);
        Ok(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Paths of all files currently held.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path().to_path_buf()).collect()
    }

    /// Delete every file now, logging any that could not be removed.
    pub fn close(self) {
        for file in self.files {
            let path = file.path().to_path_buf();
            if let Err(e) = file.close() {
                warn!("Failed to remove temporary file {:?}: {}", path, e);
            }
        }
    }
}

/// Outcome of resolving a named file against a compose location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    /// Local path of the document, if it was found
    pub path: Option<PathBuf>,
    /// Human-readable location that was tried (local path or full URL)
    pub location: String,
}

/// Resolves compose locations to local files.
pub struct SourceResolver<'a> {
    fetcher: &'a dyn RemoteFetcher,
}

impl<'a> SourceResolver<'a> {
    pub fn new(fetcher: &'a dyn RemoteFetcher) -> Self {
        Self { fetcher }
    }

    /// Locate `filename` under `location`.
    ///
    /// Local locations are relative to the directory containing `base_file`.
    pub fn resolve(
        &self,
        base_file: &Path,
        location: &str,
        filename: &str,
        temp_files: &mut TempFiles,
    ) -> ManifestResult<ResolvedSource> {
        if is_remote(location) {
            let mut url = location.to_string();
            if !url.ends_with('/') {
                url.push('/');
            }
            url.push_str(filename);

            return match self.fetcher.fetch(&url)? {
                Some(body) => {
                    let path = temp_files.persist(filename, &url, &body)?;
                    Ok(ResolvedSource {
                        path: Some(path),
                        location: url,
                    })
                }
                None => Ok(ResolvedSource {
                    path: None,
                    location: url,
                }),
            };
        }

        let base_dir = base_file.parent().unwrap_or_else(|| Path::new(""));
        let file = normalize_path(&base_dir.join(location).join(filename));
        let location = file.display().to_string();

        Ok(ResolvedSource {
            path: file.exists().then_some(file),
            location,
        })
    }
}

fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Lexically normalize a path: drop `.` components and fold `..` into the
/// preceding component. The filesystem is not consulted.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut parts: Vec<Component> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last().copied() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        return PathBuf::from(".");
    }
    parts.iter().collect()
}
