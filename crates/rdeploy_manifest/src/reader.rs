//! Manifest file reading.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{ManifestError, ManifestResult};
use crate::model::{ManifestSpec, ResolvedManifest};
use crate::parser::StackParser;
use crate::source::{RemoteFetcher, SourceResolver, TempFiles};

/// Reader for deployment manifests.
pub struct ManifestReader<'a> {
    fetcher: &'a dyn RemoteFetcher,
}

impl<'a> ManifestReader<'a> {
    pub fn new(fetcher: &'a dyn RemoteFetcher) -> Self {
        Self { fetcher }
    }

    /// Read and shape-check the manifest without resolving any stack.
    pub fn load(path: impl AsRef<Path>) -> ManifestResult<ManifestSpec> {
        let path = path.as_ref();
        debug!("Reading {:?}", path);

        let content = fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let spec: ManifestSpec = serde_yaml::from_str(&content)
            .map_err(|e| ManifestError::invalid(path.display(), e))?;

        let mut seen = HashSet::new();
        for stack in &spec.stacks {
            if !seen.insert(stack.name.as_str()) {
                return Err(ManifestError::DuplicateStack {
                    source_label: path.display().to_string(),
                    name: stack.name.clone(),
                });
            }
        }

        Ok(spec)
    }

    /// Read the manifest and resolve every stack it declares.
    ///
    /// Remote compose documents are stored in `temp_files`.
    pub fn read(
        &self,
        path: impl AsRef<Path>,
        temp_files: &mut TempFiles,
    ) -> ManifestResult<ResolvedManifest> {
        let path = path.as_ref();
        let spec = Self::load(path)?;

        let parser = StackParser::new(SourceResolver::new(self.fetcher));
        let stacks = parser.parse(path, &spec.stacks, temp_files)?;

        Ok(ResolvedManifest {
            source: path.to_path_buf(),
            rancher_url: spec.rancher_url,
            environment: spec.environment,
            stacks,
        })
    }
}
