//! Manifest and compose document definitions.
//!
//! The manifest is deserialized straight into typed structures, so a missing
//! key or a value of the wrong type surfaces as a deserialization error that
//! carries the offending key path.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};

/// Top-level deployment manifest as written on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ManifestSpec {
    /// Rancher server the CLI is expected to be configured for
    pub rancher_url: String,
    /// Target environment name
    pub environment: String,
    /// Stacks to deploy, in order
    pub stacks: Vec<StackSpec>,
}

/// A stack as declared in the manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackSpec {
    /// Stack name, used for logging and as the CLI `--stack` target
    pub name: String,
    /// Local directory relative to the manifest, or a remote base URL
    pub compose: String,
    /// Template variables passed to the CLI environment
    #[serde(default, deserialize_with = "null_as_default")]
    pub vars: BTreeMap<String, String>,
}

impl StackSpec {
    pub fn new(name: impl Into<String>, compose: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            compose: compose.into(),
            vars: BTreeMap::new(),
        }
    }

    pub fn var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

/// The subset of a compose document the deployment needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ComposeDocument {
    pub services: BTreeMap<String, serde_yaml::Value>,
}

impl ComposeDocument {
    /// Names of the services declared by the document.
    pub fn service_names(&self) -> BTreeSet<String> {
        self.services.keys().cloned().collect()
    }
}

/// A stack whose compose sources are resolved to local files and whose
/// variables have been checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStack {
    pub name: String,
    pub vars: BTreeMap<String, String>,
    pub compose_file: PathBuf,
    pub rancher_compose_file: Option<PathBuf>,
    pub services: BTreeSet<String>,
}

/// A fully validated manifest, ready for deployment.
#[derive(Debug, Clone)]
pub struct ResolvedManifest {
    /// Path of the manifest file this was read from
    pub source: PathBuf,
    pub rancher_url: String,
    pub environment: String,
    pub stacks: Vec<ResolvedStack>,
}

impl ResolvedManifest {
    /// Get a stack by name.
    pub fn stack(&self, name: &str) -> Option<&ResolvedStack> {
        self.stacks.iter().find(|s| s.name == name)
    }
}

/// Treat an explicit YAML `null` the same as an absent key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
