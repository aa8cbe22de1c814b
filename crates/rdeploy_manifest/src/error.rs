//! Error types for manifest operations.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for manifest operations.
pub type ManifestResult<T> = Result<T, ManifestError>;

/// Errors that can occur while reading and validating a manifest.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid document {source_label}: {message}")]
    InvalidDocument {
        source_label: String,
        message: String,
    },

    #[error("Duplicate stack name in {source_label}: {name}")]
    DuplicateStack { source_label: String, name: String },

    #[error("Compose file for stack {stack} not found: {location}")]
    ComposeNotFound { stack: String, location: String },

    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Failed to create temporary file for {location}: {source}")]
    TempFile {
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    MissingVariables(MissingVariables),
}

impl ManifestError {
    pub(crate) fn invalid(source_label: impl fmt::Display, err: serde_yaml::Error) -> Self {
        Self::InvalidDocument {
            source_label: source_label.to_string(),
            message: err.to_string(),
        }
    }
}

/// Variables referenced by compose documents but absent from their stacks' `vars`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MissingVariables {
    stacks: Vec<(String, BTreeSet<String>)>,
}

impl MissingVariables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the variables missing for one stack. Empty sets are ignored.
    pub fn record(&mut self, stack: impl Into<String>, missing: BTreeSet<String>) {
        if !missing.is_empty() {
            self.stacks.push((stack.into(), missing));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }

    /// Stacks with missing variables, in manifest order.
    pub fn stacks(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.stacks.iter().map(|(name, vars)| (name.as_str(), vars))
    }

    /// Missing variables for a given stack.
    pub fn for_stack(&self, stack: &str) -> Option<&BTreeSet<String>> {
        self.stacks
            .iter()
            .find(|(name, _)| name == stack)
            .map(|(_, vars)| vars)
    }

    /// Total number of missing variables across all stacks.
    pub fn count(&self) -> usize {
        self.stacks.iter().map(|(_, vars)| vars.len()).sum()
    }
}

impl fmt::Display for MissingVariables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Missing variables in {} stack(s):", self.stacks.len())?;
        for (stack, vars) in &self.stacks {
            let names: Vec<&str> = vars.iter().map(String::as_str).collect();
            write!(f, " stack[{}]: {};", stack, names.join(", "))?;
        }
        Ok(())
    }
}
