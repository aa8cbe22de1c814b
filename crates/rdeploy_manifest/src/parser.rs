//! Per-stack resolution and validation.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{ManifestError, ManifestResult, MissingVariables};
use crate::model::{ComposeDocument, ResolvedStack, StackSpec};
use crate::scanner::{scan_variables, strip_template_blocks};
use crate::source::{SourceResolver, TempFiles};

/// Required compose document in every stack location.
pub const COMPOSE_FILE: &str = "docker-compose.yml";

/// Optional Rancher-specific compose document.
pub const RANCHER_COMPOSE_FILE: &str = "rancher-compose.yml";

/// Resolves declared stacks into deployable ones.
pub struct StackParser<'a> {
    resolver: SourceResolver<'a>,
}

impl<'a> StackParser<'a> {
    pub fn new(resolver: SourceResolver<'a>) -> Self {
        Self { resolver }
    }

    /// Resolve every stack in order.
    ///
    /// A compose file that cannot be found aborts immediately. Missing
    /// variables are collected across all stacks and reported together once
    /// every stack has been checked.
    pub fn parse(
        &self,
        manifest_file: &Path,
        stacks: &[StackSpec],
        temp_files: &mut TempFiles,
    ) -> ManifestResult<Vec<ResolvedStack>> {
        let mut resolved = Vec::with_capacity(stacks.len());
        let mut missing = MissingVariables::new();

        for spec in stacks {
            let (stack, required) = self.parse_stack(manifest_file, spec, temp_files)?;

            let absent: BTreeSet<String> = required
                .into_iter()
                .filter(|var| !spec.vars.contains_key(var))
                .collect();
            for var in &absent {
                warn!("Stack {}: missing variable {}", spec.name, var);
            }
            missing.record(&spec.name, absent);

            resolved.push(stack);
        }

        if !missing.is_empty() {
            return Err(ManifestError::MissingVariables(missing));
        }

        Ok(resolved)
    }

    /// Resolve a single stack, returning it with the variables its compose
    /// document requires.
    fn parse_stack(
        &self,
        manifest_file: &Path,
        spec: &StackSpec,
        temp_files: &mut TempFiles,
    ) -> ManifestResult<(ResolvedStack, BTreeSet<String>)> {
        debug!("Adding stack config \"{}\"", spec.name);

        let compose = self
            .resolver
            .resolve(manifest_file, &spec.compose, COMPOSE_FILE, temp_files)?;
        let Some(compose_file) = compose.path else {
            return Err(ManifestError::ComposeNotFound {
                stack: spec.name.clone(),
                location: compose.location,
            });
        };
        debug!("  using {}", compose.location);

        let raw = fs::read_to_string(&compose_file).map_err(|source| ManifestError::Io {
            path: compose_file.clone(),
            source,
        })?;
        let required = scan_variables(&raw);

        let document: ComposeDocument = serde_yaml::from_str(&strip_template_blocks(&raw))
            .map_err(|e| ManifestError::invalid(&compose.location, e))?;
        let services = document.service_names();
        debug!("  services: {:?}", services);

        let rancher_compose =
            self.resolver
                .resolve(manifest_file, &spec.compose, RANCHER_COMPOSE_FILE, temp_files)?;
        match &rancher_compose.path {
            Some(_) => debug!("  using {}", rancher_compose.location),
            None => debug!("  no {} at {}", RANCHER_COMPOSE_FILE, rancher_compose.location),
        }

        let stack = ResolvedStack {
            name: spec.name.clone(),
            vars: spec.vars.clone(),
            compose_file,
            rancher_compose_file: rancher_compose.path,
            services,
        };

        Ok((stack, required))
    }
}
