//! Sequential stack deployment.

use rdeploy_manifest::{ResolvedManifest, ResolvedStack};
use tracing::{debug, info};

use crate::error::{RunnerError, RunnerResult};
use crate::runner::{Orchestrator, UpInvocation};

/// Deployment options.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeployOptions {
    /// Upgrade stacks even if their definition is unchanged
    pub force: bool,
    /// Log commands without executing them
    pub dry_run: bool,
}

impl DeployOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn force(mut self, enabled: bool) -> Self {
        self.force = enabled;
        self
    }

    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }
}

/// Drives an [`Orchestrator`] through a resolved manifest.
pub struct Deployer<'a> {
    orchestrator: &'a dyn Orchestrator,
    options: DeployOptions,
}

impl<'a> Deployer<'a> {
    pub fn new(orchestrator: &'a dyn Orchestrator, options: DeployOptions) -> Self {
        Self {
            orchestrator,
            options,
        }
    }

    /// Verify the CLI points at the manifest's server and can see its environment.
    pub fn check_connection(&self, manifest: &ResolvedManifest) -> RunnerResult<()> {
        let url = self.orchestrator.server_url()?;
        if url.is_empty() {
            return Err(RunnerError::CliNotConfigured);
        }
        debug!("Rancher cli is configured for {}", url);

        if !url.starts_with(&manifest.rancher_url) {
            return Err(RunnerError::EnvironmentMismatch(format!(
                "expected a rancher cli config that connects to {} but got: {}",
                manifest.rancher_url, url
            )));
        }

        let environments = self.orchestrator.environments()?;
        if !environments.iter().any(|e| e == &manifest.environment) {
            return Err(RunnerError::EnvironmentMismatch(format!(
                "environment \"{}\" not found with the current cli config at {} - available environments: {}",
                manifest.environment,
                manifest.rancher_url,
                environments.join(", ")
            )));
        }

        info!("Deploying to {} on {}", manifest.environment, manifest.rancher_url);
        Ok(())
    }

    /// Deploy every stack in manifest order, stopping at the first failure.
    ///
    /// Returns the number of stacks deployed.
    pub fn deploy_all(&self, manifest: &ResolvedManifest) -> RunnerResult<usize> {
        for stack in &manifest.stacks {
            self.deploy_stack(&manifest.environment, stack)?;
        }
        Ok(manifest.stacks.len())
    }

    /// Deploy a single stack.
    pub fn deploy_stack(&self, environment: &str, stack: &ResolvedStack) -> RunnerResult<()> {
        if self.options.force {
            info!("Deploying stack {} (force update)", stack.name);
        } else {
            info!("Deploying stack {}", stack.name);
        }

        let invocation = UpInvocation::for_stack(environment, stack, self.options.force);

        if self.options.dry_run {
            info!(
                "[DRY-RUN] Would execute: {}",
                self.orchestrator.command_line(&invocation)
            );
            return Ok(());
        }

        self.orchestrator.up(&invocation)
    }
}
