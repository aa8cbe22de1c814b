//! Orchestrator trait and invocation types.

use std::collections::BTreeMap;
use std::path::PathBuf;

use rdeploy_manifest::ResolvedStack;
use serde::{Deserialize, Serialize};

use crate::error::RunnerResult;

/// Batch size passed to every `up` invocation.
pub const BATCH_SIZE: u32 = 1;

/// A single `rancher up` call for one stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpInvocation {
    /// Target environment (`--env`)
    pub environment: String,
    /// Stack name (`--stack`)
    pub stack: String,
    /// Compose document (`--file`)
    pub compose_file: PathBuf,
    /// Optional Rancher compose document (`--rancher-file`)
    pub rancher_compose_file: Option<PathBuf>,
    /// Upgrade even when the stack definition is unchanged
    pub force_upgrade: bool,
    /// Variables added to the child process environment
    pub env: BTreeMap<String, String>,
}

impl UpInvocation {
    pub fn for_stack(environment: impl Into<String>, stack: &ResolvedStack, force_upgrade: bool) -> Self {
        Self {
            environment: environment.into(),
            stack: stack.name.clone(),
            compose_file: stack.compose_file.clone(),
            rancher_compose_file: stack.rancher_compose_file.clone(),
            force_upgrade,
            env: stack.vars.clone(),
        }
    }

    /// Command line arguments, excluding the binary itself.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "--env".to_string(),
            self.environment.clone(),
            "up".to_string(),
            "--pull".to_string(),
            "--prune".to_string(),
            "--upgrade".to_string(),
            "--confirm-upgrade".to_string(),
            "--batch-size".to_string(),
            BATCH_SIZE.to_string(),
            "--file".to_string(),
            self.compose_file.to_string_lossy().into_owned(),
            "--stack".to_string(),
            self.stack.clone(),
            "-d".to_string(),
        ];

        if let Some(rancher_file) = &self.rancher_compose_file {
            args.push("--rancher-file".to_string());
            args.push(rancher_file.to_string_lossy().into_owned());
        }

        if self.force_upgrade {
            args.push("--force-upgrade".to_string());
        }

        args
    }
}

/// The external orchestration endpoint.
pub trait Orchestrator {
    /// URL of the server the CLI is configured for.
    fn server_url(&self) -> RunnerResult<String>;

    /// Names of the environments visible to the CLI.
    fn environments(&self) -> RunnerResult<Vec<String>>;

    /// Bring a stack up to date. Blocks until the CLI exits.
    fn up(&self, invocation: &UpInvocation) -> RunnerResult<()>;

    /// Printable command line for an invocation.
    fn command_line(&self, invocation: &UpInvocation) -> String {
        format!("rancher {}", invocation.args().join(" "))
    }
}
