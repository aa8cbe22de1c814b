//! Rancher CLI wrapper.
//!
//! Runs the `rancher` binary as a child process. Queries capture stdout;
//! `up` inherits stdio so the operator sees the CLI's own progress output.

use std::env;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::Deserialize;
use tracing::debug;

use crate::error::{RunnerError, RunnerResult};
use crate::runner::{Orchestrator, UpInvocation};

/// Output of `rancher config -p`.
#[derive(Debug, Deserialize)]
struct CliConfig {
    #[serde(default)]
    url: Option<String>,
}

/// Process-backed [`Orchestrator`] driving the `rancher` binary.
#[derive(Debug, Clone)]
pub struct RancherCli {
    binary: PathBuf,
}

impl RancherCli {
    /// Use an explicit binary path.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// File name of the CLI on this platform.
    pub fn binary_name() -> String {
        format!("rancher{}", env::consts::EXE_SUFFIX)
    }

    /// Find the CLI next to the running executable or on `PATH`.
    pub fn locate() -> RunnerResult<Self> {
        let own_dir = env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));
        let path_dirs = env::var_os("PATH")
            .map(|paths| env::split_paths(&paths).collect::<Vec<_>>())
            .unwrap_or_default();

        Self::locate_in(own_dir.into_iter().chain(path_dirs))
            .map(Self::new)
            .ok_or_else(|| {
                RunnerError::CliNotFound(format!(
                    "{} is neither next to this executable nor on PATH",
                    Self::binary_name()
                ))
            })
    }

    /// First directory in `dirs` that contains the CLI binary.
    pub fn locate_in(dirs: impl IntoIterator<Item = PathBuf>) -> Option<PathBuf> {
        let name = Self::binary_name();
        dirs.into_iter()
            .map(|dir| dir.join(&name))
            .find(|candidate| candidate.is_file())
    }

    /// Path of the binary this wrapper runs.
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Format command for logging.
    fn format_command(&self, args: &[String]) -> String {
        let mut cmd = self.binary.display().to_string();
        for arg in args {
            if arg.contains(' ') || arg.contains('{') {
                cmd.push_str(&format!(" '{}'", arg));
            } else {
                cmd.push_str(&format!(" {}", arg));
            }
        }
        cmd
    }

    /// Run a query command and return its stdout.
    fn run_query(&self, args: &[&str]) -> RunnerResult<String> {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        debug!("Executing: {}", self.format_command(&args));

        let output = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                RunnerError::ExecutionFailed(format!(
                    "Failed to spawn {}: {}",
                    self.binary.display(),
                    e
                ))
            })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            Err(RunnerError::ExecutionFailed(format!(
                "{} exited with {}: {}",
                self.format_command(&args),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )))
        }
    }
}

impl Orchestrator for RancherCli {
    fn server_url(&self) -> RunnerResult<String> {
        let output = self.run_query(&["config", "-p"])?;
        let config: CliConfig = serde_json::from_str(&output)?;
        Ok(config.url.unwrap_or_default())
    }

    fn environments(&self) -> RunnerResult<Vec<String>> {
        let output = self.run_query(&["env", "ls", "--format", "{{.Environment.Name}}"])?;
        Ok(parse_environment_list(&output))
    }

    fn up(&self, invocation: &UpInvocation) -> RunnerResult<()> {
        let args = invocation.args();
        debug!("Executing: {}", self.format_command(&args));

        let status = Command::new(&self.binary)
            .args(&args)
            .envs(&invocation.env)
            .status()
            .map_err(|e| RunnerError::StackFailed {
                stack: invocation.stack.clone(),
                reason: format!("failed to spawn {}: {}", self.binary.display(), e),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(RunnerError::StackFailed {
                stack: invocation.stack.clone(),
                reason: format!("rancher exited with {}", status),
            })
        }
    }

    fn command_line(&self, invocation: &UpInvocation) -> String {
        self.format_command(&invocation.args())
    }
}

/// Split `env ls` output into environment names.
fn parse_environment_list(output: &str) -> Vec<String> {
    output.split_whitespace().map(str::to_string).collect()
}
