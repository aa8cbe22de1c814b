//! Error types for the runner module.

use thiserror::Error;

/// Result type alias for runner operations.
pub type RunnerResult<T> = Result<T, RunnerError>;

/// Errors that can occur while talking to the Rancher CLI.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Rancher cli not found: {0}")]
    CliNotFound(String),

    #[error("Unable to get rancher URL - the cli is not configured correctly")]
    CliNotConfigured,

    #[error("Environment mismatch: {0}")]
    EnvironmentMismatch(String),

    #[error("Command failed: {0}")]
    ExecutionFailed(String),

    #[error("Deployment of stack {stack} failed: {reason}")]
    StackFailed { stack: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
