//! Mock orchestrator for testing.
//!
//! Provides a configurable implementation of the Orchestrator trait that
//! records every call instead of spawning the Rancher CLI.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{RunnerError, RunnerResult};
use crate::runner::{Orchestrator, UpInvocation};

/// Captured call information for verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapturedCall {
    ServerUrl,
    Environments,
    Up(UpInvocation),
}

/// Mock orchestrator for testing.
#[derive(Clone)]
pub struct MockOrchestrator {
    /// URL returned by `server_url`.
    server_url: Arc<RwLock<String>>,
    /// Environments returned by `environments`.
    environments: Arc<RwLock<Vec<String>>>,
    /// Stack whose `up` should fail.
    failing_stack: Arc<RwLock<Option<String>>>,
    /// Captured calls for verification.
    captured_calls: Arc<RwLock<Vec<CapturedCall>>>,
}

impl Default for MockOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl MockOrchestrator {
    /// Create a mock configured for `http://rancher.local` with a `Default` environment.
    pub fn new() -> Self {
        Self {
            server_url: Arc::new(RwLock::new("http://rancher.local/v2-beta/schemas".to_string())),
            environments: Arc::new(RwLock::new(vec!["Default".to_string()])),
            failing_stack: Arc::new(RwLock::new(None)),
            captured_calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Set the configured server URL.
    pub fn set_server_url(self, url: impl Into<String>) -> Self {
        *self.server_url.write() = url.into();
        self
    }

    /// Set the available environments.
    pub fn set_environments(self, environments: &[&str]) -> Self {
        *self.environments.write() = environments.iter().map(|e| e.to_string()).collect();
        self
    }

    /// Make `up` fail for the named stack.
    pub fn fail_stack(self, stack: impl Into<String>) -> Self {
        *self.failing_stack.write() = Some(stack.into());
        self
    }

    /// Get all captured calls.
    pub fn get_calls(&self) -> Vec<CapturedCall> {
        self.captured_calls.read().clone()
    }

    /// Get captured `up` invocations, in call order.
    pub fn up_calls(&self) -> Vec<UpInvocation> {
        self.captured_calls
            .read()
            .iter()
            .filter_map(|call| match call {
                CapturedCall::Up(invocation) => Some(invocation.clone()),
                _ => None,
            })
            .collect()
    }

    /// Clear all captured calls.
    pub fn clear_calls(&self) {
        self.captured_calls.write().clear();
    }

    fn capture(&self, call: CapturedCall) {
        self.captured_calls.write().push(call);
    }
}

impl Orchestrator for MockOrchestrator {
    fn server_url(&self) -> RunnerResult<String> {
        self.capture(CapturedCall::ServerUrl);
        Ok(self.server_url.read().clone())
    }

    fn environments(&self) -> RunnerResult<Vec<String>> {
        self.capture(CapturedCall::Environments);
        Ok(self.environments.read().clone())
    }

    fn up(&self, invocation: &UpInvocation) -> RunnerResult<()> {
        self.capture(CapturedCall::Up(invocation.clone()));

        if self.failing_stack.read().as_deref() == Some(invocation.stack.as_str()) {
            return Err(RunnerError::StackFailed {
                stack: invocation.stack.clone(),
                reason: "rancher exited with exit status: 1".to_string(),
            });
        }
        Ok(())
    }
}
