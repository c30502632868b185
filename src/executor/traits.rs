//! Agent executor trait
//!
//! Abstracts how an utterance is obtained from a prompt so the relay can be
//! driven by the Codex CLI or by an in-process script.

use std::path::Path;

use async_trait::async_trait;

use crate::core::{BackendSettings, ExecutorError};

/// Everything needed for a single agent invocation
#[derive(Debug, Clone, Copy)]
pub struct AgentRequest<'a> {
    /// Full prompt text
    pub prompt: &'a str,
    /// Model override; `None` uses the backend default
    pub model: Option<&'a str>,
    /// Backend settings for the run
    pub backend: &'a BackendSettings,
    /// Directory the agent runs in
    pub working_dir: &'a Path,
}

/// Produces one agent utterance per call
#[async_trait]
pub trait AgentExecutor: Send + Sync {
    /// Run the agent to completion and return its utterance
    async fn invoke(&self, request: AgentRequest<'_>) -> Result<String, ExecutorError>;

    /// Get the executor name
    fn name(&self) -> &str;
}
