//! Codex CLI executor - wraps `codex exec`
//!
//! The prompt is written to the child's stdin rather than passed as an
//! argument, and the final message is read back from stdout or from a
//! last-message file.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::core::{BackendSettings, ExecutorError, OutputCapture};
use crate::executor::traits::{AgentExecutor, AgentRequest};

/// Stderr fragments that mean the inference backend was not reachable
const UNREACHABLE_MARKERS: &[&str] = &[
    "connection refused",
    "error sending request",
    "failed to connect",
    "could not connect",
];

/// How long the preflight `--version` check may take
const PREFLIGHT_TIMEOUT: Duration = Duration::from_secs(5);

/// Executor that launches one agent process per invocation
#[derive(Debug, Clone, Default)]
pub struct CodexExecutor;

impl CodexExecutor {
    /// Create a new executor
    pub fn new() -> Self {
        Self
    }

    /// Check if the agent program is installed
    pub async fn is_available(program: &str) -> bool {
        Self::is_available_within(program, PREFLIGHT_TIMEOUT).await
    }

    /// Like `is_available`, but gives up (and kills the child) after `limit`
    pub async fn is_available_within(program: &str, limit: Duration) -> bool {
        let status = Command::new(program)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status();

        match tokio::time::timeout(limit, status).await {
            Ok(Ok(status)) => status.success(),
            Ok(Err(_)) => false,
            Err(_) => {
                debug!(program, "version check timed out");
                false
            }
        }
    }

    /// Arguments for one invocation, excluding the program itself
    pub fn build_args(
        backend: &BackendSettings,
        model: Option<&str>,
        last_message_file: Option<&Path>,
    ) -> Vec<String> {
        let mut args: Vec<String> = vec!["exec".into(), "--color".into(), "never".into()];

        if let Some(path) = last_message_file {
            args.push("-o".into());
            args.push(path.display().to_string());
        }

        if let Some(model) = model {
            args.push("-m".into());
            args.push(model.to_string());
        }

        if backend.oss {
            args.push("--oss".into());
            if let Some(provider) = backend.effective_local_provider() {
                args.push("--local-provider".into());
                args.push(provider.as_str().into());
            }
        }

        // Read the prompt from stdin
        args.push("-".into());
        args
    }

    async fn run(
        &self,
        request: &AgentRequest<'_>,
        last_message_file: Option<&Path>,
    ) -> Result<Vec<u8>, ExecutorError> {
        let backend = request.backend;
        let args = Self::build_args(backend, request.model, last_message_file);

        debug!(
            program = %backend.program,
            args = ?args,
            prompt_bytes = request.prompt.len(),
            "launching agent"
        );

        let mut cmd = Command::new(&backend.program);
        cmd.args(&args)
            .current_dir(request.working_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ExecutorError::NotFound {
                    program: backend.program.clone(),
                }
            } else {
                ExecutorError::Spawn(e)
            }
        })?;

        // Feed stdin concurrently so a chatty child cannot fill its stdout pipe
        // while we are still writing.
        let writer = child.stdin.take().map(|mut stdin| {
            let prompt = request.prompt.to_owned();
            tokio::spawn(async move { stdin.write_all(prompt.as_bytes()).await })
        });

        let output = match backend.timeout_secs {
            Some(secs) => tokio::time::timeout(Duration::from_secs(secs), child.wait_with_output())
                .await
                .map_err(|_| ExecutorError::Timeout { secs })?,
            None => child.wait_with_output().await,
        }
        .map_err(ExecutorError::Spawn)?;

        // The exit status wins over a failed stdin write: a child that dies
        // early is reported by its own status and stderr.
        if !output.status.success() {
            return Err(classify_failure(
                output.status.code(),
                &String::from_utf8_lossy(&output.stderr),
            ));
        }

        if let Some(writer) = writer {
            match writer.await {
                Ok(Err(e)) if e.kind() != std::io::ErrorKind::BrokenPipe => {
                    return Err(ExecutorError::Spawn(e));
                }
                Err(e) => return Err(ExecutorError::Other(format!("stdin writer panicked: {}", e))),
                _ => {}
            }
        }

        Ok(output.stdout)
    }
}

#[async_trait]
impl AgentExecutor for CodexExecutor {
    async fn invoke(&self, request: AgentRequest<'_>) -> Result<String, ExecutorError> {
        let raw = match request.backend.capture {
            OutputCapture::Stdout => self.run(&request, None).await?,
            OutputCapture::LastMessageFile => {
                let file = tempfile::Builder::new()
                    .prefix("codex_duel_")
                    .suffix(".txt")
                    .tempfile()
                    .map_err(ExecutorError::Output)?;
                self.run(&request, Some(file.path())).await?;
                tokio::fs::read(file.path())
                    .await
                    .map_err(ExecutorError::Output)?
            }
        };

        Ok(String::from_utf8_lossy(&raw).trim().to_string())
    }

    fn name(&self) -> &str {
        "codex"
    }
}

fn classify_failure(code: Option<i32>, stderr: &str) -> ExecutorError {
    let stderr = stderr.trim().to_string();
    let lowered = stderr.to_lowercase();

    if UNREACHABLE_MARKERS.iter().any(|m| lowered.contains(m)) {
        ExecutorError::BackendUnreachable { stderr }
    } else {
        ExecutorError::NonZeroExit { code, stderr }
    }
}
