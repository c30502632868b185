//! Codex executor against stand-in agent programs
//!
//! Each stand-in is a small shell script that mimics `codex exec`.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use codex_duel::core::{BackendSettings, OutputCapture};
use codex_duel::executor::{AgentExecutor, AgentRequest};
use codex_duel::{CodexExecutor, ExecutorError};

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn backend(program: &Path, capture: OutputCapture) -> BackendSettings {
    BackendSettings {
        program: program.display().to_string(),
        oss: false,
        local_provider: None,
        capture,
        timeout_secs: None,
    }
}

async fn invoke(backend: &BackendSettings, dir: &Path, prompt: &str) -> Result<String, ExecutorError> {
    CodexExecutor::new()
        .invoke(AgentRequest {
            prompt,
            model: None,
            backend,
            working_dir: dir,
        })
        .await
}

#[tokio::test]
async fn executor_contract() {
    let dir = tempfile::tempdir().unwrap();

    // Echoes stdin back, padded with whitespace that should be trimmed
    let echo = write_script(dir.path(), "echo-agent", "printf '  '; cat; printf '\\n\\n'");
    let reply = invoke(&backend(&echo, OutputCapture::Stdout), dir.path(), "hello agent")
        .await
        .unwrap();
    assert_eq!(reply, "hello agent");

    // Writes its last message to the file after -o
    let file_agent = write_script(
        dir.path(),
        "file-agent",
        "cat > /dev/null\nwhile [ \"$#\" -gt 0 ]; do\n  if [ \"$1\" = \"-o\" ]; then printf 'from file' > \"$2\"; fi\n  shift\ndone\necho noise",
    );
    let reply = invoke(
        &backend(&file_agent, OutputCapture::LastMessageFile),
        dir.path(),
        "prompt",
    )
    .await
    .unwrap();
    assert_eq!(reply, "from file");

    // Non-zero exit carries stderr
    let failing = write_script(dir.path(), "failing-agent", "cat > /dev/null\necho 'model missing' >&2\nexit 3");
    let err = invoke(&backend(&failing, OutputCapture::Stdout), dir.path(), "prompt")
        .await
        .unwrap_err();
    match err {
        ExecutorError::NonZeroExit { code, stderr } => {
            assert_eq!(code, Some(3));
            assert_eq!(stderr, "model missing");
        }
        other => panic!("unexpected error: {}", other),
    }

    // Timeout kills the child
    let slow = write_script(dir.path(), "slow-agent", "cat > /dev/null\nsleep 5");
    let mut slow_backend = backend(&slow, OutputCapture::Stdout);
    slow_backend.timeout_secs = Some(1);
    let err = invoke(&slow_backend, dir.path(), "prompt").await.unwrap_err();
    assert!(matches!(err, ExecutorError::Timeout { secs: 1 }));
}

#[tokio::test]
async fn early_exit_reports_status_not_stdin() {
    let dir = tempfile::tempdir().unwrap();

    // Dies before reading a prompt far larger than the pipe buffer
    let quitter = write_script(dir.path(), "quitter-agent", "echo 'bad config' >&2\nexit 3");
    let prompt = "x".repeat(1 << 20);
    let err = invoke(&backend(&quitter, OutputCapture::Stdout), dir.path(), &prompt)
        .await
        .unwrap_err();
    match err {
        ExecutorError::NonZeroExit { code, stderr } => {
            assert_eq!(code, Some(3));
            assert_eq!(stderr, "bad config");
        }
        other => panic!("unexpected error: {}", other),
    }

    // Same for an unreachable backend
    let offline = write_script(
        dir.path(),
        "offline-agent",
        "echo 'error sending request: connection refused' >&2\nexit 1",
    );
    let err = invoke(&backend(&offline, OutputCapture::Stdout), dir.path(), &prompt)
        .await
        .unwrap_err();
    assert!(matches!(err, ExecutorError::BackendUnreachable { .. }));
}

#[tokio::test]
async fn version_check_is_bounded() {
    let dir = tempfile::tempdir().unwrap();

    let ok = write_script(dir.path(), "version-agent", "echo 'codex 0.1'");
    assert!(CodexExecutor::is_available(&ok.display().to_string()).await);

    let hung = write_script(dir.path(), "hung-agent", "sleep 30");
    let started = Instant::now();
    let available =
        CodexExecutor::is_available_within(&hung.display().to_string(), Duration::from_secs(1)).await;
    assert!(!available);
    assert!(started.elapsed() < Duration::from_secs(10));
}
