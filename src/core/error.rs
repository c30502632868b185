//! Error types for the relay
//!
//! `DuelError` is what the engine surfaces to callers. `ExecutorError` covers
//! the ways a single agent invocation can fail and is wrapped with the
//! role/turn that was in progress.

use std::path::PathBuf;

use thiserror::Error;

use crate::core::types::AgentRole;

/// Main error type for relay operations
#[derive(Error, Debug)]
pub enum DuelError {
    /// An utterance was appended out of order
    #[error("Invalid sequence: {role} utterance for turn {turn}: {reason}")]
    InvalidSequence {
        role: AgentRole,
        turn: usize,
        reason: String,
    },

    /// The agent executor failed to produce an utterance
    #[error("{role} failed on turn {turn}: {source}")]
    Executor {
        role: AgentRole,
        turn: usize,
        #[source]
        source: ExecutorError,
    },

    /// Writing the transcript to its destination failed
    #[error("Failed to write transcript to {} after {utterances} utterance(s): {source}", .path.display())]
    Persistence {
        path: PathBuf,
        utterances: usize,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience Result type for relay operations
pub type Result<T> = std::result::Result<T, DuelError>;

impl DuelError {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an ordering violation
    pub fn invalid_sequence(role: AgentRole, turn: usize, reason: impl Into<String>) -> Self {
        Self::InvalidSequence {
            role,
            turn,
            reason: reason.into(),
        }
    }

    /// Attach the role and turn that were in progress to an executor failure
    pub fn executor(role: AgentRole, turn: usize, source: ExecutorError) -> Self {
        Self::Executor { role, turn, source }
    }
}

/// Failure of a single agent invocation
#[derive(Error, Debug)]
pub enum ExecutorError {
    /// The agent program is not on PATH
    #[error("'{program}' not found. Install the Codex CLI or set backend.program")]
    NotFound { program: String },

    /// The process could not be started or driven
    #[error("failed to run agent process: {0}")]
    Spawn(#[source] std::io::Error),

    /// The process exited unsuccessfully
    #[error("agent process exited with {}: {stderr}", exit_label(.code))]
    NonZeroExit { code: Option<i32>, stderr: String },

    /// The inference backend could not be reached
    #[error("inference backend unreachable: {stderr}")]
    BackendUnreachable { stderr: String },

    /// The invocation exceeded the configured timeout
    #[error("agent process timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The utterance could not be read back after a successful exit
    #[error("failed to read agent output: {0}")]
    Output(#[source] std::io::Error),

    /// Scripted or otherwise synthetic failure
    #[error("{0}")]
    Other(String),
}

fn exit_label(code: &Option<i32>) -> String {
    match *code {
        Some(code) => format!("status {}", code),
        None => "a signal".to_string(),
    }
}
