//! Executor module - how agent utterances are produced
//!
//! The relay only sees the `AgentExecutor` trait. `CodexExecutor` launches the
//! Codex CLI per invocation; `ScriptedExecutor` replays canned replies.

pub mod codex;
pub mod scripted;
pub mod traits;

pub use codex::CodexExecutor;
pub use scripted::{RecordedCall, ScriptedExecutor};
pub use traits::{AgentExecutor, AgentRequest};
