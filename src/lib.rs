//! codex-duel - a relay between two agent CLI instances
//!
//! Two independently invoked agents, A and B, take turns speaking. Each turn
//! A is prompted with the conversation so far, then B answers A. The shared
//! transcript is rewritten to disk after every utterance.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, and error handling
//! - **Agent**: Transcript store, relay state machine, and the relay engine
//! - **Executor**: How a prompt becomes an utterance (Codex CLI or scripted)
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use codex_duel::{CodexExecutor, Relay, RelayConfig};
//!
//! #[tokio::main]
//! async fn main() -> codex_duel::Result<()> {
//!     let config = RelayConfig::new("Debate tabs versus spaces", 3)?;
//!     let mut relay = Relay::new(config, Arc::new(CodexExecutor::new()));
//!     relay.run().await
//! }
//! ```

pub mod agent;
pub mod core;
pub mod executor;

// Re-export commonly used items
pub use agent::{Progress, Relay, RelayState, Transcript};
pub use core::{Config, DuelError, ExecutorError, RelayConfig, Result};
pub use executor::{AgentExecutor, CodexExecutor, ScriptedExecutor};
