//! Core module - shared infrastructure for codex-duel
//!
//! Foundational types, configuration, and error handling used by the
//! relay engine and the executors.

pub mod config;
pub mod error;
pub mod types;

pub use config::{
    BackendSettings, Config, LocalProvider, ModelConfig, OutputCapture, RelayConfig,
    RelaySettings,
};
pub use error::{DuelError, ExecutorError, Result};
pub use types::*;
