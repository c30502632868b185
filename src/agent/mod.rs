//! Agent module - the relay between two agents
//!
//! Contains the transcript store, the relay state machine, prompt
//! construction, and the engine that ties them to an executor.

pub mod prompt;
pub mod relay;
pub mod relay_state;
pub mod transcript;

pub use relay::{Progress, ProgressCallback, Relay};
pub use relay_state::RelayState;
pub use transcript::Transcript;
