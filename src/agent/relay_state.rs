//! Relay state machine
//!
//! Tracks whose turn it is. The only transitions are A → B within a turn,
//! B → A of the next turn, and B of the final turn → `Done`.

use std::fmt;

use crate::core::AgentRole;

/// Position of the relay between agent invocations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    /// Waiting for Agent A to open turn `t`
    AwaitingA(usize),
    /// Waiting for Agent B to close turn `t`
    AwaitingB(usize),
    /// All requested round-trips are recorded
    Done,
}

impl RelayState {
    /// Starting state of every run
    pub fn initial() -> Self {
        Self::AwaitingA(1)
    }

    /// State after the pending agent has spoken successfully
    pub fn advance(self, total_round_trips: usize) -> Self {
        match self {
            Self::AwaitingA(t) => Self::AwaitingB(t),
            Self::AwaitingB(t) if t >= total_round_trips => Self::Done,
            Self::AwaitingB(t) => Self::AwaitingA(t + 1),
            Self::Done => Self::Done,
        }
    }

    /// Agent expected to speak next, with the turn it speaks in
    pub fn pending(self) -> Option<(AgentRole, usize)> {
        match self {
            Self::AwaitingA(t) => Some((AgentRole::A, t)),
            Self::AwaitingB(t) => Some((AgentRole::B, t)),
            Self::Done => None,
        }
    }

    pub fn is_done(self) -> bool {
        self == Self::Done
    }
}

impl fmt::Display for RelayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AwaitingA(t) => write!(f, "awaiting Agent A (turn {})", t),
            Self::AwaitingB(t) => write!(f, "awaiting Agent B (turn {})", t),
            Self::Done => f.write_str("done"),
        }
    }
}
