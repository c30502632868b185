//! Shared types used across the relay
//!
//! Agent roles, utterances and the turns that group them.

use std::fmt;

/// One of the two agents taking part in the dialogue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentRole {
    A,
    B,
}

impl AgentRole {
    /// Persona label used in rendered transcripts and prompts
    pub fn label(self) -> &'static str {
        match self {
            Self::A => "Agent A",
            Self::B => "Agent B",
        }
    }

    /// System framing placed at the top of every prompt for this role
    pub fn framing(self) -> &'static str {
        match self {
            Self::A => "You are Agent A. Reply concisely to what your counterpart (Agent B) says.",
            Self::B => "You are Agent B. Reply concisely to what your counterpart (Agent A) says.",
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Text produced by one agent in one turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    /// Who spoke
    pub role: AgentRole,
    /// 1-based turn index
    pub turn: usize,
    /// What was said (may be empty)
    pub text: String,
}

impl Utterance {
    pub fn new(role: AgentRole, turn: usize, text: impl Into<String>) -> Self {
        Self {
            role,
            turn,
            text: text.into(),
        }
    }
}

/// One round-trip: A's utterance, then B's once it has been recorded.
///
/// A turn cannot exist without A's utterance, so "only B spoke" is
/// unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    index: usize,
    a: Utterance,
    b: Option<Utterance>,
}

impl Turn {
    pub(crate) fn open(index: usize, a_text: impl Into<String>) -> Self {
        Self {
            index,
            a: Utterance::new(AgentRole::A, index, a_text),
            b: None,
        }
    }

    pub(crate) fn close(&mut self, b_text: impl Into<String>) {
        self.b = Some(Utterance::new(AgentRole::B, self.index, b_text));
    }

    /// 1-based turn index
    pub fn index(&self) -> usize {
        self.index
    }

    /// Agent A's utterance
    pub fn a(&self) -> &Utterance {
        &self.a
    }

    /// Agent B's utterance, if recorded yet
    pub fn b(&self) -> Option<&Utterance> {
        self.b.as_ref()
    }

    /// Whether both agents have spoken
    pub fn is_complete(&self) -> bool {
        self.b.is_some()
    }

    /// Utterances in speaking order
    pub fn utterances(&self) -> impl Iterator<Item = &Utterance> {
        std::iter::once(&self.a).chain(self.b.iter())
    }
}
