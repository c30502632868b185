//! Transcript store
//!
//! Append-only turn history shared by both agents. Renders to the markdown
//! text that is fed into every prompt and rewritten to disk after every
//! utterance.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::core::{AgentRole, DuelError, Result, Turn, Utterance};

/// Ordered turn history for one run
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    /// Create an empty transcript
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an utterance for `turn_index`.
    ///
    /// A opens the next sequential turn; B closes the currently open one.
    /// Anything else is an ordering violation.
    pub fn append_utterance(
        &mut self,
        role: AgentRole,
        turn_index: usize,
        text: impl Into<String>,
    ) -> Result<()> {
        match role {
            AgentRole::A => {
                if let Some(open) = self.turns.last().filter(|t| !t.is_complete()) {
                    return Err(DuelError::invalid_sequence(
                        role,
                        turn_index,
                        format!("turn {} is still waiting for Agent B", open.index()),
                    ));
                }
                let expected = self.turns.len() + 1;
                if turn_index != expected {
                    return Err(DuelError::invalid_sequence(
                        role,
                        turn_index,
                        format!("next turn is {}", expected),
                    ));
                }
                self.turns.push(Turn::open(turn_index, text));
            }
            AgentRole::B => {
                let open = self
                    .turns
                    .last_mut()
                    .filter(|t| t.index() == turn_index && !t.is_complete())
                    .ok_or_else(|| {
                        DuelError::invalid_sequence(
                            role,
                            turn_index,
                            "Agent A has not spoken in this turn",
                        )
                    })?;
                open.close(text);
            }
        }
        Ok(())
    }

    /// Render the whole transcript, oldest first, as it is written to disk.
    ///
    /// Each turn is a `## Turn N` heading followed by `### Agent A` and
    /// `### Agent B` sections.
    pub fn render_full(&self) -> String {
        let context = self.render_context();
        match context.strip_prefix('\n') {
            Some(rest) => rest.to_string(),
            None => context,
        }
    }

    /// Render the transcript for a prompt's conversation log. Same blocks as
    /// `render_full`, but every block keeps its leading newline.
    pub fn render_context(&self) -> String {
        let mut out = String::new();
        for utterance in self.utterances() {
            if utterance.role == AgentRole::A {
                out.push_str(&format!("\n## Turn {}\n", utterance.turn));
            }
            out.push_str(&format!(
                "\n### {}\n\n{}\n",
                utterance.role.label(),
                utterance.text
            ));
        }
        out
    }

    /// Overwrite `destination` with the rendered transcript and flush it to disk
    pub fn persist(&self, destination: &Path) -> Result<()> {
        let rendered = self.render_full();
        let write = || -> std::io::Result<()> {
            let mut file = File::create(destination)?;
            file.write_all(rendered.as_bytes())?;
            file.sync_all()
        };

        write().map_err(|source| DuelError::Persistence {
            path: destination.to_path_buf(),
            utterances: self.utterance_count(),
            source,
        })
    }

    /// All utterances in speaking order
    pub fn utterances(&self) -> impl Iterator<Item = &Utterance> {
        self.turns.iter().flat_map(Turn::utterances)
    }

    /// Recorded turns, complete or not
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// The most recent utterance by `role`
    pub fn last_from(&self, role: AgentRole) -> Option<&Utterance> {
        self.turns
            .iter()
            .rev()
            .flat_map(Turn::utterances)
            .find(|u| u.role == role)
    }

    /// Number of recorded utterances
    pub fn utterance_count(&self) -> usize {
        self.turns
            .iter()
            .map(|t| if t.is_complete() { 2 } else { 1 })
            .sum()
    }

    /// Number of turns where both agents have spoken
    pub fn completed_turns(&self) -> usize {
        self.turns.iter().filter(|t| t.is_complete()).count()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
