//! Relay engine
//!
//! Alternates Agent A and Agent B for a fixed number of round-trips. Every
//! utterance is appended to the transcript and the log is rewritten before
//! the next agent is invoked, so the file on disk is always a complete
//! prefix of the conversation.
//!
//! Every prompt carries the entire rendered transcript, so prompt size grows
//! linearly with the number of round-trips.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::agent::prompt;
use crate::agent::relay_state::RelayState;
use crate::agent::transcript::Transcript;
use crate::core::{AgentRole, DuelError, RelayConfig, Result};
use crate::executor::{AgentExecutor, AgentRequest};

/// A completed round-trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    /// Round-trip just finished (1-based)
    pub turn: usize,
    /// Round-trips requested
    pub total: usize,
    /// Where the transcript was written
    pub log_path: PathBuf,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}/{}] wrote {}",
            self.turn,
            self.total,
            self.log_path.display()
        )
    }
}

/// Callback invoked once per completed round-trip
pub type ProgressCallback = Box<dyn FnMut(&Progress) + Send>;

/// Drives one relay run
pub struct Relay {
    /// Run configuration
    config: RelayConfig,
    /// Produces utterances
    executor: Arc<dyn AgentExecutor>,
    /// Conversation so far
    transcript: Transcript,
    /// Whose turn it is
    state: RelayState,
    /// B's previous utterance, fed back to A on the next turn
    last_b: Option<String>,
    /// Progress sink
    on_progress: ProgressCallback,
}

impl Relay {
    /// Create a relay that reports progress on stdout
    pub fn new(config: RelayConfig, executor: Arc<dyn AgentExecutor>) -> Self {
        let backend = config.backend();
        if backend.local_provider.is_some() && !backend.oss {
            warn!("local provider is set without the OSS backend; ignoring it");
        }

        Self {
            config,
            executor,
            transcript: Transcript::new(),
            state: RelayState::initial(),
            last_b: None,
            on_progress: Box::new(|progress| println!("{}", progress)),
        }
    }

    /// Replace the progress reporter
    pub fn on_progress(mut self, callback: impl FnMut(&Progress) + Send + 'static) -> Self {
        self.on_progress = Box::new(callback);
        self
    }

    /// Run every remaining step until all round-trips are recorded.
    ///
    /// The first failure aborts the run; whatever was persisted before it
    /// stays on disk.
    pub async fn run(&mut self) -> Result<()> {
        info!(
            executor = self.executor.name(),
            turns = self.config.total_round_trips(),
            log = %self.config.log_path().display(),
            "starting relay"
        );

        while !self.state.is_done() {
            self.step().await?;
        }

        info!(
            turns = self.transcript.completed_turns(),
            "relay finished"
        );
        Ok(())
    }

    /// Invoke the pending agent once, record and persist its utterance, and
    /// advance the state machine
    pub async fn step(&mut self) -> Result<RelayState> {
        let Some((role, turn)) = self.state.pending() else {
            return Ok(self.state);
        };

        let prompt = self.build_prompt(role, turn)?;
        debug!(role = %role, turn, prompt_bytes = prompt.len(), "invoking agent");

        let text = self
            .executor
            .invoke(AgentRequest {
                prompt: &prompt,
                model: self.config.model_for(role),
                backend: self.config.backend(),
                working_dir: self.config.working_dir(),
            })
            .await
            .map_err(|e| DuelError::executor(role, turn, e))?;

        self.transcript.append_utterance(role, turn, text.as_str())?;
        self.transcript.persist(self.config.log_path())?;
        info!(role = %role, turn, chars = text.chars().count(), "utterance recorded");

        if role == AgentRole::B {
            self.last_b = Some(text);
            (self.on_progress)(&Progress {
                turn,
                total: self.config.total_round_trips(),
                log_path: self.config.log_path().to_path_buf(),
            });
        }

        self.state = self.state.advance(self.config.total_round_trips());
        Ok(self.state)
    }

    fn build_prompt(&self, role: AgentRole, turn: usize) -> Result<String> {
        let rendered = self.transcript.render_context();
        match role {
            AgentRole::A => Ok(prompt::agent_a_prompt(
                &rendered,
                self.last_b.as_deref(),
                turn,
                self.config.seed(),
            )),
            AgentRole::B => {
                let last_a = self
                    .transcript
                    .last_from(AgentRole::A)
                    .filter(|u| u.turn == turn)
                    .ok_or_else(|| {
                        DuelError::invalid_sequence(role, turn, "no Agent A utterance to answer")
                    })?;
                Ok(prompt::agent_b_prompt(&rendered, &last_a.text))
            }
        }
    }

    /// Conversation recorded so far
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Current state of the relay
    pub fn state(&self) -> RelayState {
        self.state
    }

    /// Run configuration
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::ScriptedExecutor;
    use std::sync::Mutex;

    fn config(dir: &tempfile::TempDir, turns: usize) -> RelayConfig {
        RelayConfig::new("discuss X", turns)
            .unwrap()
            .with_log_path(dir.path().join("log.md"))
            .with_working_dir(dir.path())
    }

    #[tokio::test]
    async fn test_step_walks_state_machine() {
        let dir = tempfile::tempdir().unwrap();
        let mut relay = Relay::new(config(&dir, 1), Arc::new(ScriptedExecutor::numbered()))
            .on_progress(|_| {});

        assert_eq!(relay.state(), RelayState::AwaitingA(1));
        assert_eq!(relay.step().await.unwrap(), RelayState::AwaitingB(1));
        assert_eq!(relay.step().await.unwrap(), RelayState::Done);
        // Stepping a finished relay is a no-op
        assert_eq!(relay.step().await.unwrap(), RelayState::Done);
        assert_eq!(relay.transcript().utterance_count(), 2);
    }

    #[tokio::test]
    async fn test_progress_once_per_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let mut relay = Relay::new(config(&dir, 3), Arc::new(ScriptedExecutor::numbered()))
            .on_progress(move |p| sink.lock().unwrap().push(p.clone()));
        relay.run().await.unwrap();

        let seen = seen.lock().unwrap();
        let turns: Vec<_> = seen.iter().map(|p| (p.turn, p.total)).collect();
        assert_eq!(turns, vec![(1, 3), (2, 3), (3, 3)]);
        assert_eq!(
            seen[0].to_string(),
            format!("[1/3] wrote {}", dir.path().join("log.md").display())
        );
    }

    #[tokio::test]
    async fn test_failure_reports_role_and_turn() {
        let dir = tempfile::tempdir().unwrap();
        let executor = ScriptedExecutor::numbered().failing_on_call(3);
        let mut relay = Relay::new(config(&dir, 2), Arc::new(executor)).on_progress(|_| {});

        let err = relay.run().await.unwrap_err();
        assert!(matches!(
            err,
            DuelError::Executor {
                role: AgentRole::A,
                turn: 2,
                ..
            }
        ));
        assert_eq!(relay.state(), RelayState::AwaitingA(2));
    }
}
