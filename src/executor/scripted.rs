//! Scripted executor for tests and dry runs
//!
//! Replays canned utterances in call order and records every request it
//! receives. Needs no external process.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::ExecutorError;
use crate::executor::traits::{AgentExecutor, AgentRequest};

/// A request as seen by the scripted executor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub prompt: String,
    pub model: Option<String>,
}

/// Deterministic in-process executor
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    replies: Mutex<VecDeque<String>>,
    fail_on_call: Option<usize>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedExecutor {
    /// Reply with `replies` in order; once exhausted, reply `utterance-N`
    /// where N is the 1-based call number
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            fail_on_call: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Reply `utterance-1`, `utterance-2`, ...
    pub fn numbered() -> Self {
        Self::default()
    }

    /// Fail the given 1-based call instead of replying
    pub fn failing_on_call(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    /// Every request received so far, in order
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Prompts received so far, in order
    pub fn prompts(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.prompt).collect()
    }
}

#[async_trait]
impl AgentExecutor for ScriptedExecutor {
    async fn invoke(&self, request: AgentRequest<'_>) -> Result<String, ExecutorError> {
        let call_number = {
            let mut calls = self
                .calls
                .lock()
                .map_err(|_| ExecutorError::Other("call log poisoned".to_string()))?;
            calls.push(RecordedCall {
                prompt: request.prompt.to_string(),
                model: request.model.map(str::to_string),
            });
            calls.len()
        };

        if self.fail_on_call == Some(call_number) {
            return Err(ExecutorError::Other(format!(
                "scripted failure on call {}",
                call_number
            )));
        }

        let next = self
            .replies
            .lock()
            .map_err(|_| ExecutorError::Other("reply queue poisoned".to_string()))?
            .pop_front();

        Ok(next.unwrap_or_else(|| format!("utterance-{}", call_number)))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BackendSettings;
    use std::path::Path;

    fn request<'a>(prompt: &'a str, backend: &'a BackendSettings) -> AgentRequest<'a> {
        AgentRequest {
            prompt,
            model: Some("m"),
            backend,
            working_dir: Path::new("."),
        }
    }

    #[tokio::test]
    async fn test_replies_then_numbers() {
        let backend = BackendSettings::default();
        let exec = ScriptedExecutor::new(["first"]);

        assert_eq!(exec.invoke(request("p1", &backend)).await.unwrap(), "first");
        assert_eq!(exec.invoke(request("p2", &backend)).await.unwrap(), "utterance-2");
        assert_eq!(exec.prompts(), vec!["p1", "p2"]);
        assert_eq!(exec.calls()[0].model.as_deref(), Some("m"));
    }

    #[tokio::test]
    async fn test_scripted_failure() {
        let backend = BackendSettings::default();
        let exec = ScriptedExecutor::numbered().failing_on_call(2);

        tokio_test::assert_ok!(exec.invoke(request("p1", &backend)).await);
        tokio_test::assert_err!(exec.invoke(request("p2", &backend)).await);
        assert_eq!(exec.calls().len(), 2);
    }
}
