//! Prompt construction for each agent invocation
//!
//! Both prompts are blank-line separated sections in a fixed order. Agent A
//! sees the transcript, B's last line, and the topic (seed on turn 1,
//! continue marker after). Agent B sees the transcript and A's new line.

use crate::core::AgentRole;

/// Stand-in for absent context
pub const NONE_YET: &str = "(none yet)";

/// Stand-in for the seed topic on every turn after the first
pub const CONTINUE_MARKER: &str = "(continue)";

/// Build Agent A's prompt for turn `turn`.
///
/// `transcript` is the rendered history so far; `last_b` is B's previous
/// utterance, repeated here even though the transcript already holds it.
pub fn agent_a_prompt(transcript: &str, last_b: Option<&str>, turn: usize, seed: &str) -> String {
    let topic = if turn == 1 { seed } else { CONTINUE_MARKER };

    [
        AgentRole::A.framing().to_string(),
        format!("Conversation log:\n{}", or_none(transcript)),
        format!(
            "Latest {} utterance:\n{}",
            AgentRole::B.label(),
            or_none(last_b.unwrap_or_default())
        ),
        format!("Topic / instruction for this turn:\n{}", topic),
        single_utterance_instruction(AgentRole::A),
    ]
    .join("\n\n")
}

/// Build Agent B's prompt; `last_a` is the utterance A just produced
pub fn agent_b_prompt(transcript: &str, last_a: &str) -> String {
    [
        AgentRole::B.framing().to_string(),
        format!("Conversation log:\n{}", or_none(transcript)),
        format!("Latest {} utterance:\n{}", AgentRole::A.label(), last_a),
        single_utterance_instruction(AgentRole::B),
    ]
    .join("\n\n")
}

fn single_utterance_instruction(role: AgentRole) -> String {
    format!(
        "Output exactly one next utterance as {} and nothing else.",
        role.label()
    )
}

fn or_none(text: &str) -> &str {
    if text.is_empty() {
        NONE_YET
    } else {
        text
    }
}
