//! Reply Parser
//!
//! Turns raw model text into the next move of the reasoning loop.
//! The keyword vocabulary here must stay in sync with [`crate::prompt`].

use std::sync::LazyLock;

use regex::Regex;

use crate::transcript::{AgentAction, strip_thought_prefix};

/// Marker that ends the reasoning
pub const FINAL_ANSWER_MARKER: &str = "Final Answer:";

pub const MISSING_ACTION_HINT: &str = "Invalid Format: Missing 'Action:' after 'Thought:'";
pub const MISSING_ACTION_INPUT_HINT: &str =
    "Invalid Format: Missing 'Action Input:' after 'Action:'";
pub const INCOMPLETE_RESPONSE_HINT: &str = "Invalid or incomplete response";

static ACTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)Action\s*\d*\s*:\s*(.*?)\s*Action\s*\d*\s*Input\s*\d*\s*:\s*(.*)")
        .expect("action pattern is valid")
});

static ACTION_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Action\s*\d*\s*:").expect("action label pattern is valid"));

static ACTION_INPUT_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Action\s*\d*\s*Input\s*\d*\s*:").expect("action input label pattern is valid")
});

/// What the model asked for
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParsedReply {
    /// Reasoning is complete
    FinalAnswer(String),

    /// Run a tool and report back
    Action(AgentAction),

    /// Neither pattern matched; carries the raw reply
    ParseError(String),
}

/// Parse a model reply
///
/// A `Final Answer:` wins over an action in the same reply.
pub fn parse_reply(text: &str) -> ParsedReply {
    if let Some(idx) = text.rfind(FINAL_ANSWER_MARKER) {
        let answer = text[idx + FINAL_ANSWER_MARKER.len()..].trim();
        return ParsedReply::FinalAnswer(answer.to_string());
    }

    if let Some(caps) = ACTION_RE.captures(text) {
        if let (Some(whole), Some(tool), Some(input)) = (caps.get(0), caps.get(1), caps.get(2)) {
            let mut action = AgentAction::new(tool.as_str().trim(), clean_input(input.as_str()));

            let thought = strip_thought_prefix(&text[..whole.start()]);
            if !thought.is_empty() {
                action = action.with_thought(thought);
            }
            return ParsedReply::Action(action);
        }
    }

    ParsedReply::ParseError(text.to_string())
}

/// Hint fed back to the model after an unparseable reply
pub fn correction_hint(raw: &str) -> &'static str {
    if !ACTION_LABEL_RE.is_match(raw) {
        MISSING_ACTION_HINT
    } else if !ACTION_INPUT_LABEL_RE.is_match(raw) {
        MISSING_ACTION_INPUT_HINT
    } else {
        INCOMPLETE_RESPONSE_HINT
    }
}

/// Models without stop-sequence support keep writing past the input line
fn clean_input(raw: &str) -> String {
    let raw = raw.find("\nObservation").map_or(raw, |end| &raw[..end]);
    raw.trim().trim_matches('"').trim().to_string()
}
