//! Reasoning Transcript
//!
//! The growing Thought/Action/Observation log of a single request.
//! Created fresh for every question and dropped once the answer is produced.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tool invocation requested by the model
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentAction {
    /// Tool name as written after `Action:`
    pub tool: String,

    /// Text written after `Action Input:`
    pub input: String,

    /// Reasoning that preceded the action, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<String>,
}

impl AgentAction {
    pub fn new(tool: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            input: input.into(),
            thought: None,
        }
    }

    pub fn with_thought(mut self, thought: impl Into<String>) -> Self {
        self.thought = Some(thought.into());
        self
    }
}

/// A completed dispatch: what was asked and what came back
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentStep {
    pub action: AgentAction,
    pub observation: String,
}

/// One entry of the transcript
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Step {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thought: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<AgentAction>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub observation: Option<String>,

    pub timestamp: DateTime<Utc>,
}

/// Append-only log for one question
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Transcript {
    question: String,
    steps: Vec<Step>,
}

impl Transcript {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            steps: Vec::new(),
        }
    }

    /// The original question
    pub fn question(&self) -> &str {
        &self.question
    }

    /// Record a dispatched action and its observation
    pub fn push_action(&mut self, action: AgentAction, observation: impl Into<String>) {
        self.steps.push(Step {
            thought: action.thought.clone(),
            action: Some(action),
            observation: Some(observation.into()),
            timestamp: Utc::now(),
        });
    }

    /// Record an unparseable reply together with the correction hint
    pub fn push_correction(&mut self, raw: &str, hint: impl Into<String>) {
        let thought = strip_thought_prefix(raw);
        self.steps.push(Step {
            thought: (!thought.is_empty()).then(|| thought.to_string()),
            action: None,
            observation: Some(hint.into()),
            timestamp: Utc::now(),
        });
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Render the steps so far as the prompt's scratchpad
    ///
    /// Ends with an open `Thought: ` so the model continues from there.
    pub fn render_scratchpad(&self) -> String {
        let mut pad = String::new();

        for step in &self.steps {
            if let Some(thought) = &step.thought {
                pad.push_str("Thought: ");
                pad.push_str(thought);
                pad.push('\n');
            }
            if let Some(action) = &step.action {
                pad.push_str("Action: ");
                pad.push_str(&action.tool);
                pad.push_str("\nAction Input: ");
                pad.push_str(&action.input);
                pad.push('\n');
            }
            if let Some(observation) = &step.observation {
                pad.push_str("Observation: ");
                pad.push_str(observation);
                pad.push('\n');
            }
        }

        if !self.steps.is_empty() {
            pad.push_str("Thought: ");
        }
        pad
    }
}

/// Drop a leading `Thought:` label and surrounding whitespace
pub(crate) fn strip_thought_prefix(text: &str) -> &str {
    let text = text.trim();
    text.strip_prefix("Thought:").map_or(text, str::trim)
}
