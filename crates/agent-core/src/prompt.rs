//! Prompt Builder
//!
//! Renders the ReAct instruction template. The Thought/Action/Action Input/
//! Observation/Final Answer wording is the contract [`crate::parser`] relies
//! on; change them together or not at all.

use crate::tool::ToolRegistry;
use crate::transcript::Transcript;

/// Template placeholders: `{tools}`, `{tool_names}`, `{max_iterations}`, `{input}`,
/// `{agent_scratchpad}`
pub const REACT_TEMPLATE: &str = r"Answer the following questions as best you can. You have access to the following tools:

{tools}

Use the following format EXACTLY:

Question: the input question you must answer
Thought: you should always think about what to do
Action: the action to take, should be one of [{tool_names}]
Action Input: the exact input to the action with no parentheses, quotes or extra characters
Observation: the result of the action
... (this Thought/Action/Action Input/Observation can repeat N times)
Thought: I now know the final answer (IMPORTANT: once you have enough information, you MUST proceed to the final answer)
Final Answer: the final answer to the original input question

IMPORTANT: You have a maximum of {max_iterations} tool uses. You must provide a Final Answer after gathering sufficient information, even if it's not complete.

Here are two examples:

Example 1:
Question: What's 2 + 2?
Thought: I need to calculate this simple math problem.
Action: calculator
Action Input: 2 + 2
Observation: 4
Thought: I now know the final answer.
Final Answer: The answer to 2 + 2 is 4.

Example 2:
Question: What do you know about Python?
Thought: I should search for information about Python.
Action: web_search
Action Input: python
Observation: Python is a popular programming language known for its readability and versatility.
Thought: I now know the final answer.
Final Answer: Python is a popular programming language that is known for being readable and versatile.

Begin!

Question: {input}
{agent_scratchpad}";

/// Builds the full prompt for each model call
///
/// The tool section is fixed for the registry's lifetime, so it is rendered
/// once; only the question and scratchpad change between iterations.
#[derive(Clone, Debug)]
pub struct PromptBuilder {
    template: String,
    tools: String,
    tool_names: String,
    max_iterations: String,
}

impl PromptBuilder {
    pub fn new(tools: &ToolRegistry) -> Self {
        Self::with_template(REACT_TEMPLATE, tools)
    }

    pub fn with_template(template: impl Into<String>, tools: &ToolRegistry) -> Self {
        let schemas = tools.schemas();

        let descriptions = schemas
            .iter()
            .map(|s| format!("{}: {}", s.name, s.description))
            .collect::<Vec<_>>()
            .join("\n");

        let names = schemas
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            template: template.into(),
            tools: descriptions,
            tool_names: names,
            max_iterations: "5".into(),
        }
    }

    /// Tool-use budget announced to the model
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.to_string();
        self
    }

    /// Comma-separated tool names, as shown to the model
    pub fn tool_names(&self) -> &str {
        &self.tool_names
    }

    /// Render the prompt for the transcript's current state
    pub fn render(&self, transcript: &Transcript) -> String {
        let scratchpad = transcript.render_scratchpad();
        fill(
            &self.template,
            &[
                ("{tools}", self.tools.as_str()),
                ("{tool_names}", self.tool_names.as_str()),
                ("{max_iterations}", self.max_iterations.as_str()),
                ("{input}", transcript.question()),
                ("{agent_scratchpad}", scratchpad.as_str()),
            ],
        )
    }
}

/// Single-pass placeholder substitution; inserted text is never re-scanned
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];

        if let Some((key, value)) = values.iter().find(|(key, _)| tail.starts_with(key)) {
            out.push_str(value);
            rest = &tail[key.len()..];
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::error::Result;
    use crate::tool::{Tool, ToolCall, ToolResult, ToolSchema};
    use crate::transcript::AgentAction;

    struct NamedTool(&'static str, &'static str);

    #[async_trait]
    impl Tool for NamedTool {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: self.0.into(),
                description: self.1.into(),
                category: None,
            }
        }

        async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
            Ok(ToolResult::success(self.0, call.input.clone()))
        }
    }

    fn registry() -> ToolRegistry {
        let mut tools = ToolRegistry::new();
        tools.register(NamedTool("web_search", "Searches.")).unwrap();
        tools.register(NamedTool("calculator", "Computes.")).unwrap();
        tools
    }

    #[test]
    fn test_tool_sections() {
        let prompt = PromptBuilder::new(&registry()).render(&Transcript::new("hi"));

        assert!(prompt.contains("web_search: Searches.\ncalculator: Computes."));
        assert!(prompt.contains("should be one of [web_search, calculator]"));
        assert!(prompt.ends_with("Question: hi\n"));
        assert!(!prompt.contains("{tools}"));
        assert!(!prompt.contains("{agent_scratchpad}"));
    }

    #[test]
    fn test_scratchpad_appended() {
        let builder = PromptBuilder::new(&registry());
        let mut transcript = Transcript::new("What's 3 * 4?");
        transcript.push_action(AgentAction::new("calculator", "3 * 4"), "12");

        let prompt = builder.render(&transcript);
        assert!(prompt.ends_with(
            "Question: What's 3 * 4?\nAction: calculator\nAction Input: 3 * 4\nObservation: 12\nThought: "
        ));
    }

    #[test]
    fn test_tool_budget() {
        let transcript = Transcript::new("hi");

        let default = PromptBuilder::new(&registry()).render(&transcript);
        assert!(default.contains("You have a maximum of 5 tool uses."));

        let three = PromptBuilder::new(&registry())
            .with_max_iterations(3)
            .render(&transcript);
        assert!(three.contains("You have a maximum of 3 tool uses."));
        assert!(!three.contains("{max_iterations}"));
    }

    #[test]
    fn test_placeholders_in_question_are_literal() {
        let builder = PromptBuilder::new(&registry());
        let prompt = builder.render(&Transcript::new("what is {agent_scratchpad}?"));
        assert!(prompt.ends_with("Question: what is {agent_scratchpad}?\n"));
    }
}
