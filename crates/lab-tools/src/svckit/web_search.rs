//! Web Search Tool
//!
//! Simulated search over the fixed knowledge table. Arithmetic is never
//! answered here; such queries are pointed at the calculator.

use async_trait::async_trait;

use agent_core::{Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema};

use crate::knowledge;

pub const MATH_REDIRECT: &str =
    "This seems like a math question. Please use the calculator tool instead.";

const MATH_MARKERS: &[&str] = &["+", "-", "*", "/", "calculate", "computation"];

/// Tool for looking things up
pub struct WebSearchTool;

/// Answer a query from the knowledge table
pub fn search(query: &str) -> String {
    let query = query.trim();
    let normalized = query.to_lowercase();

    if MATH_MARKERS.iter().any(|marker| normalized.contains(marker)) {
        return MATH_REDIRECT.into();
    }

    let results: Vec<String> = knowledge::matching(&normalized)
        .map(|(keyword, fact)| format!("Result for '{keyword}': {fact}"))
        .collect();

    if !results.is_empty() {
        return results.join("\n\n");
    }

    format!(
        "Simulated search results for: {query}\n\n\
         1. The information you're looking for could be found on various websites.\n\
         2. Several articles discuss this topic with different perspectives.\n\
         3. There are forums and communities where people share information about this."
    )
}

#[async_trait]
impl Tool for WebSearchTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "web_search".into(),
            description: "Useful for searching the web for information. Input should be a search query.".into(),
            category: Some("search".into()),
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        Ok(ToolResult::success("web_search", search(&call.input)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_math_redirect() {
        assert_eq!(search("what is 2+2"), MATH_REDIRECT);
        assert_eq!(search("Please CALCULATE my taxes"), MATH_REDIRECT);
        assert_eq!(search("10 / 3 python"), MATH_REDIRECT);
        assert_eq!(search("heavy computation"), MATH_REDIRECT);
    }

    #[test]
    fn test_keyword_hit() {
        let result = search("Tell me about Python");
        assert_eq!(
            result,
            format!("Result for 'python': {}", knowledge::fact("python").unwrap())
        );
    }

    #[test]
    fn test_multiple_hits_in_table_order() {
        let result = search("python or docker");
        let docker = format!("Result for 'docker': {}", knowledge::fact("docker").unwrap());
        let python = format!("Result for 'python': {}", knowledge::fact("python").unwrap());
        assert_eq!(result, format!("{docker}\n\n{python}"));
    }

    #[test]
    fn test_substring_matches() {
        // "containerization" also contains "ai"
        let result = search("containerization");
        let keys: Vec<&str> = result
            .split("\n\n")
            .filter_map(|r| r.strip_prefix("Result for '"))
            .filter_map(|r| r.split_once('\'').map(|(k, _)| k))
            .collect();
        assert_eq!(keys, vec!["ai", "containerization"]);
    }

    #[test]
    fn test_generic_reply() {
        let result = search("  Zebras of Kenya ");
        let lines: Vec<&str> = result.lines().collect();

        assert_eq!(lines[0], "Simulated search results for: Zebras of Kenya");
        assert_eq!(lines[1], "");
        assert!(lines[2].starts_with("1. "));
        assert!(lines[3].starts_with("2. "));
        assert!(lines[4].starts_with("3. "));
        assert_eq!(lines.len(), 5);
    }

    #[tokio::test]
    async fn test_tool_execution() {
        let result = WebSearchTool
            .execute(&ToolCall::new("web_search", "latest news"))
            .await
            .unwrap();
        assert!(result.success);
        assert!(result.output.starts_with("Result for 'news': Latest headlines"));
    }
}
