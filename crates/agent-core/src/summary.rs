//! Fallback Summary
//!
//! Best-effort answer for a run that stopped without a `Final Answer`.

use std::collections::HashSet;

use crate::transcript::AgentStep;

pub const SUMMARY_PREFIX: &str = "Based on my research: ";

pub const NO_ANSWER_APOLOGY: &str =
    "I apologize, but I wasn't able to find a complete answer to your question.";

/// Join the distinct observations collected so far
///
/// Duplicates collapse to their first occurrence.
pub fn compose_fallback(steps: &[AgentStep]) -> String {
    let mut seen = HashSet::new();
    let unique: Vec<&str> = steps
        .iter()
        .map(|step| step.observation.as_str())
        .filter(|obs| !obs.trim().is_empty())
        .filter(|obs| seen.insert(*obs))
        .collect();

    if unique.is_empty() {
        return NO_ANSWER_APOLOGY.into();
    }

    format!("{SUMMARY_PREFIX}{}", unique.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::AgentAction;

    fn step(observation: &str) -> AgentStep {
        AgentStep {
            action: AgentAction::new("web_search", "q"),
            observation: observation.into(),
        }
    }

    #[test]
    fn test_no_observations() {
        assert_eq!(compose_fallback(&[]), NO_ANSWER_APOLOGY);
        assert_eq!(compose_fallback(&[step(""), step("  ")]), NO_ANSWER_APOLOGY);
    }

    #[test]
    fn test_duplicates_collapse() {
        let steps = [step("Docker runs containers."), step("Docker runs containers.")];
        assert_eq!(
            compose_fallback(&steps),
            "Based on my research: Docker runs containers."
        );
    }

    #[test]
    fn test_first_occurrence_order() {
        let steps = [step("a"), step("b"), step("a"), step("c")];
        assert_eq!(compose_fallback(&steps), "Based on my research: a b c");
    }
}
