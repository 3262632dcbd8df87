//! Calculator Tool
//!
//! Evaluates plain arithmetic typed by the model.

use async_trait::async_trait;

use agent_core::{Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema};

use crate::error::CalcError;
use crate::expr;

/// Tool for arithmetic
pub struct CalculatorTool;

/// Validate and evaluate one expression
///
/// Input is trimmed and one trailing `=` is dropped. Only digits,
/// whitespace and `+ - * / ( ) . %` get as far as the evaluator.
pub fn calculate(input: &str) -> Result<String, CalcError> {
    let expression = input.trim();
    let expression = expression.strip_suffix('=').map_or(expression, str::trim);

    if !is_allowed(expression) {
        return Err(CalcError::InvalidExpression);
    }

    Ok(expr::evaluate(expression)?.to_string())
}

fn is_allowed(expression: &str) -> bool {
    !expression.is_empty()
        && expression
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_whitespace() || "+-*/().%".contains(c))
}

#[async_trait]
impl Tool for CalculatorTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "calculator".into(),
            description: "Useful for performing arithmetic calculations. Input should be a mathematical expression like '1 + 2' or '3 * 4'.".into(),
            category: Some("math".into()),
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        match calculate(&call.input) {
            Ok(value) => Ok(ToolResult::success("calculator", value)),
            Err(e) => {
                tracing::debug!(input = %call.input, error = %e, "Calculation rejected");
                Ok(ToolResult::failure("calculator", e.to_string()))
            }
        }
    }
}
