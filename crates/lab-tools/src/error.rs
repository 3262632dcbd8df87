//! Error Types for Lab Tools

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExprError>;

/// Arithmetic evaluation failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExprError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("unbalanced parentheses")]
    UnbalancedParentheses,

    #[error("unexpected token '{0}'")]
    UnexpectedToken(String),

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),

    #[error("result too large")]
    Overflow,

    #[error("complex result not supported")]
    ComplexResult,

    #[error("expression too deeply nested")]
    TooDeep,
}

/// Calculator outcomes shown to the model
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalcError {
    #[error("Invalid expression. Please provide a simple math expression using +, -, *, /, (, ), or **.")]
    InvalidExpression,

    #[error("Error calculating result: {0}")]
    Evaluation(#[from] ExprError),
}
