//! Error Types

use std::time::Duration;

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Fixed reply shown to the user whenever a chat request fails.
pub const CHAT_APOLOGY: &str =
    "I'm sorry, I encountered an error processing your request. Please try asking in a different way.";

/// Agent error types
#[derive(Error, Debug)]
pub enum AgentError {
    /// The model runtime answered, but with an error
    #[error("Provider error: {0}")]
    Provider(String),

    /// Model runtime unreachable, or the model could not be loaded
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// A single model call exceeded its timeout
    #[error("Model call timed out after {0:?}")]
    ModelTimeout(Duration),

    /// Tool not found in registry
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// A tool with this name is already registered
    #[error("Duplicate tool: {0}")]
    DuplicateTool(String),

    /// Tool execution failed
    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl AgentError {
    /// Whether the failure came from the model runtime rather than from us
    pub const fn is_model_failure(&self) -> bool {
        matches!(
            self,
            Self::Provider(_) | Self::ProviderUnavailable(_) | Self::ModelTimeout(_)
        )
    }

    /// Convert to a user-friendly message
    ///
    /// Chat callers never see the underlying cause; it is only logged.
    pub fn user_message(&self) -> String {
        CHAT_APOLOGY.into()
    }
}

impl From<anyhow::Error> for AgentError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
