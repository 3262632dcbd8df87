//! Application State

use std::sync::Arc;

use agent_core::{Agent, LlmProvider, ModelRef};

/// Shared application state
///
/// Built once at startup; handlers only read it.
#[derive(Clone)]
pub struct AppState {
    /// The reasoning agent, shared by all requests
    pub agent: Arc<Agent>,

    /// LLM provider (Ollama, or a mock in tests)
    pub provider: Arc<dyn LlmProvider>,

    /// Model chosen at startup
    pub model: ModelRef,
}
