//! # agent-runtime
//!
//! Model runtime integrations for the ReAct agent.
//!
//! ## Providers
//!
//! - **Ollama** (default feature): local inference over Ollama's HTTP API
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_runtime::{OllamaProvider, ModelSelection, resolve_model};
//!
//! let provider = Arc::new(OllamaProvider::from_env()?);
//! let model = resolve_model(provider.as_ref(), &ModelSelection::default()).await;
//! let agent = AgentBuilder::new()
//!     .provider(provider)
//!     .model(&model)
//!     .build()?;
//! ```

#[cfg(feature = "ollama")]
pub mod ollama;
pub mod select;

#[cfg(feature = "ollama")]
pub use ollama::{OllamaConfig, OllamaProvider};
pub use select::{ModelSelection, resolve_model};

// Re-export core types for convenience
pub use agent_core::{Agent, AgentError, LlmProvider, ModelRef, Result, Tool, ToolRegistry};
