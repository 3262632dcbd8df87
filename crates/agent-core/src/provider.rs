//! LLM Provider Strategy Pattern
//!
//! Defines the interface to the external model runtime: a text-completion
//! endpoint, a model listing and a model pull. The agent works exclusively
//! through this trait, so the runtime can be swapped or scripted in tests.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_core::provider::{GenerationOptions, LlmProvider};
//!
//! let provider = OllamaProvider::from_env();
//! let completion = provider.complete("Question: ...", &options).await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Which model to talk to, chosen once at startup
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelRef {
    /// Base URL of the model runtime
    pub endpoint: String,

    /// Model identifier (e.g., "llama2", "phi")
    pub model: String,

    /// Temperature for sampling (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl ModelRef {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: model.into(),
            temperature,
        }
    }
}

/// Configuration for a single generation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Model identifier
    pub model: String,

    /// Temperature for sampling
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate (runtime default when unset)
    #[serde(default)]
    pub max_tokens: Option<u32>,

    /// Stop sequences
    #[serde(default)]
    pub stop_sequences: Vec<String>,
}

const fn default_temperature() -> f32 {
    0.7
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model: "llama2".into(),
            temperature: default_temperature(),
            max_tokens: None,
            stop_sequences: Vec::new(),
        }
    }
}

impl From<&ModelRef> for GenerationOptions {
    fn from(model: &ModelRef) -> Self {
        Self {
            model: model.model.clone(),
            temperature: model.temperature,
            ..Default::default()
        }
    }
}

/// Response from an LLM completion
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Completion {
    /// The generated text
    pub content: String,

    /// Model that generated this response
    pub model: String,

    /// Token usage statistics (if available)
    pub usage: Option<TokenUsage>,
}

/// Token usage statistics
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// Information about a locally available model
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl ModelInfo {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: None,
        }
    }

    /// `llama2` matches both `llama2` and the implicit `llama2:latest` tag
    pub fn matches(&self, requested: &str) -> bool {
        self.name == requested
            || (!requested.contains(':')
                && self
                    .name
                    .strip_prefix(requested)
                    .is_some_and(|tag| tag == ":latest"))
    }
}

/// Strategy trait for LLM providers
///
/// Implement this trait to add support for new model runtimes.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Base URL (or other locator) of the runtime
    fn endpoint(&self) -> &str;

    /// Check if the provider is reachable
    async fn health_check(&self) -> Result<bool>;

    /// Generate a completion for a single prompt
    async fn complete(&self, prompt: &str, options: &GenerationOptions) -> Result<Completion>;

    /// List locally available models
    async fn list_models(&self) -> Result<Vec<ModelInfo>>;

    /// Download a model into the runtime
    async fn pull_model(&self, name: &str) -> Result<()>;

    /// Runtime's own model listing, passed through untouched
    async fn model_catalog(&self) -> Result<serde_json::Value> {
        let models = self.list_models().await?;
        Ok(serde_json::json!({ "models": models }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_options_from_model_ref() {
        let model = ModelRef::new("http://localhost:11434", "phi", 0.2);
        let opts = GenerationOptions::from(&model);
        assert_eq!(opts.model, "phi");
        assert!((opts.temperature - 0.2).abs() < f32::EPSILON);
        assert!(opts.stop_sequences.is_empty());
    }

    #[test]
    fn test_model_matching() {
        let latest = ModelInfo::named("llama2:latest");
        assert!(latest.matches("llama2"));
        assert!(latest.matches("llama2:latest"));
        assert!(!latest.matches("llama2:13b"));
        assert!(!latest.matches("llama"));

        let tagged = ModelInfo::named("llama2:13b");
        assert!(tagged.matches("llama2:13b"));
        assert!(!tagged.matches("llama2"));
    }
}
