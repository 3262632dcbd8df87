//! Ollama LLM Provider
//!
//! `LlmProvider` over Ollama's HTTP API: `/api/generate` for completions,
//! `/api/tags` for the local model list and `/api/pull` for downloads.

use std::time::Duration;

use agent_core::{
    error::{AgentError, Result},
    provider::{Completion, GenerationOptions, LlmProvider, ModelInfo, TokenUsage},
};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Pulls download whole models; the generation timeout does not apply
const PULL_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Ollama provider configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OllamaConfig {
    /// Ollama base URL, scheme and port included
    pub base_url: String,

    /// HTTP timeout for generation and listing, in seconds
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            timeout_secs: 120,
        }
    }
}

impl OllamaConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read `OLLAMA_HOST` and `MODEL_TIMEOUT_SECS` through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("OLLAMA_HOST")
            .filter(|host| !host.trim().is_empty())
            .map_or_else(|| DEFAULT_BASE_URL.to_string(), |host| normalize_base_url(&host));

        let timeout_secs = match lookup("MODEL_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                AgentError::Config(format!(
                    "MODEL_TIMEOUT_SECS must be a whole number of seconds, got '{raw}'"
                ))
            })?,
            None => 120,
        };

        Ok(Self {
            base_url,
            timeout_secs,
        })
    }
}

/// `localhost:11434/` → `http://localhost:11434`
fn normalize_base_url(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{host}")
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions<'a>,
}

#[derive(Debug, Serialize)]
struct OllamaOptions<'a> {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<&'a [String]>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    model: Option<String>,
    response: String,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

#[derive(Debug, Serialize)]
struct PullRequest<'a> {
    name: &'a str,
    stream: bool,
}

/// Ollama LLM provider
pub struct OllamaProvider {
    client: Client,
    config: OllamaConfig,
}

impl OllamaProvider {
    /// Provider for an explicit base URL with default timeouts
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        Self::from_config(OllamaConfig {
            base_url: normalize_base_url(base_url.as_ref()),
            ..Default::default()
        })
    }

    /// Create from configuration
    pub fn from_config(config: OllamaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_config(OllamaConfig::from_env()?)
    }

    /// Create with default localhost settings
    pub fn localhost() -> Result<Self> {
        Self::from_config(OllamaConfig::default())
    }

    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }

    fn transport_error(&self, e: &reqwest::Error) -> AgentError {
        if e.is_connect() {
            AgentError::ProviderUnavailable(format!(
                "Cannot connect to Ollama at {}. Is it running?",
                self.config.base_url
            ))
        } else if e.is_timeout() {
            AgentError::ProviderUnavailable(format!("Ollama request timed out: {e}"))
        } else {
            AgentError::Provider(e.to_string())
        }
    }

    /// Non-2xx responses become `Provider` errors carrying Ollama's message
    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(AgentError::Provider(format!("Ollama API error ({status}): {body}")))
    }

    async fn get_tags(&self) -> Result<Response> {
        let response = self
            .client
            .get(self.url("/api/tags"))
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        Self::check_status(response).await
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn endpoint(&self) -> &str {
        &self.config.base_url
    }

    async fn health_check(&self) -> Result<bool> {
        match self.get_tags().await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!("Ollama health check failed: {}", e);
                Ok(false)
            }
        }
    }

    async fn complete(&self, prompt: &str, options: &GenerationOptions) -> Result<Completion> {
        let request = GenerateRequest {
            model: &options.model,
            prompt,
            stream: false,
            options: OllamaOptions {
                temperature: options.temperature,
                num_predict: options.max_tokens,
                stop: (!options.stop_sequences.is_empty())
                    .then_some(options.stop_sequences.as_slice()),
            },
        };

        tracing::debug!(
            model = %options.model,
            prompt_len = prompt.len(),
            "Sending generate request"
        );

        let response = self
            .client
            .post(self.url("/api/generate"))
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let body: GenerateResponse = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| AgentError::Provider(format!("invalid generate response: {e}")))?;

        let usage = match (body.prompt_eval_count, body.eval_count) {
            (Some(prompt_tokens), Some(completion_tokens)) => Some(TokenUsage {
                prompt_tokens,
                completion_tokens,
            }),
            _ => None,
        };

        Ok(Completion {
            content: body.response,
            model: body.model.unwrap_or_else(|| options.model.clone()),
            usage,
        })
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let tags: TagsResponse = self
            .get_tags()
            .await?
            .json()
            .await
            .map_err(|e| AgentError::Provider(format!("invalid model list: {e}")))?;

        Ok(tags.models)
    }

    async fn pull_model(&self, name: &str) -> Result<()> {
        tracing::info!(model = name, "Pulling model from Ollama registry");

        let response = self
            .client
            .post(self.url("/api/pull"))
            .timeout(PULL_TIMEOUT)
            .json(&PullRequest { name, stream: false })
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        Self::check_status(response).await?;
        tracing::info!(model = name, "Model pulled");
        Ok(())
    }

    async fn model_catalog(&self) -> Result<serde_json::Value> {
        self.get_tags()
            .await?
            .json()
            .await
            .map_err(|e| AgentError::Provider(format!("invalid model list: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = OllamaConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, OllamaConfig::default());
        assert_eq!(config.base_url, "http://localhost:11434");
        assert_eq!(config.timeout_secs, 120);
    }

    #[test]
    fn test_config_from_lookup() {
        let config = OllamaConfig::from_lookup(lookup(&[
            ("OLLAMA_HOST", "ollama:11434/"),
            ("MODEL_TIMEOUT_SECS", "30"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://ollama:11434");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_config_rejects_bad_timeout() {
        let err = OllamaConfig::from_lookup(lookup(&[("MODEL_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert!(matches!(err, AgentError::Config(_)));
    }

    #[test]
    fn test_generate_request_shape() {
        let stop = vec!["\nObservation".to_string()];
        let request = GenerateRequest {
            model: "llama2",
            prompt: "Question: hi",
            stream: false,
            options: OllamaOptions {
                temperature: 0.5,
                num_predict: None,
                stop: Some(stop.as_slice()),
            },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "llama2");
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["stop"][0], "\nObservation");
        assert!(json["options"].get("num_predict").is_none());
    }

    #[test]
    fn test_tags_response_ignores_extra_fields() {
        let tags: TagsResponse = serde_json::from_str(
            r#"{"models":[{"name":"llama2:latest","size":3826793677,"digest":"abc","details":{}}]}"#,
        )
        .unwrap();
        assert_eq!(tags.models[0].name, "llama2:latest");
        assert_eq!(tags.models[0].size, Some(3_826_793_677));
    }

    #[tokio::test]
    async fn test_unreachable_runtime() {
        let provider = OllamaProvider::new("http://127.0.0.1:1").unwrap();

        assert!(!provider.health_check().await.unwrap());
        let err = provider.list_models().await.unwrap_err();
        assert!(matches!(err, AgentError::ProviderUnavailable(_)));
    }
}
