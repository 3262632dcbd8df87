//! Mock LLM Provider
//!
//! Scripted replies for tests and offline demos. Replies are served in
//! order; once the script runs out the repeat reply (if any) is used forever.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{AgentError, Result};
use crate::provider::{Completion, GenerationOptions, LlmProvider, ModelInfo};

/// One scripted model reply
#[derive(Clone, Debug)]
pub enum MockReply {
    Text(String),
    Unavailable,
}

impl MockReply {
    fn into_completion(self, model: &str) -> Result<Completion> {
        match self {
            Self::Text(content) => Ok(Completion {
                content,
                model: model.to_string(),
                usage: None,
            }),
            Self::Unavailable => Err(AgentError::ProviderUnavailable(
                "mock runtime is down".into(),
            )),
        }
    }
}

/// Scripted provider
#[derive(Debug, Default)]
pub struct MockProvider {
    script: Mutex<VecDeque<MockReply>>,
    repeat: Option<MockReply>,
    models: Option<Vec<ModelInfo>>,
    pullable: Vec<String>,
    latency: Option<Duration>,
    prompts: Mutex<Vec<String>>,
    pulled: Mutex<Vec<String>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply with these texts in order
    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: Mutex::new(replies.into_iter().map(|r| MockReply::Text(r.into())).collect()),
            ..Self::default()
        }
    }

    /// Every completion fails as if the runtime were down
    pub fn unavailable() -> Self {
        Self::new().repeating(MockReply::Unavailable)
    }

    /// Reply used once the script is exhausted
    pub fn repeating(mut self, reply: MockReply) -> Self {
        self.repeat = Some(reply);
        self
    }

    /// Local model list; without one, listing fails like an unreachable runtime
    pub fn with_models<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.models = Some(names.into_iter().map(ModelInfo::named).collect());
        self
    }

    /// Models the fake registry can serve to `pull_model`
    pub fn with_pullable<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pullable = names.into_iter().map(Into::into).collect();
        self
    }

    /// Sleep before every completion
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Prompts received so far
    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }

    /// Number of completions requested so far
    pub async fn calls(&self) -> usize {
        self.prompts.lock().await.len()
    }

    /// Models pulled so far
    pub async fn pulled(&self) -> Vec<String> {
        self.pulled.lock().await.clone()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn endpoint(&self) -> &str {
        "mock://"
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.models.is_some())
    }

    async fn complete(&self, prompt: &str, options: &GenerationOptions) -> Result<Completion> {
        self.prompts.lock().await.push(prompt.to_string());

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let next = self.script.lock().await.pop_front();
        match next.or_else(|| self.repeat.clone()) {
            Some(reply) => reply.into_completion(&options.model),
            None => Err(AgentError::ProviderUnavailable("mock script exhausted".into())),
        }
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        self.models
            .clone()
            .ok_or_else(|| AgentError::ProviderUnavailable("mock runtime is down".into()))
    }

    async fn pull_model(&self, name: &str) -> Result<()> {
        if !self.pullable.iter().any(|p| p == name) {
            return Err(AgentError::Provider(format!(
                "pull model manifest: file does not exist: {name}"
            )));
        }
        self.pulled.lock().await.push(name.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_script_then_repeat() {
        let provider = MockProvider::with_replies(["one"])
            .repeating(MockReply::Text("again".into()));
        let opts = GenerationOptions::default();

        assert_eq!(provider.complete("p1", &opts).await.unwrap().content, "one");
        assert_eq!(provider.complete("p2", &opts).await.unwrap().content, "again");
        assert_eq!(provider.complete("p3", &opts).await.unwrap().content, "again");
        assert_eq!(provider.prompts().await, vec!["p1", "p2", "p3"]);
    }

    #[tokio::test]
    async fn test_exhausted_script() {
        let provider = MockProvider::with_replies(Vec::<String>::new());
        let err = provider
            .complete("p", &GenerationOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::ProviderUnavailable(_)));
    }

    #[tokio::test]
    async fn test_model_catalog_default() {
        let provider = MockProvider::new().with_models(["llama2:latest"]);
        let catalog = provider.model_catalog().await.unwrap();
        assert_eq!(catalog["models"][0]["name"], "llama2:latest");
    }
}
