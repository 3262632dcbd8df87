//! Reasoning Loop
//!
//! Implements the ReAct (Reason + Act) pattern as an explicit state machine:
//!
//! ```text
//! AwaitModel ──▶ ParseReply ──▶ DispatchTool ──▶ AwaitModel ...
//!                    │                │
//!                    ▼                ▼
//!                Finished          Stopped (iteration / time / parse limit)
//! ```
//!
//! Tool and parse failures are written back into the transcript so the model
//! can correct itself. Only model-runtime failures escape as errors.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::error::{AgentError, Result};
use crate::parser::{ParsedReply, correction_hint, parse_reply};
use crate::prompt::PromptBuilder;
use crate::provider::{GenerationOptions, LlmProvider, ModelRef};
use crate::summary::compose_fallback;
use crate::tool::{ToolCall, ToolRegistry};
use crate::transcript::{AgentAction, AgentStep, Transcript};

/// Stop sequence keeping the model from inventing its own observations
pub const OBSERVATION_STOP: &str = "\nObservation";

/// Stand-in deadline when `request_timeout` runs past what `Instant` can hold
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Agent configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// Maximum tool dispatches per question
    pub max_iterations: usize,

    /// Consecutive unparseable replies tolerated before giving up
    pub max_parse_retries: usize,

    /// Generation options
    pub generation: GenerationOptions,

    /// Upper bound for a single model call
    pub call_timeout: Duration,

    /// Upper bound for the whole reasoning run
    pub request_timeout: Duration,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: 5,
            max_parse_retries: 1,
            generation: GenerationOptions {
                stop_sequences: vec![OBSERVATION_STOP.into()],
                ..Default::default()
            },
            call_timeout: Duration::from_secs(120),
            request_timeout: Duration::from_secs(300),
        }
    }
}

/// Why a run ended without a final answer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    IterationLimit,
    TimeLimit,
    ParseFailure,
}

/// How a run ended
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Finished,
    Stopped(StopReason),
}

/// Outcome of one question
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentResult {
    /// The model's final answer, or the fallback summary after a forced stop
    pub final_answer: String,

    /// Dispatched actions and their observations, in order
    pub steps: Vec<AgentStep>,

    pub status: RunStatus,
}

impl AgentResult {
    pub const fn is_forced_stop(&self) -> bool {
        matches!(self.status, RunStatus::Stopped(_))
    }
}

enum LoopState {
    AwaitModel,
    ParseReply(String),
    DispatchTool(AgentAction),
    Finished(String),
    Stopped(StopReason),
}

/// The main Agent struct
///
/// Immutable after construction and shared by all requests; every call to
/// [`Agent::run`] works on its own transcript.
pub struct Agent {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    prompt: PromptBuilder,
    config: AgentConfig,
}

impl Agent {
    /// Create a new agent
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        config: AgentConfig,
    ) -> Self {
        let prompt = PromptBuilder::new(&tools).with_max_iterations(config.max_iterations);
        Self {
            provider,
            tools,
            prompt,
            config,
        }
    }

    /// Create with default configuration
    pub fn with_defaults(provider: Arc<dyn LlmProvider>, tools: Arc<ToolRegistry>) -> Self {
        Self::new(provider, tools, AgentConfig::default())
    }

    /// Answer a question
    pub async fn run(&self, question: &str) -> Result<AgentResult> {
        let started = Instant::now();
        let deadline = started
            .checked_add(self.config.request_timeout)
            .unwrap_or_else(|| started + FAR_FUTURE);
        let mut transcript = Transcript::new(question);
        let mut steps: Vec<AgentStep> = Vec::new();
        let mut parse_failures = 0;
        let mut state = LoopState::AwaitModel;

        loop {
            state = match state {
                LoopState::AwaitModel => {
                    let prompt = self.prompt.render(&transcript);
                    match self.call_model(&prompt, deadline).await? {
                        Some(reply) => LoopState::ParseReply(reply),
                        None => LoopState::Stopped(StopReason::TimeLimit),
                    }
                }

                LoopState::ParseReply(reply) => match parse_reply(&reply) {
                    ParsedReply::FinalAnswer(answer) => LoopState::Finished(answer),
                    ParsedReply::Action(action) => LoopState::DispatchTool(action),
                    ParsedReply::ParseError(raw) => {
                        parse_failures += 1;
                        if parse_failures > self.config.max_parse_retries {
                            LoopState::Stopped(StopReason::ParseFailure)
                        } else {
                            let hint = correction_hint(&raw);
                            tracing::debug!(hint, "Unparseable reply, asking again");
                            transcript.push_correction(&raw, hint);
                            LoopState::AwaitModel
                        }
                    }
                },

                LoopState::DispatchTool(action) => {
                    let observation = self.dispatch(&action).await;
                    parse_failures = 0;

                    transcript.push_action(action.clone(), observation.clone());
                    steps.push(AgentStep {
                        action,
                        observation,
                    });

                    if steps.len() >= self.config.max_iterations {
                        LoopState::Stopped(StopReason::IterationLimit)
                    } else {
                        LoopState::AwaitModel
                    }
                }

                LoopState::Finished(answer) => {
                    tracing::debug!(steps = steps.len(), "Reasoning finished");
                    return Ok(AgentResult {
                        final_answer: answer,
                        steps,
                        status: RunStatus::Finished,
                    });
                }

                LoopState::Stopped(reason) => {
                    tracing::info!(?reason, steps = steps.len(), "Reasoning stopped early");
                    return Ok(AgentResult {
                        final_answer: compose_fallback(&steps),
                        steps,
                        status: RunStatus::Stopped(reason),
                    });
                }
            };
        }
    }

    /// Ask the model, bounded by the per-call timeout and the run deadline
    ///
    /// `Ok(None)` means the run deadline passed.
    async fn call_model(&self, prompt: &str, deadline: Instant) -> Result<Option<String>> {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Ok(None);
        }

        let budget = remaining.min(self.config.call_timeout);
        let call = self.provider.complete(prompt, &self.config.generation);

        match tokio::time::timeout(budget, call).await {
            Ok(completion) => {
                let completion = completion?;
                tracing::debug!(
                    model = %completion.model,
                    reply = %completion.content,
                    "Model replied"
                );
                Ok(Some(completion.content))
            }
            Err(_) if budget < self.config.call_timeout => Ok(None),
            Err(_) => Err(AgentError::ModelTimeout(self.config.call_timeout)),
        }
    }

    /// Run a tool; every outcome becomes observation text
    async fn dispatch(&self, action: &AgentAction) -> String {
        tracing::debug!(tool = %action.tool, input = %action.input, "Executing tool");

        let call = ToolCall::new(&action.tool, &action.input);
        match self.tools.dispatch(&call).await {
            Ok(result) => result.output,
            Err(AgentError::ToolNotFound(name)) => format!(
                "{name} is not a valid tool, try one of [{}].",
                self.prompt.tool_names()
            ),
            Err(e) => format!("Error: {e}"),
        }
    }

    /// Get the tool registry
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Get configuration
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }
}

/// Builder for Agent configuration
pub struct AgentBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    tools: Option<Arc<ToolRegistry>>,
    config: AgentConfig,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            tools: None,
            config: AgentConfig::default(),
        }
    }

    #[must_use]
    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    #[must_use]
    pub fn tools(mut self, tools: Arc<ToolRegistry>) -> Self {
        self.tools = Some(tools);
        self
    }

    /// Use the model and temperature of a resolved model reference
    #[must_use]
    pub fn model(mut self, model: &ModelRef) -> Self {
        self.config.generation.model.clone_from(&model.model);
        self.config.generation.temperature = model.temperature;
        self
    }

    #[must_use]
    pub fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    #[must_use]
    pub fn max_parse_retries(mut self, retries: usize) -> Self {
        self.config.max_parse_retries = retries;
        self
    }

    #[must_use]
    pub fn call_timeout(mut self, timeout: Duration) -> Self {
        self.config.call_timeout = timeout;
        self
    }

    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    pub fn build(self) -> Result<Agent> {
        let provider = self
            .provider
            .ok_or_else(|| AgentError::Config("Provider is required".into()))?;

        if self.config.max_iterations == 0 {
            return Err(AgentError::Config("max_iterations must be at least 1".into()));
        }

        if self.config.call_timeout.is_zero() || self.config.request_timeout.is_zero() {
            return Err(AgentError::Config("timeouts must be greater than zero".into()));
        }

        let tools = self.tools.unwrap_or_default();
        Ok(Agent::new(provider, tools, self.config))
    }
}
