//! # agent-core
//!
//! Core agent logic: a ReAct reasoning loop over a provider-agnostic model
//! runtime and a registry of single-input tools.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Agent                                │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────┐  │
//! │  │  Reasoning  │  │    Tools    │  │   LlmProvider       │  │
//! │  │    Loop     │──│   Registry  │──│   (Strategy)        │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────┘  │
//! │     │      ▲                                                │
//! │     ▼      │                                                │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────┐   │
//! │  │ PromptBuilder│  │ Reply parser │  │ Fallback summary │   │
//! │  └──────────────┘  └──────────────┘  └──────────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `LlmProvider` trait keeps the loop independent of the runtime, and
//! [`mock::MockProvider`] scripts it for tests.

pub mod error;
pub mod mock;
pub mod parser;
pub mod prompt;
pub mod provider;
pub mod reasoning;
pub mod summary;
pub mod tool;
pub mod transcript;

pub use error::{AgentError, CHAT_APOLOGY, Result};
pub use parser::{ParsedReply, parse_reply};
pub use prompt::PromptBuilder;
pub use provider::{LlmProvider, ModelInfo, ModelRef};
pub use reasoning::{Agent, AgentBuilder, AgentConfig, AgentResult, RunStatus, StopReason};
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult, ToolSchema};
pub use transcript::{AgentAction, AgentStep, Transcript};
