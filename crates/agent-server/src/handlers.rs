//! HTTP Handlers

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::Instrument;

use agent_core::{AgentResult, CHAT_APOLOGY};

use crate::state::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    /// A missing field is treated as an empty question
    #[serde(default)]
    pub input: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

impl ChatResponse {
    fn apology() -> Json<Self> {
        Json(Self {
            response: CHAT_APOLOGY.into(),
        })
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub model: String,
    pub runtime_connected: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let runtime_connected = state.provider.health_check().await.unwrap_or(false);

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        model: state.model.model.clone(),
        runtime_connected,
    })
}

/// Answer one question with the agent
///
/// Every failure surfaces as the same apology; the cause is only logged.
pub async fn chat_handler(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> (StatusCode, Json<ChatResponse>) {
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("chat", %request_id);

    async move {
        let Json(request) = match payload {
            Ok(request) => request,
            Err(rejection) => {
                tracing::warn!(error = %rejection, "Rejected chat request body");
                return (StatusCode::BAD_REQUEST, ChatResponse::apology());
            }
        };

        tracing::info!(input = %request.input, "Chat request");

        match state.agent.run(&request.input).await {
            Ok(result) => {
                log_steps(&result);
                (
                    StatusCode::OK,
                    Json(ChatResponse {
                        response: result.final_answer,
                    }),
                )
            }
            Err(e) => {
                if e.is_model_failure() {
                    tracing::error!(model = %state.model.model, "Model runtime failed: {}", e);
                } else {
                    tracing::error!("Agent error: {}", e);
                }
                (StatusCode::INTERNAL_SERVER_ERROR, ChatResponse::apology())
            }
        }
    }
    .instrument(span)
    .await
}

fn log_steps(result: &AgentResult) {
    for (i, step) in result.steps.iter().enumerate() {
        tracing::info!(
            step = i + 1,
            thought = step.action.thought.as_deref().unwrap_or_default(),
            tool = %step.action.tool,
            input = %step.action.input,
            observation = %step.observation,
            "Reasoning step"
        );
    }

    tracing::info!(
        steps = result.steps.len(),
        status = ?result.status,
        "Chat answered"
    );
}

/// Runtime's model listing, passed through as-is
///
/// Errors are reported in the body with a 200 status.
pub async fn list_models(State(state): State<AppState>) -> Json<serde_json::Value> {
    match state.provider.model_catalog().await {
        Ok(catalog) => Json(catalog),
        Err(e) => {
            tracing::warn!("Model listing failed: {}", e);
            Json(serde_json::json!({ "error": e.to_string() }))
        }
    }
}
