//! ReAct Agent HTTP Server
//!
//! Axum server exposing the reasoning agent over a small JSON API, plus
//! the chat page from the static directory.

mod config;
mod handlers;
mod router;
mod state;

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_core::{AgentBuilder, LlmProvider};
use agent_runtime::{OllamaProvider, resolve_model};

use crate::config::AppConfig;
use crate::router::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    // Initialize LLM provider
    let provider = Arc::new(OllamaProvider::from_config(config.ollama.clone())?);

    // Verify Ollama connection
    match provider.health_check().await {
        Ok(true) => tracing::info!("✓ Connected to Ollama at {}", config.ollama.base_url),
        Ok(false) | Err(_) => {
            tracing::warn!("⚠ Ollama not available at {}", config.ollama.base_url);
            tracing::warn!("  Make sure Ollama is running: ollama serve");
        }
    }

    let model = resolve_model(provider.as_ref(), &config.models).await;
    tracing::info!("Model: {} (temperature {})", model.model, model.temperature);

    // Initialize tools
    let tools = lab_tools::default_registry()?;
    tracing::info!("Registered {} tools:", tools.len());
    for name in tools.names() {
        tracing::info!("  • {}", name);
    }

    let provider: Arc<dyn LlmProvider> = provider;
    let agent = AgentBuilder::new()
        .provider(provider.clone())
        .tools(Arc::new(tools))
        .model(&model)
        .max_iterations(config.max_iterations)
        .call_timeout(config.model_timeout)
        .request_timeout(config.request_timeout)
        .build()?;

    // Build application state
    let state = AppState {
        agent: Arc::new(agent),
        provider,
        model,
    };

    let app = build_router(state, &config.static_dir);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 ReAct agent running on http://{}", config.bind_addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /        - Chat page ({})", config.static_dir.display());
    tracing::info!("  GET  /health  - Health check");
    tracing::info!("  GET  /models  - Models installed in the runtime");
    tracing::info!("  POST /chat    - Ask the agent");

    axum::serve(listener, app).await?;

    Ok(())
}
