//! Startup Model Selection
//!
//! Decides once, before serving, which model the agent talks to. The
//! outcome is an immutable [`ModelRef`]; nothing switches models later.

use agent_core::{LlmProvider, ModelInfo, ModelRef};

/// Models to choose between
#[derive(Clone, Debug)]
pub struct ModelSelection {
    pub primary: String,
    pub fallback: String,
    /// Try `pull_model` for a missing model before giving up on it
    pub auto_pull: bool,
    pub temperature: f32,
}

impl Default for ModelSelection {
    fn default() -> Self {
        Self {
            primary: "llama2".into(),
            fallback: "phi".into(),
            auto_pull: false,
            temperature: 0.7,
        }
    }
}

/// Pick the model to serve with
///
/// Order: primary if installed, primary after a pull, fallback if
/// installed, fallback after a pull. An unreachable runtime keeps the
/// primary so the server can still start.
pub async fn resolve_model(provider: &dyn LlmProvider, selection: &ModelSelection) -> ModelRef {
    let chosen = |model: &str| ModelRef::new(provider.endpoint(), model, selection.temperature);

    let installed = match provider.list_models().await {
        Ok(models) => models,
        Err(e) => {
            tracing::warn!(
                model = %selection.primary,
                error = %e,
                "Model runtime unreachable, keeping primary model"
            );
            return chosen(&selection.primary);
        }
    };

    if is_installed(&installed, &selection.primary)
        || try_pull(provider, selection, &selection.primary).await
    {
        tracing::info!(model = %selection.primary, "Using primary model");
        return chosen(&selection.primary);
    }

    if is_installed(&installed, &selection.fallback)
        || try_pull(provider, selection, &selection.fallback).await
    {
        tracing::warn!(
            primary = %selection.primary,
            fallback = %selection.fallback,
            "Primary model not available, falling back"
        );
        return chosen(&selection.fallback);
    }

    tracing::warn!(
        primary = %selection.primary,
        fallback = %selection.fallback,
        "Neither model is installed; requests will fail until one is pulled"
    );
    chosen(&selection.primary)
}

fn is_installed(installed: &[ModelInfo], name: &str) -> bool {
    installed.iter().any(|m| m.matches(name))
}

async fn try_pull(provider: &dyn LlmProvider, selection: &ModelSelection, name: &str) -> bool {
    if !selection.auto_pull {
        return false;
    }

    match provider.pull_model(name).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(model = name, error = %e, "Model pull failed");
            false
        }
    }
}
