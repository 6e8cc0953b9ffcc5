//! LLM backend handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::warn;

use crate::{AppError, AppState};
use tally_core::ai::AIBackend;

#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub backend: &'static str,
    pub host: String,
    /// Model used for questions
    pub model: String,
    pub models: Vec<String>,
}

/// GET /ai/models - Models available on the configured backend
pub async fn list_models(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ModelsResponse>, AppError> {
    let client = state
        .ai
        .as_ref()
        .ok_or_else(|| AppError::unavailable("AI backend not configured"))?;

    let models = client.list_models().await.map_err(|e| {
        warn!(error = %e, backend = client.kind(), "Failed to list models");
        AppError::unavailable("AI backend not reachable")
    })?;

    Ok(Json(ModelsResponse {
        backend: client.kind(),
        host: client.host().to_string(),
        model: client.model().to_string(),
        models,
    }))
}
