//! Liveness endpoints

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;
use tally_core::ai::AIBackend;

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub ai_available: bool,
}

/// GET / - Greeting
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Hello from the Tally backend!",
    })
}

/// GET /health - Server status and LLM reachability
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let ai_available = match state.ai {
        Some(ref client) => client.health_check().await,
        None => false,
    };

    Json(HealthResponse {
        status: "ok",
        ai_available,
    })
}
