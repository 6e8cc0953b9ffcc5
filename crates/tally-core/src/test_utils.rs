//! Test utilities for tally-core
//!
//! A stub LLM server speaking just enough of the Ollama, OpenAI and Gemini
//! wire formats for the HTTP backends to be exercised end to end.

use axum::{
    extract::{Json, Path},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use tokio::sync::oneshot;

/// API key the stub accepts for Gemini and OpenAI routes
pub const MOCK_API_KEY: &str = "test-key";

/// Stub LLM server for tests
pub struct MockLlmServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockLlmServer {
    /// Start the stub server on an available port
    pub async fn start() -> Self {
        let app = Router::new()
            .route("/api/tags", get(ollama_tags))
            .route("/api/generate", post(ollama_generate))
            .route("/v1/models", get(openai_models))
            .route("/v1/chat/completions", post(openai_chat))
            .route("/v1beta/models", get(gemini_models))
            .route("/v1beta/models/:action", post(gemini_generate));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Base URL for this server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockLlmServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Canned answer: how many transaction lines the prompt carried
fn answer_for(prompt: &str) -> String {
    let lines = prompt
        .lines()
        .filter(|l| l.trim_start().starts_with("- Date:"))
        .count();
    format!("Looked at {} transactions.", lines)
}

#[derive(Deserialize)]
struct OllamaGenerate {
    model: String,
    prompt: String,
}

async fn ollama_tags() -> Json<Value> {
    Json(json!({
        "models": [
            {"name": "llama3.2:latest", "size": 2_000_000_000u64},
            {"name": "gemma3:4b", "size": 3_300_000_000u64}
        ]
    }))
}

async fn ollama_generate(Json(request): Json<OllamaGenerate>) -> Json<Value> {
    Json(json!({
        "model": request.model,
        "response": answer_for(&request.prompt),
        "done": true
    }))
}

fn bearer_ok(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", MOCK_API_KEY))
        .unwrap_or(true)
}

async fn openai_models(headers: HeaderMap) -> impl IntoResponse {
    if !bearer_ok(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "bad key"})));
    }
    (
        StatusCode::OK,
        Json(json!({"object": "list", "data": [{"id": "local-model", "object": "model"}]})),
    )
}

#[derive(Deserialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

async fn openai_chat(headers: HeaderMap, Json(request): Json<ChatRequest>) -> impl IntoResponse {
    if !bearer_ok(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "bad key"})));
    }
    let prompt = request
        .messages
        .last()
        .map(|m| m.content.as_str())
        .unwrap_or_default();
    (
        StatusCode::OK,
        Json(json!({
            "model": request.model,
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": answer_for(prompt)},
                "finish_reason": "stop"
            }]
        })),
    )
}

fn gemini_key_ok(headers: &HeaderMap) -> bool {
    headers
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == MOCK_API_KEY)
        .unwrap_or(false)
}

async fn gemini_models(headers: HeaderMap) -> impl IntoResponse {
    if !gemini_key_ok(&headers) {
        return (StatusCode::FORBIDDEN, Json(json!({"error": {"code": 403}})));
    }
    (
        StatusCode::OK,
        Json(json!({
            "models": [
                {"name": "models/gemini-2.5-flash", "supportedGenerationMethods": ["generateContent", "countTokens"]},
                {"name": "models/text-embedding-004", "supportedGenerationMethods": ["embedContent"]}
            ]
        })),
    )
}

/// Handles `models/{model}:generateContent`
async fn gemini_generate(
    Path(action): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    if !gemini_key_ok(&headers) {
        return (StatusCode::FORBIDDEN, Json(json!({"error": {"code": 403}})));
    }
    if !action.ends_with(":generateContent") {
        return (StatusCode::NOT_FOUND, Json(json!({"error": {"code": 404}})));
    }
    let prompt = body["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap_or_default();
    (
        StatusCode::OK,
        Json(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": answer_for(prompt)}]},
                "finishReason": "STOP"
            }]
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{AIBackend, GeminiBackend, OllamaBackend, OpenAICompatibleBackend};

    const PROMPT: &str = "Intro\n- Date: a, Description: x\n- Date: b, Description: y\nQ";

    #[tokio::test]
    async fn test_ollama_backend_against_stub() {
        let server = MockLlmServer::start().await;
        let backend = OllamaBackend::new(&server.url(), "llama3.2");

        assert!(backend.health_check().await);
        assert_eq!(
            backend.list_models().await.unwrap(),
            vec!["llama3.2:latest", "gemma3:4b"]
        );
        assert_eq!(
            backend.generate(PROMPT).await.unwrap(),
            "Looked at 2 transactions."
        );
    }

    #[tokio::test]
    async fn test_openai_backend_against_stub() {
        let server = MockLlmServer::start().await;
        let backend =
            OpenAICompatibleBackend::with_api_key(&server.url(), "local-model", MOCK_API_KEY);

        assert!(backend.health_check().await);
        assert_eq!(backend.list_models().await.unwrap(), vec!["local-model"]);
        assert_eq!(
            backend.generate(PROMPT).await.unwrap(),
            "Looked at 2 transactions."
        );
    }

    #[tokio::test]
    async fn test_openai_backend_bad_key() {
        let server = MockLlmServer::start().await;
        let backend = OpenAICompatibleBackend::with_api_key(&server.url(), "m", "wrong");

        assert!(!backend.health_check().await);
        assert!(backend.generate(PROMPT).await.is_err());
    }

    #[tokio::test]
    async fn test_gemini_backend_against_stub() {
        let server = MockLlmServer::start().await;
        let backend = GeminiBackend::new(&server.url(), "gemini-2.5-flash", MOCK_API_KEY);

        assert!(backend.health_check().await);
        assert_eq!(
            backend.list_models().await.unwrap(),
            vec!["models/gemini-2.5-flash"]
        );
        assert_eq!(
            backend.generate(PROMPT).await.unwrap(),
            "Looked at 2 transactions."
        );
    }

    #[tokio::test]
    async fn test_gemini_backend_rejected_key() {
        let server = MockLlmServer::start().await;
        let backend = GeminiBackend::new(&server.url(), "gemini-2.5-flash", "nope");

        assert!(!backend.health_check().await);
        assert!(backend.generate(PROMPT).await.is_err());
        assert!(backend.list_models().await.is_err());
    }
}
