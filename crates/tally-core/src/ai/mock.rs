//! Mock backend for testing
//!
//! Useful for unit tests and development without a reachable LLM.

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::AIBackend;

/// Mock AI backend for testing
///
/// Answers with a fixed reply (or a summary of the prompt's transaction lines).
/// An unhealthy mock fails every call.
#[derive(Clone, Default)]
pub struct MockBackend {
    /// Whether calls should succeed
    pub healthy: bool,
    /// Fixed reply for `generate`
    pub reply: Option<String>,
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self {
            healthy: true,
            reply: None,
        }
    }

    /// Create an unhealthy mock backend
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            reply: None,
        }
    }

    /// Always answer with `reply`
    pub fn with_reply(reply: &str) -> Self {
        Self {
            healthy: true,
            reply: Some(reply.to_string()),
        }
    }

    /// Create a new instance with a different model (no-op for mock)
    pub fn with_model(&self, _model: &str) -> Self {
        self.clone()
    }
}

#[async_trait]
impl AIBackend for MockBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        if !self.healthy {
            return Err(Error::Ai("mock backend is unavailable".into()));
        }
        if let Some(ref reply) = self.reply {
            return Ok(reply.clone());
        }

        let lines = prompt
            .lines()
            .filter(|l| l.trim_start().starts_with("- Date:"))
            .count();
        Ok(format!("Reviewed {} transactions.", lines))
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        if !self.healthy {
            return Err(Error::Ai("mock backend is unavailable".into()));
        }
        Ok(vec!["mock".to_string()])
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
