//! Tally Core Library
//!
//! Shared functionality for the Tally personal finance tracker:
//! - Database access and migrations
//! - Bank statement CSV import with heuristic column mapping
//! - Rule-based transaction categorization
//! - Subscription detection
//! - Pluggable LLM backends (Gemini, Ollama, OpenAI-compatible)
//! - Natural-language questions over an account's transactions

pub mod ai;
pub mod assistant;
pub mod categorize;
pub mod db;
pub mod detect;
pub mod error;
pub mod import;
pub mod models;

/// Test utilities including a stub LLM server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{
    AIBackend, AIClient, GeminiBackend, MockBackend, OllamaBackend, OpenAICompatibleBackend,
};
pub use assistant::Assistant;
pub use categorize::{extract_upi_merchant, Categorization, Categorizer};
pub use db::Database;
pub use detect::{detect_subscriptions, DetectionConfig};
pub use error::{Error, Result};
pub use import::{parse_csv, parse_csv_file, ColumnMapping, ParsedUpload};
pub use models::*;
