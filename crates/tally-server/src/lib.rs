//! Tally Web Server
//!
//! Axum-based REST API for the Tally personal finance tracker.
//!
//! - CORS restricted to the configured frontend origins (credentials allowed)
//! - Upload size limit on request bodies
//! - Request tracing
//! - Sanitized error responses (`{"error": "..."}`)

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};

use tally_core::ai::{AIBackend, AIClient};
use tally_core::categorize::Categorizer;
use tally_core::db::Database;

mod handlers;

/// Maximum request body size (10 MB), which bounds statement uploads
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Frontend origins allowed when `TALLY_CORS_ORIGINS` is unset
pub const DEFAULT_CORS_ORIGINS: &[&str] = &["http://localhost:5173", "http://127.0.0.1:5173"];

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
            cors_origins: cors_origins_from_env(),
        }
    }
}

/// Origins from `TALLY_CORS_ORIGINS` (comma-separated), else the defaults
pub fn cors_origins_from_env() -> Vec<String> {
    match std::env::var("TALLY_CORS_ORIGINS") {
        Ok(value) => parse_origins(&value),
        Err(_) => DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
    }
}

pub(crate) fn parse_origins(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim().trim_end_matches('/'))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub categorizer: Categorizer,
    pub ai: Option<AIClient>,
}

impl AppState {
    /// State with category rules and AI backend taken from the environment
    pub fn from_env(db: Database) -> Self {
        let categorizer = Categorizer::new().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load category rules, using built-in rules");
            Categorizer::default()
        });

        let ai = AIClient::from_env();
        match ai {
            Some(ref client) => info!(
                backend = client.kind(),
                host = client.host(),
                model = client.model(),
                "AI backend configured"
            ),
            None => info!("AI backend not configured (set GOOGLE_API_KEY or OLLAMA_HOST to enable questions)"),
        }

        Self {
            db,
            categorizer,
            ai,
        }
    }
}

/// Generic success payload
#[derive(Serialize)]
pub struct SuccessResponse {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

impl SuccessResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "success",
            message: message.into(),
            id: None,
        }
    }

    pub fn with_id(message: impl Into<String>, id: i64) -> Self {
        Self {
            status: "success",
            message: message.into(),
            id: Some(id),
        }
    }
}

/// Create the application router from environment configuration
pub fn create_router(db: Database, config: &ServerConfig) -> Router {
    create_router_with_state(Arc::new(AppState::from_env(db)), config)
}

/// Create the application router around prepared state (for testing)
pub fn create_router_with_state(state: Arc<AppState>, config: &ServerConfig) -> Router {
    let routes = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        // Accounts
        .route(
            "/accounts",
            get(handlers::list_accounts).post(handlers::create_account),
        )
        .route(
            "/accounts/:id",
            get(handlers::get_account)
                .patch(handlers::update_account)
                .delete(handlers::delete_account),
        )
        // Transactions
        .route("/transactions", get(handlers::list_transactions))
        .route("/transactions/review", get(handlers::list_review_transactions))
        .route("/transactions/:id", patch(handlers::update_transaction_category))
        .route("/categories", get(handlers::list_categories))
        // Statement upload
        .route("/uploadfile", post(handlers::upload_file))
        // Analytics
        .route("/analytics/summary/:account_id", get(handlers::summary))
        .route(
            "/analytics/spending_by_category/:account_id",
            get(handlers::spending_by_category),
        )
        .route(
            "/analytics/subscriptions/:account_id",
            get(handlers::subscriptions),
        )
        .route("/analytics/query/:account_id", post(handlers::query))
        // LLM
        .route("/ai/models", get(handlers::list_models));

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    // Credentialed CORS can't use wildcards, so methods and headers are mirrored
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    routes
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Start the server
pub async fn serve(db: Database, config: ServerConfig) -> anyhow::Result<()> {
    let state = Arc::new(AppState::from_env(db));
    check_ai_connection(state.ai.as_ref()).await;

    let app = create_router_with_state(state, &config);
    let addr = format!("{}:{}", config.host, config.port);

    info!(origins = ?config.cors_origins, "Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Check and log AI backend connection status
async fn check_ai_connection(ai: Option<&AIClient>) {
    let Some(client) = ai else {
        return;
    };

    if client.health_check().await {
        info!(
            "AI backend connected: {} (model: {})",
            client.host(),
            client.model()
        );
    } else {
        warn!(
            "AI backend configured but not responding: {} (model: {})",
            client.host(),
            client.model()
        );
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn unavailable(msg: &str) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}
