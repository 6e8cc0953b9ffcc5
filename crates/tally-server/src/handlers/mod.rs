//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod accounts;
pub mod ai;
pub mod analytics;
pub mod status;
pub mod transactions;
pub mod upload;

// Re-export all handlers for use in router
pub use accounts::*;
pub use ai::*;
pub use analytics::*;
pub use status::*;
pub use transactions::*;
pub use upload::*;

use axum::extract::{
    rejection::{PathRejection, QueryRejection},
    Path, Query,
};

use crate::AppError;

/// Parse a JSON request body, mapping failures to 400
pub(crate) fn parse_body<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, AppError> {
    serde_json::from_slice(bytes).map_err(|e| AppError::bad_request(&format!("Invalid JSON: {}", e)))
}

/// Unwrap a path extraction, mapping failures to 400
pub(crate) fn path_param<T>(path: Result<Path<T>, PathRejection>) -> Result<T, AppError> {
    path.map(|Path(value)| value)
        .map_err(|e| AppError::bad_request(&format!("Invalid path parameter: {}", e.body_text())))
}

/// Unwrap a query-string extraction, mapping failures to 400
pub(crate) fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    query
        .map(|Query(value)| value)
        .map_err(|e| AppError::bad_request(&format!("Invalid query string: {}", e.body_text())))
}
