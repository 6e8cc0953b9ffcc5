//! Analytics handlers: totals, category breakdown, subscriptions, questions

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::PathRejection, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::{parse_body, path_param};
use crate::{AppError, AppState};
use tally_core::assistant::Assistant;
use tally_core::models::{CategorySpending, Subscription, Summary, PLACEHOLDER_USER};

/// Request body for a natural-language question
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub answer: String,
}

/// GET /analytics/summary/:account_id
pub async fn summary(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Summary>, AppError> {
    let account_id = path_param(path)?;
    Ok(Json(state.db.summary(account_id, PLACEHOLDER_USER)?))
}

/// GET /analytics/spending_by_category/:account_id
pub async fn spending_by_category(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<CategorySpending>>, AppError> {
    let account_id = path_param(path)?;
    Ok(Json(
        state
            .db
            .spending_by_category(account_id, PLACEHOLDER_USER)?,
    ))
}

/// GET /analytics/subscriptions/:account_id
pub async fn subscriptions(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<Subscription>>, AppError> {
    let account_id = path_param(path)?;
    Ok(Json(state.db.subscriptions(account_id, PLACEHOLDER_USER)?))
}

/// POST /analytics/query/:account_id - Ask a question about an account
///
/// Model failures come back as a normal answer, never as an HTTP error.
pub async fn query(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
    body: Bytes,
) -> Result<Json<QueryResponse>, AppError> {
    let account_id = path_param(path)?;
    let req: QueryRequest = parse_body(&body)?;
    if req.query.trim().is_empty() {
        return Err(AppError::bad_request("query must not be empty"));
    }

    let answer = Assistant::new(&state.db, state.ai.as_ref())
        .answer(account_id, &req.query)
        .await?;

    Ok(Json(QueryResponse { answer }))
}
