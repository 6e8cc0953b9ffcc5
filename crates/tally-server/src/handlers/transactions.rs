//! Transaction listing and category correction handlers

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::Deserialize;
use tracing::info;

use super::{parse_body, path_param, query_params};
use crate::{AppError, AppState, SuccessResponse};
use tally_core::models::{Transaction, PLACEHOLDER_USER};

/// Query parameters for transaction listings
#[derive(Debug, Deserialize)]
pub struct TransactionQuery {
    pub account_id: Option<i64>,
}

/// Request body for a category correction
#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    pub category: String,
}

/// GET /transactions - List transactions, optionally for one account
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    query: Result<Query<TransactionQuery>, QueryRejection>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    let params = query_params(query)?;
    let transactions = state
        .db
        .list_transactions(PLACEHOLDER_USER, params.account_id)?;
    Ok(Json(transactions))
}

/// GET /transactions/review - Transactions whose category needs a human look
pub async fn list_review_transactions(
    State(state): State<Arc<AppState>>,
    query: Result<Query<TransactionQuery>, QueryRejection>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    let params = query_params(query)?;
    let transactions = state
        .db
        .list_review_transactions(PLACEHOLDER_USER, params.account_id)?;
    Ok(Json(transactions))
}

/// PATCH /transactions/:id - Set a transaction's category
pub async fn update_transaction_category(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
    body: Bytes,
) -> Result<Json<SuccessResponse>, AppError> {
    let id = path_param(path)?;
    let req: UpdateCategoryRequest = parse_body(&body)?;
    let category = req.category.trim();
    if category.is_empty() {
        return Err(AppError::bad_request("category must not be empty"));
    }

    if !state.db.update_transaction_category(id, category)? {
        return Err(AppError::not_found("Transaction not found."));
    }
    info!(transaction_id = id, category = %category, "Category corrected");

    Ok(Json(SuccessResponse::new("Transaction category updated.")))
}

/// GET /categories - Categories the rule table can assign
pub async fn list_categories(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.categorizer.categories())
}
