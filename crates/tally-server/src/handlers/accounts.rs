//! Account management handlers

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::PathRejection, Path, State},
    Json,
};
use serde::Deserialize;
use tracing::info;

use super::{parse_body, path_param};
use crate::{AppError, AppState, SuccessResponse};
use tally_core::models::{Account, PLACEHOLDER_USER};

/// Request body for creating or updating an account
#[derive(Debug, Deserialize)]
pub struct AccountRequest {
    pub account_name: String,
    pub account_type: String,
}

impl AccountRequest {
    fn validate(&self) -> Result<(), AppError> {
        if self.account_name.trim().is_empty() {
            return Err(AppError::bad_request("account_name must not be empty"));
        }
        if self.account_type.trim().is_empty() {
            return Err(AppError::bad_request("account_type must not be empty"));
        }
        Ok(())
    }
}

/// GET /accounts - List the user's accounts
pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Account>>, AppError> {
    let accounts = state.db.list_accounts(PLACEHOLDER_USER)?;
    Ok(Json(accounts))
}

/// POST /accounts - Create a new account
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<SuccessResponse>, AppError> {
    let req: AccountRequest = parse_body(&body)?;
    req.validate()?;

    let id = state.db.create_account(
        req.account_name.trim(),
        req.account_type.trim(),
        PLACEHOLDER_USER,
    )?;
    info!(account_id = id, name = %req.account_name, "Account created");

    Ok(Json(SuccessResponse::with_id(
        "Account created successfully.",
        id,
    )))
}

/// GET /accounts/:id - Get a single account
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Account>, AppError> {
    let id = path_param(path)?;
    let account = state
        .db
        .get_account(id)?
        .ok_or_else(|| AppError::not_found("Account not found."))?;

    Ok(Json(account))
}

/// PATCH /accounts/:id - Rename or retype an account
pub async fn update_account(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
    body: Bytes,
) -> Result<Json<SuccessResponse>, AppError> {
    let id = path_param(path)?;
    let req: AccountRequest = parse_body(&body)?;
    req.validate()?;

    if !state
        .db
        .update_account(id, req.account_name.trim(), req.account_type.trim())?
    {
        return Err(AppError::not_found("Account not found."));
    }
    info!(account_id = id, "Account updated");

    Ok(Json(SuccessResponse::new("Account updated successfully.")))
}

/// DELETE /accounts/:id - Delete an account and its transactions
pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<SuccessResponse>, AppError> {
    let id = path_param(path)?;
    let removed = state
        .db
        .delete_account(id)?
        .ok_or_else(|| AppError::not_found("Account not found."))?;
    info!(account_id = id, transactions = removed, "Account deleted");

    Ok(Json(SuccessResponse::new(format!(
        "Account and {} associated transactions deleted successfully.",
        removed
    ))))
}
