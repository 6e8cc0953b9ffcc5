//! Statement upload handler

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::{AppError, AppState, MAX_UPLOAD_SIZE};
use tally_core::error::Error;
use tally_core::import::parse_csv;
use tally_core::models::PLACEHOLDER_USER;

/// Upload response
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub count: usize,
}

/// POST /uploadfile - Import a CSV statement into an account
///
/// Multipart fields: `file` (the CSV) and `account_id`.
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut account_id: Option<i64> = None;

    // Extract fields from multipart form
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(&format!("Failed to read form field: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                file_name = field.file_name().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|_| AppError::bad_request("Failed to read file data"))?;

                if bytes.len() > MAX_UPLOAD_SIZE {
                    return Err(AppError::bad_request(&format!(
                        "File too large. Maximum size is {} MB",
                        MAX_UPLOAD_SIZE / 1024 / 1024
                    )));
                }

                file_data = Some(bytes.to_vec());
            }
            "account_id" => {
                let value = field
                    .text()
                    .await
                    .map_err(|_| AppError::bad_request("Failed to read account_id"))?;
                account_id = Some(value.trim().parse().map_err(|_| {
                    AppError::bad_request(&format!("Invalid account_id: {}", value))
                })?);
            }
            _ => {}
        }
    }

    // Validate required fields
    let file_data = file_data.ok_or_else(|| AppError::bad_request("Missing file field"))?;
    let account_id = account_id.ok_or_else(|| AppError::bad_request("Missing account_id field"))?;

    import_statement(&state, file_data, account_id, file_name.as_deref())
}

/// Core import logic, separated from multipart parsing
pub fn import_statement(
    state: &AppState,
    file_data: Vec<u8>,
    account_id: i64,
    file_name: Option<&str>,
) -> Result<Json<UploadResponse>, AppError> {
    if state.db.get_account(account_id)?.is_none() {
        return Err(AppError::not_found("Account not found."));
    }

    let parsed = match parse_csv(&file_data, &state.categorizer) {
        Ok(parsed) => parsed,
        Err(e @ Error::MissingColumns { .. }) => {
            warn!(account_id, error = %e, "Statement is missing required columns");
            return Err(AppError::bad_request(&e.to_string()));
        }
        Err(e) => {
            warn!(account_id, error = %e, "Statement could not be read");
            return Err(AppError::bad_request(&format!(
                "Failed to process the CSV file: {}",
                e
            )));
        }
    };

    if parsed.transactions.is_empty() {
        return Err(AppError::bad_request("No records to save."));
    }

    let count = state
        .db
        .insert_transactions(account_id, PLACEHOLDER_USER, &parsed.transactions)?;

    info!(
        account_id,
        count,
        file = file_name.unwrap_or("<unnamed>"),
        realigned = parsed.realigned,
        "Statement imported"
    );

    Ok(Json(UploadResponse {
        message: format!("Successfully uploaded and saved {} transactions.", count),
        count,
    }))
}
