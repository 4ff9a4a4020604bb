// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::error::LedgerError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error_type: String,
    pub message: String,
    pub request_id: Option<String>,
    pub details: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone)]
pub enum ApiError {
    NotFound(String),
    InvalidRequest(String),
    ValidationError { field: String, message: String },
    Unauthorized(String),
    Ledger(LedgerError),
    InternalError(String),
}

impl ApiError {
    pub fn to_response(&self, request_id: Option<String>) -> ErrorResponse {
        let (error_type, message, details) = match self {
            ApiError::NotFound(msg) => ("not_found".to_string(), msg.clone(), None),
            ApiError::InvalidRequest(msg) => ("invalid_request".to_string(), msg.clone(), None),
            ApiError::ValidationError { field, message } => {
                let mut details = HashMap::new();
                details.insert(
                    "field".to_string(),
                    serde_json::Value::String(field.clone()),
                );
                ("validation_error".to_string(), message.clone(), Some(details))
            }
            ApiError::Unauthorized(msg) => ("unauthorized".to_string(), msg.clone(), None),
            ApiError::Ledger(err) if err.is_internal() => (
                "internal_error".to_string(),
                "The request could not be processed".to_string(),
                None,
            ),
            ApiError::Ledger(err) => (err.kind().to_string(), err.to_string(), ledger_details(err)),
            ApiError::InternalError(_) => (
                "internal_error".to_string(),
                "The request could not be processed".to_string(),
                None,
            ),
        };

        ErrorResponse {
            error_type,
            message,
            request_id,
            details,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::NotFound(_) => 404,
            ApiError::InvalidRequest(_) | ApiError::ValidationError { .. } => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Ledger(err) => ledger_status(err),
            ApiError::InternalError(_) => 500,
        }
    }
}

fn ledger_status(err: &LedgerError) -> u16 {
    match err {
        LedgerError::NotFound { .. } => 404,
        LedgerError::NotPending { .. }
        | LedgerError::WithdrawnLocked { .. }
        | LedgerError::PendingBonusWithdrawal { .. }
        | LedgerError::DuplicateSupplier(_) => 409,
        LedgerError::Store(_) => 500,
        _ => 400,
    }
}

fn ledger_details(err: &LedgerError) -> Option<HashMap<String, serde_json::Value>> {
    let mut details = HashMap::new();
    match err {
        LedgerError::WithdrawnLocked { submission_id } => {
            details.insert("submission_id".to_string(), submission_id.to_string().into());
        }
        LedgerError::NotPending { id, status } => {
            details.insert("id".to_string(), id.to_string().into());
            details.insert("status".to_string(), status.clone().into());
        }
        LedgerError::InvalidInput { field, .. } => {
            details.insert("field".to_string(), field.clone().into());
        }
        LedgerError::BelowThreshold { amount, threshold } => {
            details.insert("amount".to_string(), (*amount).into());
            details.insert("threshold".to_string(), (*threshold).into());
        }
        _ => return None,
    }
    Some(details)
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ApiError::ValidationError { field, message } => {
                write!(f, "Validation error for {}: {}", field, message)
            }
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Ledger(err) => write!(f, "{}", err),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        ApiError::Ledger(err)
    }
}

/// Axum response wrapper for [`ApiError`].
pub struct ApiErrorResponse(pub ApiError);

impl From<ApiError> for ApiErrorResponse {
    fn from(err: ApiError) -> Self {
        ApiErrorResponse(err)
    }
}

impl From<LedgerError> for ApiErrorResponse {
    fn from(err: LedgerError) -> Self {
        ApiErrorResponse(ApiError::Ledger(err))
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        }
        let request_id = uuid::Uuid::new_v4().to_string();
        (status, Json(self.0.to_response(Some(request_id)))).into_response()
    }
}
