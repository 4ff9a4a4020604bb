// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Header-based identity
//!
//! Authentication happens upstream. The gateway forwards the authenticated
//! supplier in `x-supplier-id`; operator routes carry `x-operator-key`,
//! checked only when `require_operator_key` is set.

use super::errors::{ApiError, ApiErrorResponse};
use super::http_server::AppState;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::sync::Arc;
use uuid::Uuid;

pub const SUPPLIER_HEADER: &str = "x-supplier-id";
pub const OPERATOR_HEADER: &str = "x-operator-key";

/// The authenticated supplier making the request.
#[derive(Debug, Clone, Copy)]
pub struct SupplierIdentity(pub Uuid);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for SupplierIdentity {
    type Rejection = ApiErrorResponse;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(SUPPLIER_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized(format!("missing {} header", SUPPLIER_HEADER)))?;

        let id = Uuid::parse_str(raw.trim())
            .map_err(|_| ApiError::Unauthorized(format!("invalid {} header", SUPPLIER_HEADER)))?;
        Ok(SupplierIdentity(id))
    }
}

/// Marker extractor for operator-only routes.
#[derive(Debug, Clone, Copy)]
pub struct OperatorAuth;

#[async_trait]
impl FromRequestParts<Arc<AppState>> for OperatorAuth {
    type Rejection = ApiErrorResponse;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if !state.config.require_operator_key {
            return Ok(OperatorAuth);
        }

        let key = parts
            .headers
            .get(OPERATOR_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("operator key required".to_string()))?;

        if state.config.operator_api_keys.iter().any(|k| k == key) {
            Ok(OperatorAuth)
        } else {
            Err(ApiError::Unauthorized("invalid operator key".to_string()).into())
        }
    }
}
