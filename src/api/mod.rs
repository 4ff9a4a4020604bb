// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod auth;
pub mod errors;
pub mod handlers;
pub mod http_server;

pub use auth::{OperatorAuth, SupplierIdentity, OPERATOR_HEADER, SUPPLIER_HEADER};
pub use errors::{ApiError, ApiErrorResponse, ErrorResponse};
pub use handlers::ActionResponse;
pub use http_server::{create_app, start_server, AppState};
