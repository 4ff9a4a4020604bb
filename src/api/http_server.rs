// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::auth::{OPERATOR_HEADER, SUPPLIER_HEADER};
use super::handlers::*;
use crate::backoffice::Backoffice;
use crate::config::{AppConfig, ServerConfig};
use crate::notify::RecordingNotifier;

pub struct AppState {
    pub backoffice: Backoffice,
    pub config: ServerConfig,
    /// Supplier notifications, served on `/v1/me/notifications`.
    pub inbox: RecordingNotifier,
}

impl AppState {
    pub fn new(backoffice: Backoffice, config: ServerConfig, inbox: RecordingNotifier) -> Self {
        Self {
            backoffice,
            config,
            inbox,
        }
    }

    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let inbox = RecordingNotifier::new();
        let backoffice = Backoffice::from_config(config, Arc::new(inbox.clone())).await?;
        Ok(Self::new(backoffice, config.server.clone(), inbox))
    }

    /// In-memory state for tests and local runs.
    pub fn in_memory(config: ServerConfig) -> anyhow::Result<Self> {
        let inbox = RecordingNotifier::new();
        let backoffice = Backoffice::in_memory(Arc::new(inbox.clone()))?;
        Ok(Self::new(backoffice, config, inbox))
    }
}

pub fn create_app(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        // Operator: submissions
        .route("/v1/submissions", get(list_submissions))
        .route("/v1/submissions/bulk-entry", post(bulk_entry))
        .route("/v1/submissions/bulk-status", patch(bulk_status_by_ids))
        .route(
            "/v1/submissions/bulk-status-by-email",
            patch(bulk_status_by_emails),
        )
        .route("/v1/submissions/:id/status", patch(update_submission_status))
        // Operator: withdrawals
        .route("/v1/withdrawals", get(list_withdrawals))
        .route("/v1/withdrawals/:id/resolve", patch(resolve_withdrawal))
        .route("/v1/bonus-withdrawals", get(list_bonus_withdrawals))
        .route(
            "/v1/bonus-withdrawals/:id/resolve",
            patch(resolve_bonus_withdrawal),
        )
        // Operator: administration
        .route("/v1/stats", get(get_stats))
        .route("/v1/settings", get(get_settings).put(update_settings))
        .route("/v1/suppliers", get(list_suppliers).post(register_supplier))
        // Supplier
        .route("/v1/me/balance", get(my_balance))
        .route("/v1/me/submissions", get(my_submissions))
        .route("/v1/me/payout-methods", post(add_payout_method))
        .route("/v1/me/withdrawals", post(request_withdrawal))
        .route("/v1/me/bonus-withdrawals", post(request_bonus_withdrawal))
        .route("/v1/me/bonuses", get(my_bonuses))
        .route("/v1/me/notifications", get(my_notifications))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(SUPPLIER_HEADER),
            HeaderName::from_static(OPERATOR_HEADER),
        ]);

    if config.cors_allowed_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}

pub async fn start_server(state: AppState) -> anyhow::Result<()> {
    let addr = state.config.listen_addr;
    let app = create_app(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Ledger API listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown signal received");
            }
        })
        .await?;

    Ok(())
}
