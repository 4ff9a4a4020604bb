// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use super::auth::{OperatorAuth, SupplierIdentity};
use super::errors::{ApiError, ApiErrorResponse};
use super::http_server::AppState;
use crate::bonus::{Bonus, BonusKind, BonusWithdrawal};
use crate::notify::Notification;
use crate::settings::{SettingKey, SettingsView};
use crate::stats::LedgerStats;
use crate::submissions::{
    BulkEntryOutcome, BulkUpdateSummary, StatusChange, SubmissionFilter, SubmissionStatus,
    SubmissionView,
};
use crate::supplier::{
    PayoutMethod, PayoutMethodOverride, RegistrationOutcome, Supplier, SupplierBalance,
};
use crate::withdrawals::{ResolveAction, Resolution, Withdrawal, WithdrawalFilter, WithdrawalStatus};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

type ApiResult<T> = Result<Json<T>, ApiErrorResponse>;

/// Envelope for operations that report a human-readable outcome.
#[derive(Debug, Serialize, Deserialize)]
pub struct ActionResponse<T> {
    pub message: String,
    pub data: T,
}

impl<T> ActionResponse<T> {
    fn new(message: impl Into<String>, data: T) -> Json<Self> {
        Json(Self {
            message: message.into(),
            data,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
    pub remarks: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BulkStatusByIdsRequest {
    pub ids: Vec<Uuid>,
    pub status: String,
    pub remarks: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BulkStatusByEmailsRequest {
    /// Newline or comma separated addresses.
    pub emails: String,
    pub status: String,
    pub remarks: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BulkEntryRequest {
    pub supplier_id: Uuid,
    pub emails: String,
    pub status: Option<String>,
    pub remarks: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub action: String,
    pub remarks: Option<String>,
    pub proof: Option<String>,
}

impl ResolveRequest {
    fn into_resolution(self) -> Result<Resolution, ApiErrorResponse> {
        let action: ResolveAction = self.action.parse()?;
        Ok(Resolution {
            action,
            remarks: self.remarks,
            proof: self.proof,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct BonusWithdrawalRequest {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub payout: PayoutMethodOverride,
}

#[derive(Debug, Deserialize)]
pub struct RegisterSupplierRequest {
    pub username: String,
    pub refer_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PayoutMethodRequest {
    pub method_type: String,
    pub account_number: String,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct SettingsUpdateRequest {
    pub default_email_reward: Option<i64>,
    pub default_signup_bonus: Option<i64>,
    pub default_referral_bonus: Option<i64>,
    pub referral_withdrawal_threshold: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub supplier_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StatsQuery {
    pub top: Option<usize>,
}

// ---- service ----

pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": crate::version::get_version_info(),
    }))
}

pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    match state.backoffice.metrics.render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => ApiErrorResponse(ApiError::InternalError(e.to_string())).into_response(),
    }
}

// ---- operator: submissions ----

pub async fn list_submissions(
    _: OperatorAuth,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<SubmissionView>> {
    let filter = SubmissionFilter {
        status: query.status.as_deref().map(str::parse).transpose()?,
        supplier_id: query.supplier_id,
    };
    Ok(Json(state.backoffice.submissions.list(&filter).await))
}

pub async fn update_submission_status(
    _: OperatorAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusUpdateRequest>,
) -> ApiResult<ActionResponse<StatusChange>> {
    let status: SubmissionStatus = req.status.parse()?;
    let change = state
        .backoffice
        .submissions
        .apply_status_change(id, status, req.remarks)
        .await?;
    Ok(ActionResponse::new(change.message(), change))
}

pub async fn bulk_status_by_ids(
    _: OperatorAuth,
    State(state): State<Arc<AppState>>,
    Json(req): Json<BulkStatusByIdsRequest>,
) -> ApiResult<ActionResponse<BulkUpdateSummary>> {
    let status: SubmissionStatus = req.status.parse()?;
    let summary = state
        .backoffice
        .submissions
        .bulk_update_by_ids(&req.ids, status, req.remarks)
        .await?;
    Ok(ActionResponse::new(summary.message(), summary))
}

pub async fn bulk_status_by_emails(
    _: OperatorAuth,
    State(state): State<Arc<AppState>>,
    Json(req): Json<BulkStatusByEmailsRequest>,
) -> ApiResult<ActionResponse<BulkUpdateSummary>> {
    let status: SubmissionStatus = req.status.parse()?;
    let summary = state
        .backoffice
        .submissions
        .bulk_update_by_emails(&req.emails, status, req.remarks)
        .await?;
    Ok(ActionResponse::new(summary.message(), summary))
}

pub async fn bulk_entry(
    _: OperatorAuth,
    State(state): State<Arc<AppState>>,
    Json(req): Json<BulkEntryRequest>,
) -> ApiResult<ActionResponse<BulkEntryOutcome>> {
    let status = match req.status.as_deref() {
        Some(raw) => raw.parse()?,
        None => SubmissionStatus::Pending,
    };
    let outcome = state
        .backoffice
        .submissions
        .bulk_entry(req.supplier_id, &req.emails, status, req.remarks)
        .await?;
    let message = format!(
        "{} email(s) uploaded, {} duplicate(s) skipped.",
        outcome.created.len(),
        outcome.duplicates.len()
    );
    Ok(ActionResponse::new(message, outcome))
}

// ---- operator: withdrawals ----

pub async fn list_withdrawals(
    _: OperatorAuth,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<Withdrawal>> {
    let filter = withdrawal_filter(query)?;
    Ok(Json(state.backoffice.withdrawals.list(&filter).await))
}

pub async fn resolve_withdrawal(
    _: OperatorAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<ResolveRequest>,
) -> ApiResult<ActionResponse<Withdrawal>> {
    let resolution = req.into_resolution()?;
    let withdrawal = state.backoffice.withdrawals.resolve(id, resolution).await?;
    Ok(ActionResponse::new(
        format!("Withdrawal {} successfully", withdrawal.status),
        withdrawal,
    ))
}

pub async fn list_bonus_withdrawals(
    _: OperatorAuth,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<BonusWithdrawal>> {
    let filter = withdrawal_filter(query)?;
    Ok(Json(state.backoffice.bonus_withdrawals.list(&filter).await))
}

pub async fn resolve_bonus_withdrawal(
    _: OperatorAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<ResolveRequest>,
) -> ApiResult<ActionResponse<BonusWithdrawal>> {
    let resolution = req.into_resolution()?;
    let withdrawal = state
        .backoffice
        .bonus_withdrawals
        .resolve(id, resolution)
        .await?;
    Ok(ActionResponse::new(
        format!("Bonus withdrawal {} successfully", withdrawal.status),
        withdrawal,
    ))
}

fn withdrawal_filter(query: ListQuery) -> Result<WithdrawalFilter, ApiErrorResponse> {
    let status: Option<WithdrawalStatus> = query.status.as_deref().map(str::parse).transpose()?;
    Ok(WithdrawalFilter {
        status,
        supplier_id: query.supplier_id,
    })
}

// ---- operator: administration ----

pub async fn get_stats(
    _: OperatorAuth,
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatsQuery>,
) -> ApiResult<LedgerStats> {
    let limit = query.top.unwrap_or(state.config.top_suppliers_limit);
    Ok(Json(state.backoffice.stats(limit).await))
}

pub async fn get_settings(
    _: OperatorAuth,
    State(state): State<Arc<AppState>>,
) -> ApiResult<SettingsView> {
    Ok(Json(state.backoffice.settings.view().await))
}

pub async fn update_settings(
    _: OperatorAuth,
    State(state): State<Arc<AppState>>,
    Json(req): Json<SettingsUpdateRequest>,
) -> ApiResult<ActionResponse<SettingsView>> {
    let updates = [
        (SettingKey::DefaultEmailReward, req.default_email_reward),
        (SettingKey::DefaultSignupBonus, req.default_signup_bonus),
        (SettingKey::DefaultReferralBonus, req.default_referral_bonus),
        (
            SettingKey::ReferralWithdrawalThreshold,
            req.referral_withdrawal_threshold,
        ),
    ];

    if updates.iter().all(|(_, value)| value.is_none()) {
        return Err(ApiError::InvalidRequest("no settings provided".to_string()).into());
    }
    if let Some((key, _)) = updates.iter().find(|(_, v)| v.map_or(false, |v| v < 0)) {
        return Err(ApiError::ValidationError {
            field: key.to_string(),
            message: "value must be a non-negative number".to_string(),
        }
        .into());
    }

    for (key, value) in updates {
        if let Some(value) = value {
            state.backoffice.settings.set(key, value).await?;
        }
    }

    Ok(ActionResponse::new(
        "Settings updated successfully",
        state.backoffice.settings.view().await,
    ))
}

pub async fn register_supplier(
    _: OperatorAuth,
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterSupplierRequest>,
) -> Result<(StatusCode, Json<ActionResponse<RegistrationOutcome>>), ApiErrorResponse> {
    let outcome = state
        .backoffice
        .suppliers
        .register_supplier(&req.username, req.refer_code.as_deref())
        .await?;
    Ok((
        StatusCode::CREATED,
        ActionResponse::new(outcome.message(), outcome),
    ))
}

pub async fn list_suppliers(
    _: OperatorAuth,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Vec<Supplier>> {
    Ok(Json(state.backoffice.suppliers.list().await))
}

// ---- supplier ----

pub async fn my_balance(
    SupplierIdentity(supplier_id): SupplierIdentity,
    State(state): State<Arc<AppState>>,
) -> ApiResult<SupplierBalance> {
    Ok(Json(
        state
            .backoffice
            .suppliers
            .supplier_balance(supplier_id)
            .await?,
    ))
}

pub async fn add_payout_method(
    SupplierIdentity(supplier_id): SupplierIdentity,
    State(state): State<Arc<AppState>>,
    Json(req): Json<PayoutMethodRequest>,
) -> Result<(StatusCode, Json<PayoutMethod>), ApiErrorResponse> {
    let method = state
        .backoffice
        .suppliers
        .add_payout_method(
            supplier_id,
            &req.method_type,
            &req.account_number,
            req.is_default,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(method)))
}

pub async fn request_withdrawal(
    SupplierIdentity(supplier_id): SupplierIdentity,
    State(state): State<Arc<AppState>>,
    body: Option<Json<PayoutMethodOverride>>,
) -> Result<(StatusCode, Json<ActionResponse<Withdrawal>>), ApiErrorResponse> {
    let payout = body.map(|Json(o)| o).filter(|o| !o.is_empty());
    let withdrawal = state
        .backoffice
        .withdrawals
        .request_withdrawal(supplier_id, payout)
        .await?;
    Ok((
        StatusCode::CREATED,
        ActionResponse::new("Withdrawal request submitted successfully", withdrawal),
    ))
}

pub async fn request_bonus_withdrawal(
    SupplierIdentity(supplier_id): SupplierIdentity,
    State(state): State<Arc<AppState>>,
    Json(req): Json<BonusWithdrawalRequest>,
) -> Result<(StatusCode, Json<ActionResponse<BonusWithdrawal>>), ApiErrorResponse> {
    let kind: BonusKind = req.kind.parse()?;
    let payout = Some(req.payout).filter(|o| !o.is_empty());
    let withdrawal = state
        .backoffice
        .bonus_withdrawals
        .request(supplier_id, kind, payout)
        .await?;
    Ok((
        StatusCode::CREATED,
        ActionResponse::new("Bonus withdrawal request submitted successfully", withdrawal),
    ))
}

pub async fn my_bonuses(
    SupplierIdentity(supplier_id): SupplierIdentity,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Vec<Bonus>> {
    Ok(Json(state.backoffice.bonuses.list_for(supplier_id).await))
}

pub async fn my_submissions(
    SupplierIdentity(supplier_id): SupplierIdentity,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Vec<SubmissionView>> {
    let filter = SubmissionFilter {
        status: None,
        supplier_id: Some(supplier_id),
    };
    Ok(Json(state.backoffice.submissions.list(&filter).await))
}

pub async fn my_notifications(
    SupplierIdentity(supplier_id): SupplierIdentity,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Vec<Notification>> {
    Ok(Json(state.inbox.for_supplier(supplier_id).await))
}
