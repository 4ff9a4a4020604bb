// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Ledger error taxonomy
//!
//! Every ledger operation returns `Result<_, LedgerError>`. Validation
//! failures carry enough context to be shown to an operator as-is; store
//! failures collapse into [`LedgerError::Store`] so callers can tell
//! "your request was invalid" apart from "the system failed".

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum LedgerError {
    #[error("Invalid status '{0}'. Allowed values are: good, bad, pending")]
    InvalidStatus(String),

    #[error("Withdrawn email {submission_id} can only be marked as 'bad'")]
    WithdrawnLocked { submission_id: Uuid },

    #[error("No payout method found for supplier {supplier_id}. Please add one.")]
    NoPayoutMethod { supplier_id: Uuid },

    #[error("No withdrawable amount found for supplier {supplier_id}")]
    NothingToWithdraw { supplier_id: Uuid },

    #[error("Request {id} is already {status}")]
    NotPending { id: Uuid, status: String },

    #[error("Remarks are required to approve a withdrawal")]
    MissingRemarks,

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Invalid action '{0}'. Allowed values are: approve, reject")]
    InvalidAction(String),

    #[error("No valid emails provided")]
    EmptyBatch,

    #[error("Invalid value for setting '{key}': {reason}")]
    InvalidSetting { key: String, reason: String },

    #[error("Supplier {supplier_id} already has a pending {kind} bonus withdrawal")]
    PendingBonusWithdrawal { supplier_id: Uuid, kind: String },

    #[error("Amount {amount} is below the withdrawal threshold of {threshold}")]
    BelowThreshold { amount: i64, threshold: i64 },

    #[error("Validation error for {field}: {message}")]
    InvalidInput { field: String, message: String },

    #[error("Username '{0}' is already registered")]
    DuplicateSupplier(String),

    #[error("Store failure: {0}")]
    Store(String),
}

impl LedgerError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        LedgerError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn invalid_input(field: &str, message: impl Into<String>) -> Self {
        LedgerError::InvalidInput {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Stable machine-readable code for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerError::InvalidStatus(_) => "invalid_status",
            LedgerError::WithdrawnLocked { .. } => "withdrawn_locked",
            LedgerError::NoPayoutMethod { .. } => "no_payout_method",
            LedgerError::NothingToWithdraw { .. } => "nothing_to_withdraw",
            LedgerError::NotPending { .. } => "not_pending",
            LedgerError::MissingRemarks => "missing_remarks",
            LedgerError::NotFound { .. } => "not_found",
            LedgerError::InvalidAction(_) => "invalid_action",
            LedgerError::EmptyBatch => "empty_batch",
            LedgerError::InvalidSetting { .. } => "invalid_setting",
            LedgerError::PendingBonusWithdrawal { .. } => "pending_bonus_withdrawal",
            LedgerError::BelowThreshold { .. } => "below_threshold",
            LedgerError::InvalidInput { .. } => "validation_error",
            LedgerError::DuplicateSupplier(_) => "duplicate_supplier",
            LedgerError::Store(_) => "internal_error",
        }
    }

    /// True when the failure is the system's fault rather than the caller's.
    pub fn is_internal(&self) -> bool {
        matches!(self, LedgerError::Store(_))
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Store(err.to_string())
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::Store(err.to_string())
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
