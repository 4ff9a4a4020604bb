// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::error::LedgerError;
use crate::supplier::PayoutDestination;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Lifecycle of a payout request. `Approved` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    Pending,
    Approved,
    Rejected,
}

impl WithdrawalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WithdrawalStatus::Pending => "pending",
            WithdrawalStatus::Approved => "approved",
            WithdrawalStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, WithdrawalStatus::Pending)
    }
}

impl fmt::Display for WithdrawalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WithdrawalStatus {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(WithdrawalStatus::Pending),
            "approved" => Ok(WithdrawalStatus::Approved),
            "rejected" => Ok(WithdrawalStatus::Rejected),
            _ => Err(LedgerError::invalid_input(
                "status",
                format!("unknown withdrawal status '{}'", s),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolveAction {
    Approve,
    Reject,
}

impl FromStr for ResolveAction {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "approve" => Ok(ResolveAction::Approve),
            "reject" => Ok(ResolveAction::Reject),
            _ => Err(LedgerError::InvalidAction(s.to_string())),
        }
    }
}

/// Operator decision on a pending withdrawal.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub action: ResolveAction,
    pub remarks: Option<String>,
    /// Reference to the payout proof (receipt URL, transfer id).
    pub proof: Option<String>,
}

impl Resolution {
    pub fn approve(remarks: impl Into<String>) -> Self {
        Self {
            action: ResolveAction::Approve,
            remarks: Some(remarks.into()),
            proof: None,
        }
    }

    pub fn reject(remarks: Option<String>) -> Self {
        Self {
            action: ResolveAction::Reject,
            remarks,
            proof: None,
        }
    }

    pub fn with_proof(mut self, proof: impl Into<String>) -> Self {
        self.proof = Some(proof.into());
        self
    }

    /// Non-blank remarks, trimmed.
    pub fn remarks(&self) -> Option<String> {
        self.remarks
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
    }
}

/// A payout request against submission rewards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Withdrawal {
    pub id: Uuid,
    pub supplier_id: Uuid,
    /// Sum of the claimed submissions' amounts at claim time.
    pub amount: i64,
    pub payout: PayoutDestination,
    pub status: WithdrawalStatus,
    pub remarks: Option<String>,
    pub proof: Option<String>,
    pub claimed_submission_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WithdrawalFilter {
    pub status: Option<WithdrawalStatus>,
    pub supplier_id: Option<Uuid>,
}
