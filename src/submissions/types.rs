// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::error::LedgerError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Operator verdict on a submitted email address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Pending,
    Good,
    Bad,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Good => "good",
            SubmissionStatus::Bad => "bad",
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubmissionStatus {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(SubmissionStatus::Pending),
            "good" => Ok(SubmissionStatus::Good),
            "bad" => Ok(SubmissionStatus::Bad),
            _ => Err(LedgerError::InvalidStatus(s.to_string())),
        }
    }
}

/// Verdicts a claimed submission can hold: `Good` at claim time, `Bad`
/// once an operator demotes it. A claimed submission is never `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimedStatus {
    Good,
    Bad,
}

impl From<ClaimedStatus> for SubmissionStatus {
    fn from(status: ClaimedStatus) -> Self {
        match status {
            ClaimedStatus::Good => SubmissionStatus::Good,
            ClaimedStatus::Bad => SubmissionStatus::Bad,
        }
    }
}

/// Combined verdict and withdraw-lock of a submission.
///
/// `Open` submissions move freely between verdicts. `Claimed` submissions
/// belong to a withdrawal round and may only be demoted to `Bad`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", content = "status", rename_all = "lowercase")]
pub enum SubmissionState {
    Open(SubmissionStatus),
    Claimed(ClaimedStatus),
}

impl SubmissionState {
    pub fn status(&self) -> SubmissionStatus {
        match *self {
            SubmissionState::Open(status) => status,
            SubmissionState::Claimed(status) => status.into(),
        }
    }

    pub fn is_withdrawn(&self) -> bool {
        matches!(self, SubmissionState::Claimed(_))
    }

    /// Only open, approved submissions can be pulled into a withdrawal.
    pub fn is_claimable(&self) -> bool {
        matches!(self, SubmissionState::Open(SubmissionStatus::Good))
    }

    pub fn claim(self) -> Option<Self> {
        match self {
            SubmissionState::Open(SubmissionStatus::Good) => {
                Some(SubmissionState::Claimed(ClaimedStatus::Good))
            }
            _ => None,
        }
    }

    /// Returns a claimed `Good` submission to the withdrawable pool.
    /// Demoted (`Bad`) claims stay claimed.
    pub fn release(self) -> Option<Self> {
        match self {
            SubmissionState::Claimed(ClaimedStatus::Good) => {
                Some(SubmissionState::Open(SubmissionStatus::Good))
            }
            _ => None,
        }
    }

    /// State after an operator verdict, or `None` if the lock forbids it.
    pub fn with_status(self, status: SubmissionStatus) -> Option<Self> {
        match (self, status) {
            (SubmissionState::Open(_), status) => Some(SubmissionState::Open(status)),
            (SubmissionState::Claimed(_), SubmissionStatus::Bad) => {
                Some(SubmissionState::Claimed(ClaimedStatus::Bad))
            }
            (SubmissionState::Claimed(_), _) => None,
        }
    }
}

impl Default for SubmissionState {
    fn default() -> Self {
        SubmissionState::Open(SubmissionStatus::Pending)
    }
}

/// One email address a supplier claims to own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub email: String,
    pub state: SubmissionState,
    pub amount: i64,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Submission {
    pub fn new(supplier_id: Uuid, email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            supplier_id,
            email: email.into(),
            state: SubmissionState::default(),
            amount: 0,
            remarks: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn status(&self) -> SubmissionStatus {
        self.state.status()
    }

    pub fn is_withdrawn(&self) -> bool {
        self.state.is_withdrawn()
    }
}

/// Flat representation served over the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionView {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub email: String,
    pub status: SubmissionStatus,
    pub is_withdrawn: bool,
    pub amount: i64,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Submission> for SubmissionView {
    fn from(submission: &Submission) -> Self {
        Self {
            id: submission.id,
            supplier_id: submission.supplier_id,
            email: submission.email.clone(),
            status: submission.status(),
            is_withdrawn: submission.is_withdrawn(),
            amount: submission.amount,
            remarks: submission.remarks.clone(),
            created_at: submission.created_at,
            updated_at: submission.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmissionFilter {
    pub status: Option<SubmissionStatus>,
    pub supplier_id: Option<Uuid>,
}

/// Result of a single status change. `Unchanged` is a success that wrote
/// nothing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StatusChange {
    Updated {
        submission_id: Uuid,
        supplier_id: Uuid,
        email: String,
        previous: SubmissionStatus,
        status: SubmissionStatus,
        amount: i64,
    },
    Unchanged {
        submission_id: Uuid,
        status: SubmissionStatus,
    },
}

impl StatusChange {
    pub fn message(&self) -> String {
        match self {
            StatusChange::Updated { .. } => "Email status updated successfully".to_string(),
            StatusChange::Unchanged { status, .. } => {
                format!("Status is already '{}'. No update needed.", status)
            }
        }
    }

    pub fn is_updated(&self) -> bool {
        matches!(self, StatusChange::Updated { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkFailure {
    pub target: String,
    pub kind: String,
    pub message: String,
}

/// Per-record outcome of a bulk status update.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BulkUpdateSummary {
    pub updated: usize,
    pub skipped: usize,
    pub not_found: Vec<String>,
    pub failed: Vec<BulkFailure>,
}

impl BulkUpdateSummary {
    pub fn message(&self) -> String {
        let mut message = format!("{} email(s) updated successfully.", self.updated);
        if self.skipped > 0 {
            message.push_str(&format!(" {} already in that state.", self.skipped));
        }
        if !self.not_found.is_empty() {
            message.push_str(&format!(
                " {} email(s) not found: {}",
                self.not_found.len(),
                self.not_found.join(", ")
            ));
        }
        if !self.failed.is_empty() {
            message.push_str(&format!(" {} failed.", self.failed.len()));
        }
        message
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BulkEntryOutcome {
    pub created: Vec<Uuid>,
    pub duplicates: Vec<String>,
}

/// Splits operator-pasted email text on newlines and commas.
pub fn parse_email_list(raw: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    raw.split(|c| c == '\n' || c == ',')
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .filter(|e| seen.insert(e.clone()))
        .collect()
}
