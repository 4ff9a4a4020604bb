// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::bonus::Bonus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: Uuid,
    pub username: String,
    /// Refer code entered at signup, kept even when it matched nobody.
    pub refer_code: Option<String>,
    pub referred_by: Option<Uuid>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Supplier {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            refer_code: None,
            referred_by: None,
            active: true,
            created_at: Utc::now(),
        }
    }
}

/// Where a supplier wants payouts sent (wallet, bank account, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoutMethod {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub method_type: String,
    pub account_number: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

/// Payout details frozen onto a withdrawal at request time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutDestination {
    pub method_type: String,
    pub account_number: String,
}

impl From<&PayoutMethod> for PayoutDestination {
    fn from(method: &PayoutMethod) -> Self {
        Self {
            method_type: method.method_type.clone(),
            account_number: method.account_number.clone(),
        }
    }
}

/// Explicit payout details supplied with a withdrawal request. Missing
/// fields fall back to the supplier's default method.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PayoutMethodOverride {
    #[serde(default)]
    pub method_type: Option<String>,
    #[serde(default)]
    pub account_number: Option<String>,
}

impl PayoutMethodOverride {
    pub fn is_empty(&self) -> bool {
        self.method_type.is_none() && self.account_number.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistrationOutcome {
    pub supplier: Supplier,
    pub signup_bonus: Option<Bonus>,
    pub referral_bonus: Option<Bonus>,
    pub refer_code_invalid: bool,
}

impl RegistrationOutcome {
    pub fn message(&self) -> String {
        if self.refer_code_invalid {
            "User profile created successfully, but the provided referCode is invalid.".to_string()
        } else {
            "User profile created successfully.".to_string()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierBalance {
    pub supplier_id: Uuid,
    /// Approved rewards not yet claimed by a withdrawal.
    pub available: i64,
    /// Outstanding clawbacks on claimed submissions (zero or negative).
    pub clawbacks: i64,
    pub balance: i64,
}
