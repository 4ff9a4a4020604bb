// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::error::LedgerError;
use crate::supplier::PayoutDestination;
use crate::withdrawals::WithdrawalStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BonusKind {
    Signup,
    Referral,
}

impl BonusKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BonusKind::Signup => "signup",
            BonusKind::Referral => "referral",
        }
    }
}

impl fmt::Display for BonusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BonusKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "signup" => Ok(BonusKind::Signup),
            "referral" => Ok(BonusKind::Referral),
            _ => Err(LedgerError::invalid_input(
                "kind",
                format!("unknown bonus type '{}'. Allowed values are: signup, referral", s),
            )),
        }
    }
}

/// A signup or referral grant.
///
/// Referral bonuses belong to the referrer; `referee_id` names the referred
/// supplier whose first approved withdrawal unlocks it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bonus {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub kind: BonusKind,
    pub amount: i64,
    pub referee_id: Option<Uuid>,
    pub unlocked_after_first_withdrawal: bool,
    pub is_withdrawn: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Bonus {
    pub fn signup(supplier_id: Uuid, amount: i64) -> Self {
        Self::new(supplier_id, BonusKind::Signup, amount, None)
    }

    pub fn referral(referrer_id: Uuid, referee_id: Uuid, amount: i64) -> Self {
        Self::new(referrer_id, BonusKind::Referral, amount, Some(referee_id))
    }

    fn new(supplier_id: Uuid, kind: BonusKind, amount: i64, referee_id: Option<Uuid>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            supplier_id,
            kind,
            amount,
            referee_id,
            unlocked_after_first_withdrawal: false,
            is_withdrawn: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_withdrawable(&self) -> bool {
        self.unlocked_after_first_withdrawal && !self.is_withdrawn
    }
}

/// A payout request scoped to one bonus type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BonusWithdrawal {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub kind: BonusKind,
    pub amount: i64,
    pub payout: PayoutDestination,
    pub bonus_ids: Vec<Uuid>,
    pub status: WithdrawalStatus,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}
