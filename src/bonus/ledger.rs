// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use super::types::{Bonus, BonusKind};
use crate::events::LedgerEvent;
use crate::store::{Store, Tables};
use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

/// Signup and referral grants, and the first-withdrawal unlock gate.
#[derive(Clone)]
pub struct BonusLedger {
    store: Store,
}

impl BonusLedger {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Records a new, locked grant inside an open transaction.
    pub fn grant(tables: &mut Tables, bonus: Bonus) -> LedgerEvent {
        let event = LedgerEvent::BonusGranted {
            bonus_id: bonus.id,
            supplier_id: bonus.supplier_id,
            kind: bonus.kind,
            amount: bonus.amount,
        };
        tables.bonuses.insert(bonus.id, bonus);
        event
    }

    /// Unlocks the supplier's signup bonus and the referral bonus they earned
    /// their referrer. Runs inside the approval transaction and only while the
    /// supplier has exactly one approved withdrawal, so later approvals are a
    /// no-op and an overlapping second approval cannot skip the unlock.
    pub fn unlock_bonuses_on_first_approval(tables: &mut Tables, supplier_id: Uuid) -> Vec<LedgerEvent> {
        let approved = tables.approved_withdrawal_count(supplier_id);
        if approved != 1 {
            debug!(
                supplier_id = %supplier_id,
                approved, "Not the first approved withdrawal, skipping bonus unlock"
            );
            return Vec::new();
        }

        let now = Utc::now();
        let mut events = Vec::new();
        let locked = tables.bonuses.values_mut().filter(|b| {
            !b.unlocked_after_first_withdrawal
                && match b.kind {
                    BonusKind::Signup => b.supplier_id == supplier_id,
                    BonusKind::Referral => b.referee_id == Some(supplier_id),
                }
        });

        for bonus in locked {
            bonus.unlocked_after_first_withdrawal = true;
            bonus.updated_at = now;
            events.push(LedgerEvent::BonusUnlocked {
                bonus_id: bonus.id,
                supplier_id: bonus.supplier_id,
                kind: bonus.kind,
                amount: bonus.amount,
            });
        }

        if !events.is_empty() {
            info!(
                supplier_id = %supplier_id,
                "🔓 Unlocked {} bonus(es) after first approved withdrawal",
                events.len()
            );
        }

        events
    }

    pub async fn list_for(&self, supplier_id: Uuid) -> Vec<Bonus> {
        let mut bonuses: Vec<Bonus> = self
            .store
            .read(|t| {
                t.bonuses
                    .values()
                    .filter(|b| b.supplier_id == supplier_id)
                    .cloned()
                    .collect()
            })
            .await;
        bonuses.sort_by_key(|b| b.created_at);
        bonuses
    }
}
