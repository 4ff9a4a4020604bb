// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use super::types::{BonusKind, BonusWithdrawal};
use crate::error::{LedgerError, LedgerResult};
use crate::events::{EventDispatcher, LedgerEvent};
use crate::settings::RewardSettingProvider;
use crate::store::Store;
use crate::supplier::{resolve_payout, PayoutMethodOverride};
use crate::withdrawals::{ResolveAction, Resolution, WithdrawalFilter, WithdrawalStatus};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Payout lifecycle for unlocked bonuses, one bonus type per request.
#[derive(Clone)]
pub struct BonusWithdrawalWorkflow {
    store: Store,
    settings: Arc<dyn RewardSettingProvider>,
    dispatcher: EventDispatcher,
}

impl BonusWithdrawalWorkflow {
    pub fn new(
        store: Store,
        settings: Arc<dyn RewardSettingProvider>,
        dispatcher: EventDispatcher,
    ) -> Self {
        Self {
            store,
            settings,
            dispatcher,
        }
    }

    pub async fn request(
        &self,
        supplier_id: Uuid,
        kind: BonusKind,
        payout_override: Option<PayoutMethodOverride>,
    ) -> LedgerResult<BonusWithdrawal> {
        let threshold = match kind {
            BonusKind::Referral => self.settings.referral_withdrawal_threshold().await,
            BonusKind::Signup => None,
        };

        let withdrawal = self
            .store
            .transact(|t| {
                if !t.suppliers.contains_key(&supplier_id) {
                    return Err(LedgerError::not_found("Supplier", supplier_id));
                }

                let payout = resolve_payout(t, supplier_id, payout_override.as_ref())?;

                if t.has_pending_bonus_withdrawal(supplier_id, kind) {
                    return Err(LedgerError::PendingBonusWithdrawal {
                        supplier_id,
                        kind: kind.to_string(),
                    });
                }

                let eligible: Vec<(Uuid, i64)> = t
                    .bonuses
                    .values()
                    .filter(|b| b.supplier_id == supplier_id && b.kind == kind && b.is_withdrawable())
                    .map(|b| (b.id, b.amount))
                    .collect();

                if eligible.is_empty() {
                    return Err(LedgerError::NothingToWithdraw { supplier_id });
                }

                let amount: i64 = eligible.iter().map(|(_, amount)| amount).sum();
                if let Some(threshold) = threshold {
                    if amount < threshold {
                        return Err(LedgerError::BelowThreshold { amount, threshold });
                    }
                }

                let withdrawal = BonusWithdrawal {
                    id: Uuid::new_v4(),
                    supplier_id,
                    kind,
                    amount,
                    payout,
                    bonus_ids: eligible.into_iter().map(|(id, _)| id).collect(),
                    status: WithdrawalStatus::Pending,
                    remarks: None,
                    created_at: Utc::now(),
                    resolved_at: None,
                };
                t.bonus_withdrawals.insert(withdrawal.id, withdrawal.clone());
                Ok(withdrawal)
            })
            .await?;

        info!(
            supplier_id = %supplier_id,
            bonus_withdrawal_id = %withdrawal.id,
            amount = withdrawal.amount,
            "Bonus withdrawal requested ({})",
            kind
        );

        self.dispatcher
            .publish(vec![LedgerEvent::BonusWithdrawalRequested {
                bonus_withdrawal_id: withdrawal.id,
                supplier_id,
                kind,
                amount: withdrawal.amount,
            }])
            .await;

        Ok(withdrawal)
    }

    /// Approves or rejects a pending bonus withdrawal.
    ///
    /// Approval marks the recorded bonuses that are still unlocked and not
    /// withdrawn as withdrawn; rejection clears the withdrawn flag on them.
    pub async fn resolve(&self, id: Uuid, resolution: Resolution) -> LedgerResult<BonusWithdrawal> {
        let remarks = resolution.remarks();

        let withdrawal = self
            .store
            .transact(|t| {
                let mut withdrawal = t
                    .bonus_withdrawals
                    .get(&id)
                    .cloned()
                    .ok_or_else(|| LedgerError::not_found("Bonus withdrawal", id))?;

                if withdrawal.status != WithdrawalStatus::Pending {
                    return Err(LedgerError::NotPending {
                        id,
                        status: withdrawal.status.to_string(),
                    });
                }

                let now = Utc::now();
                match resolution.action {
                    ResolveAction::Approve => {
                        if remarks.is_none() {
                            return Err(LedgerError::MissingRemarks);
                        }
                        for bonus_id in &withdrawal.bonus_ids {
                            if let Some(bonus) = t.bonuses.get_mut(bonus_id) {
                                if bonus.is_withdrawable() {
                                    bonus.is_withdrawn = true;
                                    bonus.updated_at = now;
                                }
                            }
                        }
                        withdrawal.status = WithdrawalStatus::Approved;
                    }
                    ResolveAction::Reject => {
                        for bonus_id in &withdrawal.bonus_ids {
                            if let Some(bonus) = t.bonuses.get_mut(bonus_id) {
                                bonus.is_withdrawn = false;
                                bonus.updated_at = now;
                            }
                        }
                        withdrawal.status = WithdrawalStatus::Rejected;
                    }
                }

                withdrawal.remarks = remarks.clone();
                withdrawal.resolved_at = Some(now);
                t.bonus_withdrawals.insert(id, withdrawal.clone());
                Ok(withdrawal)
            })
            .await?;

        info!(
            bonus_withdrawal_id = %id,
            supplier_id = %withdrawal.supplier_id,
            "Bonus withdrawal {}",
            withdrawal.status
        );

        let event = match withdrawal.status {
            WithdrawalStatus::Approved => LedgerEvent::BonusWithdrawalApproved {
                bonus_withdrawal_id: id,
                supplier_id: withdrawal.supplier_id,
                kind: withdrawal.kind,
                amount: withdrawal.amount,
            },
            _ => LedgerEvent::BonusWithdrawalRejected {
                bonus_withdrawal_id: id,
                supplier_id: withdrawal.supplier_id,
                kind: withdrawal.kind,
                amount: withdrawal.amount,
            },
        };
        self.dispatcher.publish(vec![event]).await;

        Ok(withdrawal)
    }

    pub async fn list(&self, filter: &WithdrawalFilter) -> Vec<BonusWithdrawal> {
        let mut withdrawals: Vec<BonusWithdrawal> = self
            .store
            .read(|t| {
                t.bonus_withdrawals
                    .values()
                    .filter(|w| filter.status.map_or(true, |s| w.status == s))
                    .filter(|w| filter.supplier_id.map_or(true, |id| w.supplier_id == id))
                    .cloned()
                    .collect()
            })
            .await;
        withdrawals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        withdrawals
    }
}
