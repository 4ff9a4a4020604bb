// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use super::types::{ResolveAction, Resolution, Withdrawal, WithdrawalFilter, WithdrawalStatus};
use crate::bonus::BonusLedger;
use crate::error::{LedgerError, LedgerResult};
use crate::events::{EventDispatcher, LedgerEvent};
use crate::store::{Store, Tables};
use crate::supplier::{resolve_payout, PayoutMethodOverride};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

/// Claims a supplier's approved submissions into a payout request and
/// settles it once an operator decides.
#[derive(Clone)]
pub struct WithdrawalWorkflow {
    store: Store,
    dispatcher: EventDispatcher,
}

impl WithdrawalWorkflow {
    pub fn new(store: Store, dispatcher: EventDispatcher) -> Self {
        Self { store, dispatcher }
    }

    /// Claims every open `good` submission of the supplier.
    ///
    /// Claim and create share one transaction, so concurrent requests for
    /// the same supplier can never claim the same submission twice.
    pub async fn request_withdrawal(
        &self,
        supplier_id: Uuid,
        payout_override: Option<PayoutMethodOverride>,
    ) -> LedgerResult<Withdrawal> {
        let withdrawal = self
            .store
            .transact(|t| {
                if !t.suppliers.contains_key(&supplier_id) {
                    return Err(LedgerError::not_found("Supplier", supplier_id));
                }

                let payout = resolve_payout(t, supplier_id, payout_override.as_ref())?;

                let mut claimed = Vec::new();
                let mut amount = 0;
                let now = Utc::now();
                for submission in t
                    .submissions
                    .values_mut()
                    .filter(|s| s.supplier_id == supplier_id)
                {
                    if let Some(state) = submission.state.claim() {
                        submission.state = state;
                        submission.updated_at = now;
                        amount += submission.amount;
                        claimed.push(submission.id);
                    }
                }

                if claimed.is_empty() || amount <= 0 {
                    return Err(LedgerError::NothingToWithdraw { supplier_id });
                }

                let withdrawal = Withdrawal {
                    id: Uuid::new_v4(),
                    supplier_id,
                    amount,
                    payout,
                    status: WithdrawalStatus::Pending,
                    remarks: None,
                    proof: None,
                    claimed_submission_ids: claimed,
                    created_at: now,
                    resolved_at: None,
                };
                t.withdrawals.insert(withdrawal.id, withdrawal.clone());
                Ok(withdrawal)
            })
            .await?;

        info!(
            supplier_id = %supplier_id,
            withdrawal_id = %withdrawal.id,
            amount = withdrawal.amount,
            "💸 Withdrawal requested, {} submission(s) claimed",
            withdrawal.claimed_submission_ids.len()
        );

        self.dispatcher
            .publish(vec![LedgerEvent::WithdrawalRequested {
                withdrawal_id: withdrawal.id,
                supplier_id,
                amount: withdrawal.amount,
                claimed: withdrawal.claimed_submission_ids.len(),
            }])
            .await;

        Ok(withdrawal)
    }

    /// Approves or rejects a pending withdrawal. A second resolve of the same
    /// withdrawal fails `NotPending` without touching any submission.
    pub async fn resolve(&self, withdrawal_id: Uuid, resolution: Resolution) -> LedgerResult<Withdrawal> {
        let remarks = resolution.remarks();

        let (withdrawal, events) = self
            .store
            .transact(|t| {
                let mut withdrawal = t
                    .withdrawals
                    .get(&withdrawal_id)
                    .cloned()
                    .ok_or_else(|| LedgerError::not_found("Withdrawal", withdrawal_id))?;

                if withdrawal.status != WithdrawalStatus::Pending {
                    return Err(LedgerError::NotPending {
                        id: withdrawal_id,
                        status: withdrawal.status.to_string(),
                    });
                }

                let events = match resolution.action {
                    ResolveAction::Approve => {
                        if remarks.is_none() {
                            return Err(LedgerError::MissingRemarks);
                        }
                        withdrawal.status = WithdrawalStatus::Approved;
                        withdrawal.proof = resolution.proof.clone();
                        let forgiven = forgive_clawbacks(t, withdrawal.supplier_id);
                        t.withdrawals.insert(withdrawal_id, withdrawal.clone());

                        let approved_count = t.approved_withdrawal_count(withdrawal.supplier_id);
                        info!(
                            withdrawal_id = %withdrawal_id,
                            supplier_id = %withdrawal.supplier_id,
                            forgiven,
                            "✅ Withdrawal approved (approved total {})",
                            approved_count
                        );

                        let mut events = vec![LedgerEvent::WithdrawalApproved {
                            withdrawal_id,
                            supplier_id: withdrawal.supplier_id,
                            amount: withdrawal.amount,
                            approved_count,
                        }];
                        if approved_count == 1 {
                            events.push(LedgerEvent::FirstWithdrawalApproved {
                                supplier_id: withdrawal.supplier_id,
                            });
                            events.extend(BonusLedger::unlock_bonuses_on_first_approval(
                                t,
                                withdrawal.supplier_id,
                            ));
                        }
                        events
                    }
                    ResolveAction::Reject => {
                        withdrawal.status = WithdrawalStatus::Rejected;
                        let released = release_claims(t, &withdrawal.claimed_submission_ids);
                        info!(
                            withdrawal_id = %withdrawal_id,
                            supplier_id = %withdrawal.supplier_id,
                            released,
                            "❌ Withdrawal rejected"
                        );

                        vec![LedgerEvent::WithdrawalRejected {
                            withdrawal_id,
                            supplier_id: withdrawal.supplier_id,
                            amount: withdrawal.amount,
                            released,
                        }]
                    }
                };

                withdrawal.remarks = remarks.clone();
                withdrawal.resolved_at = Some(Utc::now());
                t.withdrawals.insert(withdrawal_id, withdrawal.clone());
                Ok((withdrawal, events))
            })
            .await?;

        self.dispatcher.publish(events).await;
        Ok(withdrawal)
    }

    pub async fn get(&self, withdrawal_id: Uuid) -> LedgerResult<Withdrawal> {
        self.store
            .read(|t| t.withdrawals.get(&withdrawal_id).cloned())
            .await
            .ok_or_else(|| LedgerError::not_found("Withdrawal", withdrawal_id))
    }

    pub async fn list(&self, filter: &WithdrawalFilter) -> Vec<Withdrawal> {
        let mut withdrawals: Vec<Withdrawal> = self
            .store
            .read(|t| {
                t.withdrawals
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

/// Zeroes negative amounts on the supplier's claimed submissions once a
/// payout round closes. Returns how many were forgiven.
fn forgive_clawbacks(tables: &mut Tables, supplier_id: Uuid) -> usize {
    let now = Utc::now();
    let mut forgiven = 0;
    for submission in tables
        .submissions
        .values_mut()
        .filter(|s| s.supplier_id == supplier_id && s.is_withdrawn() && s.amount < 0)
    {
        submission.amount = 0;
        submission.updated_at = now;
        forgiven += 1;
    }
    forgiven
}

/// Returns the claimed `good` submissions of a rejected withdrawal to the
/// withdrawable pool. Demoted claims stay claimed.
fn release_claims(tables: &mut Tables, claimed: &[Uuid]) -> usize {
    let now = Utc::now();
    let mut released = 0;
    for id in claimed {
        if let Some(submission) = tables.submissions.get_mut(id) {
            if let Some(state) = submission.state.release() {
                submission.state = state;
                submission.updated_at = now;
                released += 1;
            }
        }
    }
    released
}
