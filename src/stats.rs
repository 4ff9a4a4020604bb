// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Aggregate counts for the operator dashboard.

use crate::store::Store;
use crate::submissions::SubmissionStatus;
use crate::withdrawals::WithdrawalStatus;
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SubmissionCounts {
    pub total: usize,
    pub pending: usize,
    pub good: usize,
    pub bad: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WithdrawalTotals {
    /// Sum of approved withdrawal amounts.
    pub total_withdrawn: i64,
    /// Sum of amounts still awaiting a decision.
    pub pending_amount: i64,
    pub approved: usize,
    pub pending: usize,
    pub rejected: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierEarnings {
    pub supplier_id: Uuid,
    pub username: String,
    pub total_approved: i64,
    pub withdrawals: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LedgerStats {
    pub submissions: SubmissionCounts,
    pub withdrawals: WithdrawalTotals,
    pub top_suppliers: Vec<SupplierEarnings>,
}

impl LedgerStats {
    pub async fn collect(store: &Store, top_limit: usize) -> Self {
        store
            .read(|t| {
                let mut submissions = SubmissionCounts::default();
                for submission in t.submissions.values() {
                    submissions.total += 1;
                    match submission.status() {
                        SubmissionStatus::Pending => submissions.pending += 1,
                        SubmissionStatus::Good => submissions.good += 1,
                        SubmissionStatus::Bad => submissions.bad += 1,
                    }
                }

                let mut withdrawals = WithdrawalTotals::default();
                let mut earnings: HashMap<Uuid, (i64, usize)> = HashMap::new();
                for withdrawal in t.withdrawals.values() {
                    match withdrawal.status {
                        WithdrawalStatus::Approved => {
                            withdrawals.approved += 1;
                            withdrawals.total_withdrawn += withdrawal.amount;
                            let entry = earnings.entry(withdrawal.supplier_id).or_default();
                            entry.0 += withdrawal.amount;
                            entry.1 += 1;
                        }
                        WithdrawalStatus::Pending => {
                            withdrawals.pending += 1;
                            withdrawals.pending_amount += withdrawal.amount;
                        }
                        WithdrawalStatus::Rejected => withdrawals.rejected += 1,
                    }
                }

                let mut top_suppliers: Vec<SupplierEarnings> = earnings
                    .into_iter()
                    .map(|(supplier_id, (total_approved, count))| SupplierEarnings {
                        supplier_id,
                        username: t
                            .suppliers
                            .get(&supplier_id)
                            .map(|s| s.username.clone())
                            .unwrap_or_default(),
                        total_approved,
                        withdrawals: count,
                    })
                    .collect();
                top_suppliers.sort_by(|a, b| {
                    b.total_approved
                        .cmp(&a.total_approved)
                        .then_with(|| a.username.cmp(&b.username))
                });
                top_suppliers.truncate(top_limit);

                LedgerStats {
                    submissions,
                    withdrawals,
                    top_suppliers,
                }
            })
            .await
    }
}
