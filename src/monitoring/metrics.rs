// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::events::LedgerEvent;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

/// Prometheus counters for ledger activity, exposed on `/metrics`.
#[derive(Clone)]
pub struct LedgerMetrics {
    registry: Registry,
    transitions: IntCounterVec,
    submissions_uploaded: IntCounter,
    withdrawals: IntCounterVec,
    bonus_withdrawals: IntCounterVec,
    bonus_unlocks: IntCounter,
    notification_failures: IntCounter,
}

impl LedgerMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let transitions = IntCounterVec::new(
            Opts::new(
                "ledger_submission_transitions_total",
                "Submission status changes by new status",
            ),
            &["status"],
        )?;
        let submissions_uploaded = IntCounter::new(
            "ledger_submissions_uploaded_total",
            "Submissions created through bulk entry",
        )?;
        let withdrawals = IntCounterVec::new(
            Opts::new(
                "ledger_withdrawals_total",
                "Withdrawal lifecycle events by outcome",
            ),
            &["outcome"],
        )?;
        let bonus_withdrawals = IntCounterVec::new(
            Opts::new(
                "ledger_bonus_withdrawals_total",
                "Bonus withdrawal lifecycle events by outcome",
            ),
            &["outcome"],
        )?;
        let bonus_unlocks =
            IntCounter::new("ledger_bonus_unlocks_total", "Bonuses unlocked by the cascade")?;
        let notification_failures = IntCounter::new(
            "ledger_notification_failures_total",
            "Notifications the notifier failed to deliver",
        )?;

        registry.register(Box::new(transitions.clone()))?;
        registry.register(Box::new(submissions_uploaded.clone()))?;
        registry.register(Box::new(withdrawals.clone()))?;
        registry.register(Box::new(bonus_withdrawals.clone()))?;
        registry.register(Box::new(bonus_unlocks.clone()))?;
        registry.register(Box::new(notification_failures.clone()))?;

        Ok(Self {
            registry,
            transitions,
            submissions_uploaded,
            withdrawals,
            bonus_withdrawals,
            bonus_unlocks,
            notification_failures,
        })
    }

    pub fn record(&self, event: &LedgerEvent) {
        match event {
            LedgerEvent::SubmissionStatusChanged { status, .. } => {
                self.transitions.with_label_values(&[status.as_str()]).inc();
            }
            LedgerEvent::SubmissionsUploaded { created, .. } => {
                self.submissions_uploaded.inc_by(*created as u64);
            }
            LedgerEvent::WithdrawalRequested { .. } => {
                self.withdrawals.with_label_values(&["requested"]).inc();
            }
            LedgerEvent::WithdrawalApproved { .. } => {
                self.withdrawals.with_label_values(&["approved"]).inc();
            }
            LedgerEvent::WithdrawalRejected { .. } => {
                self.withdrawals.with_label_values(&["rejected"]).inc();
            }
            LedgerEvent::BonusUnlocked { .. } => self.bonus_unlocks.inc(),
            LedgerEvent::BonusWithdrawalRequested { .. } => {
                self.bonus_withdrawals.with_label_values(&["requested"]).inc();
            }
            LedgerEvent::BonusWithdrawalApproved { .. } => {
                self.bonus_withdrawals.with_label_values(&["approved"]).inc();
            }
            LedgerEvent::BonusWithdrawalRejected { .. } => {
                self.bonus_withdrawals.with_label_values(&["rejected"]).inc();
            }
            LedgerEvent::SupplierRegistered { .. }
            | LedgerEvent::BonusGranted { .. }
            | LedgerEvent::FirstWithdrawalApproved { .. } => {}
        }
    }

    pub fn record_notification_failure(&self) {
        self.notification_failures.inc();
    }

    pub fn bonus_unlocks(&self) -> u64 {
        self.bonus_unlocks.get()
    }

    pub fn notification_failures(&self) -> u64 {
        self.notification_failures.get()
    }

    /// Prometheus text exposition of every registered counter.
    pub fn render(&self) -> anyhow::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
