// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Post-commit ledger events
//!
//! Ledger operations commit their own table changes and then hand the
//! resulting events to [`EventDispatcher::publish`]. The dispatcher drains
//! them in order, counting each one and turning it into supplier
//! notifications. The first approval's `BonusUnlocked` events are produced
//! inside the approval transaction and arrive right behind
//! `FirstWithdrawalApproved`.

use crate::bonus::BonusKind;
use crate::monitoring::LedgerMetrics;
use crate::notify::{Notification, NotificationKind, Notifier};
use crate::submissions::SubmissionStatus;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    SupplierRegistered {
        supplier_id: Uuid,
        username: String,
        referral_awarded: bool,
    },
    BonusGranted {
        bonus_id: Uuid,
        supplier_id: Uuid,
        kind: BonusKind,
        amount: i64,
    },
    SubmissionStatusChanged {
        submission_id: Uuid,
        supplier_id: Uuid,
        email: String,
        previous: SubmissionStatus,
        status: SubmissionStatus,
        amount: i64,
    },
    SubmissionsUploaded {
        supplier_id: Uuid,
        created: usize,
        duplicates: Vec<String>,
    },
    WithdrawalRequested {
        withdrawal_id: Uuid,
        supplier_id: Uuid,
        amount: i64,
        claimed: usize,
    },
    WithdrawalApproved {
        withdrawal_id: Uuid,
        supplier_id: Uuid,
        amount: i64,
        approved_count: usize,
    },
    WithdrawalRejected {
        withdrawal_id: Uuid,
        supplier_id: Uuid,
        amount: i64,
        released: usize,
    },
    FirstWithdrawalApproved {
        supplier_id: Uuid,
    },
    BonusUnlocked {
        bonus_id: Uuid,
        supplier_id: Uuid,
        kind: BonusKind,
        amount: i64,
    },
    BonusWithdrawalRequested {
        bonus_withdrawal_id: Uuid,
        supplier_id: Uuid,
        kind: BonusKind,
        amount: i64,
    },
    BonusWithdrawalApproved {
        bonus_withdrawal_id: Uuid,
        supplier_id: Uuid,
        kind: BonusKind,
        amount: i64,
    },
    BonusWithdrawalRejected {
        bonus_withdrawal_id: Uuid,
        supplier_id: Uuid,
        kind: BonusKind,
        amount: i64,
    },
}

impl LedgerEvent {
    /// Notification owed to the affected supplier, if any.
    pub fn notification(&self) -> Option<Notification> {
        let notification = match self {
            LedgerEvent::SupplierRegistered {
                supplier_id,
                username,
                referral_awarded,
            } => {
                let mut message = format!(
                    "Welcome {}! Your account has been successfully created.",
                    username
                );
                if *referral_awarded {
                    message.push_str(" Referral bonus awarded successfully.");
                }
                Notification::new(
                    *supplier_id,
                    "Welcome to the Platform",
                    message,
                    NotificationKind::Success,
                )
            }
            LedgerEvent::SubmissionStatusChanged {
                submission_id,
                supplier_id,
                email,
                status,
                ..
            } => Notification::new(
                *supplier_id,
                "Email Status Updated",
                format!(
                    "The status of your email ({}) has been changed to \"{}\".",
                    email, status
                ),
                NotificationKind::Info,
            )
            .with_metadata(json!({ "submission_id": submission_id })),
            LedgerEvent::SubmissionsUploaded {
                supplier_id,
                created,
                duplicates,
            } => {
                if duplicates.is_empty() {
                    Notification::new(
                        *supplier_id,
                        "New Email(s) Uploaded",
                        format!("{} new email(s) have been successfully uploaded.", created),
                        NotificationKind::Success,
                    )
                } else {
                    let title = if duplicates.len() == 1 {
                        "Duplicate Email Found"
                    } else {
                        "Duplicate Emails Found"
                    };
                    let mut message =
                        format!("{} duplicate email(s) detected.", duplicates.len());
                    if *created > 0 {
                        message.push_str(&format!(
                            " The remaining {} email(s) were uploaded successfully.",
                            created
                        ));
                    }
                    Notification::new(*supplier_id, title, message, NotificationKind::DuplicateEmail)
                        .with_metadata(json!({ "duplicate_emails": duplicates }))
                }
            }
            LedgerEvent::WithdrawalRequested {
                withdrawal_id,
                supplier_id,
                amount,
                ..
            } => Notification::new(
                *supplier_id,
                "Withdrawal Requested",
                format!("Your withdrawal request for {} is pending review.", amount),
                NotificationKind::Info,
            )
            .with_metadata(json!({ "withdrawal_id": withdrawal_id })),
            LedgerEvent::WithdrawalApproved {
                withdrawal_id,
                supplier_id,
                amount,
                ..
            } => Notification::new(
                *supplier_id,
                "Withdrawal Approved",
                format!("Your withdrawal of {} has been approved.", amount),
                NotificationKind::Success,
            )
            .with_metadata(json!({ "withdrawal_id": withdrawal_id })),
            LedgerEvent::WithdrawalRejected {
                withdrawal_id,
                supplier_id,
                amount,
                ..
            } => Notification::new(
                *supplier_id,
                "Withdrawal Rejected",
                format!(
                    "Your withdrawal of {} has been rejected. The emails are available to withdraw again.",
                    amount
                ),
                NotificationKind::Warning,
            )
            .with_metadata(json!({ "withdrawal_id": withdrawal_id })),
            LedgerEvent::BonusUnlocked {
                bonus_id,
                supplier_id,
                kind,
                amount,
            } => {
                let (title, message) = match kind {
                    BonusKind::Signup => (
                        "Signup Bonus Unlocked",
                        format!(
                            "Your signup bonus of {} is now available after your first approved withdrawal.",
                            amount
                        ),
                    ),
                    BonusKind::Referral => (
                        "Referral Bonus Unlocked",
                        format!(
                            "Your referral bonus of {} is now available because your referral completed their first withdrawal.",
                            amount
                        ),
                    ),
                };
                Notification::new(*supplier_id, title, message, NotificationKind::Success)
                    .with_metadata(json!({ "bonus_id": bonus_id }))
            }
            LedgerEvent::BonusWithdrawalApproved {
                bonus_withdrawal_id,
                supplier_id,
                kind,
                amount,
            } => Notification::new(
                *supplier_id,
                "Bonus Withdrawal Approved",
                format!("Your {} bonus withdrawal of {} has been approved.", kind, amount),
                NotificationKind::Success,
            )
            .with_metadata(json!({ "bonus_withdrawal_id": bonus_withdrawal_id })),
            LedgerEvent::BonusWithdrawalRejected {
                bonus_withdrawal_id,
                supplier_id,
                kind,
                amount,
            } => Notification::new(
                *supplier_id,
                "Bonus Withdrawal Rejected",
                format!("Your {} bonus withdrawal of {} has been rejected.", kind, amount),
                NotificationKind::Warning,
            )
            .with_metadata(json!({ "bonus_withdrawal_id": bonus_withdrawal_id })),
            LedgerEvent::BonusGranted { .. }
            | LedgerEvent::FirstWithdrawalApproved { .. }
            | LedgerEvent::BonusWithdrawalRequested { .. } => return None,
        };

        Some(notification)
    }
}

/// Drains ledger events after their transaction has committed.
#[derive(Clone)]
pub struct EventDispatcher {
    notifier: Arc<dyn Notifier>,
    metrics: LedgerMetrics,
}

impl EventDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>, metrics: LedgerMetrics) -> Self {
        Self { notifier, metrics }
    }

    /// Counts and delivers `events` in order.
    pub async fn publish(&self, events: Vec<LedgerEvent>) {
        for event in events {
            debug!(?event, "Dispatching ledger event");
            self.metrics.record(&event);

            if let Some(notification) = event.notification() {
                self.deliver(notification).await;
            }
        }
    }

    async fn deliver(&self, notification: Notification) {
        let supplier_id = notification.supplier_id;
        let title = notification.title.clone();
        if let Err(e) = self.notifier.notify(notification).await {
            self.metrics.record_notification_failure();
            warn!(
                supplier_id = %supplier_id,
                "Failed to deliver notification '{}': {}", title, e
            );
        }
    }
}
