// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::common::{harness, Harness};
use reward_ledger_node::{
    withdrawals::WithdrawalFilter, BonusKind, LedgerError, Resolution, SettingKey,
    SubmissionStatus, WithdrawalStatus,
};
use uuid::Uuid;

/// Supplier with an unlocked signup bonus of 5.
async fn unlocked_supplier(h: &Harness, username: &str) -> Uuid {
    h.backoffice
        .settings
        .set(SettingKey::DefaultSignupBonus, 5)
        .await
        .unwrap();
    let supplier = h.supplier(username).await;
    h.submissions(supplier, 1, SubmissionStatus::Good).await;
    let withdrawal = h
        .backoffice
        .withdrawals
        .request_withdrawal(supplier, None)
        .await
        .unwrap();
    h.backoffice
        .withdrawals
        .resolve(withdrawal.id, Resolution::approve("paid"))
        .await
        .unwrap();
    supplier
}

#[tokio::test]
async fn test_locked_bonus_cannot_be_withdrawn() {
    let h = harness();
    h.backoffice
        .settings
        .set(SettingKey::DefaultSignupBonus, 5)
        .await
        .unwrap();
    let supplier = h.supplier("alice").await;

    let err = h
        .backoffice
        .bonus_withdrawals
        .request(supplier, BonusKind::Signup, None)
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::NothingToWithdraw { supplier_id: supplier });
}

#[tokio::test]
async fn test_approved_bonus_withdrawal_marks_bonuses_withdrawn() {
    let h = harness();
    let supplier = unlocked_supplier(&h, "bob").await;

    let request = h
        .backoffice
        .bonus_withdrawals
        .request(supplier, BonusKind::Signup, None)
        .await
        .unwrap();
    assert_eq!(request.amount, 5);
    assert_eq!(request.status, WithdrawalStatus::Pending);
    assert_eq!(request.bonus_ids.len(), 1);

    let approved = h
        .backoffice
        .bonus_withdrawals
        .resolve(request.id, Resolution::approve("sent"))
        .await
        .unwrap();
    assert_eq!(approved.status, WithdrawalStatus::Approved);

    let bonuses = h.backoffice.bonuses.list_for(supplier).await;
    assert!(bonuses[0].is_withdrawn);

    let err = h
        .backoffice
        .bonus_withdrawals
        .request(supplier, BonusKind::Signup, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "nothing_to_withdraw");

    let inbox = h.inbox.for_supplier(supplier).await;
    assert!(inbox.iter().any(|n| n.title == "Bonus Withdrawal Approved"));
}

#[tokio::test]
async fn test_one_pending_request_per_kind() {
    let h = harness();
    let supplier = unlocked_supplier(&h, "carol").await;

    h.backoffice
        .bonus_withdrawals
        .request(supplier, BonusKind::Signup, None)
        .await
        .unwrap();
    let err = h
        .backoffice
        .bonus_withdrawals
        .request(supplier, BonusKind::Signup, None)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        LedgerError::PendingBonusWithdrawal {
            supplier_id: supplier,
            kind: "signup".into()
        }
    );
}

#[tokio::test]
async fn test_rejected_bonus_withdrawal_can_be_requested_again() {
    let h = harness();
    let supplier = unlocked_supplier(&h, "dave").await;

    let first = h
        .backoffice
        .bonus_withdrawals
        .request(supplier, BonusKind::Signup, None)
        .await
        .unwrap();
    let rejected = h
        .backoffice
        .bonus_withdrawals
        .resolve(first.id, Resolution::reject(Some("duplicate account".into())))
        .await
        .unwrap();
    assert_eq!(rejected.status, WithdrawalStatus::Rejected);
    assert!(!h.backoffice.bonuses.list_for(supplier).await[0].is_withdrawn);

    let second = h
        .backoffice
        .bonus_withdrawals
        .request(supplier, BonusKind::Signup, None)
        .await
        .unwrap();
    assert_eq!(second.amount, 5);

    let pending = h
        .backoffice
        .bonus_withdrawals
        .list(&WithdrawalFilter {
            status: Some(WithdrawalStatus::Pending),
            supplier_id: Some(supplier),
        })
        .await;
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, second.id);
}

#[tokio::test]
async fn test_referral_withdrawal_respects_threshold() {
    let h = harness();
    h.backoffice
        .settings
        .set(SettingKey::DefaultReferralBonus, 10)
        .await
        .unwrap();
    h.backoffice
        .settings
        .set(SettingKey::ReferralWithdrawalThreshold, 25)
        .await
        .unwrap();
    let referrer = h.supplier("rita").await;
    let referee = h.supplier_referred_by("sam", Some("rita")).await;
    h.submissions(referee, 1, SubmissionStatus::Good).await;
    let withdrawal = h
        .backoffice
        .withdrawals
        .request_withdrawal(referee, None)
        .await
        .unwrap();
    h.backoffice
        .withdrawals
        .resolve(withdrawal.id, Resolution::approve("paid"))
        .await
        .unwrap();

    let err = h
        .backoffice
        .bonus_withdrawals
        .request(referrer, BonusKind::Referral, None)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        LedgerError::BelowThreshold {
            amount: 10,
            threshold: 25
        }
    );

    h.backoffice
        .settings
        .set(SettingKey::ReferralWithdrawalThreshold, 10)
        .await
        .unwrap();
    let request = h
        .backoffice
        .bonus_withdrawals
        .request(referrer, BonusKind::Referral, None)
        .await
        .unwrap();
    assert_eq!(request.amount, 10);
}

#[tokio::test]
async fn test_bonus_approval_requires_remarks() {
    let h = harness();
    let supplier = unlocked_supplier(&h, "erin").await;
    let request = h
        .backoffice
        .bonus_withdrawals
        .request(supplier, BonusKind::Signup, None)
        .await
        .unwrap();

    let err = h
        .backoffice
        .bonus_withdrawals
        .resolve(request.id, Resolution::approve(""))
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::MissingRemarks);
    assert!(!h.backoffice.bonuses.list_for(supplier).await[0].is_withdrawn);
}
