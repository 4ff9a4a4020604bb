// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::common::harness;
use reward_ledger_node::{LedgerError, Resolution, SubmissionStatus, WithdrawalStatus};
use uuid::Uuid;

#[tokio::test]
async fn test_scenario_d_rejected_claims_return_to_pool() {
    let h = harness();
    let supplier = h.supplier("alice").await;
    let ids = h.submissions(supplier, 2, SubmissionStatus::Good).await;

    let first = h
        .backoffice
        .withdrawals
        .request_withdrawal(supplier, None)
        .await
        .unwrap();
    let rejected = h
        .backoffice
        .withdrawals
        .resolve(first.id, Resolution::reject(Some("wrong account".into())))
        .await
        .unwrap();

    assert_eq!(rejected.status, WithdrawalStatus::Rejected);
    assert_eq!(rejected.remarks.as_deref(), Some("wrong account"));
    assert!(rejected.resolved_at.is_some());
    for id in &ids {
        let submission = h.submission(*id).await;
        assert!(!submission.is_withdrawn);
        assert_eq!(submission.amount, 20);
    }

    let second = h
        .backoffice
        .withdrawals
        .request_withdrawal(supplier, None)
        .await
        .unwrap();
    assert_eq!(second.amount, 40);
    assert_ne!(second.id, first.id);
}

#[tokio::test]
async fn test_approve_requires_remarks() {
    let h = harness();
    let supplier = h.supplier("bob").await;
    h.submissions(supplier, 1, SubmissionStatus::Good).await;
    let withdrawal = h
        .backoffice
        .withdrawals
        .request_withdrawal(supplier, None)
        .await
        .unwrap();

    let err = h
        .backoffice
        .withdrawals
        .resolve(withdrawal.id, Resolution::approve("   "))
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::MissingRemarks);

    let stored = h.backoffice.withdrawals.get(withdrawal.id).await.unwrap();
    assert_eq!(stored.status, WithdrawalStatus::Pending);
}

#[tokio::test]
async fn test_second_resolve_is_not_pending_and_changes_nothing() {
    let h = harness();
    let supplier = h.supplier("carol").await;
    let ids = h.submissions(supplier, 1, SubmissionStatus::Good).await;
    let withdrawal = h
        .backoffice
        .withdrawals
        .request_withdrawal(supplier, None)
        .await
        .unwrap();

    let approved = h
        .backoffice
        .withdrawals
        .resolve(
            withdrawal.id,
            Resolution::approve("paid").with_proof("txn-001"),
        )
        .await
        .unwrap();
    assert_eq!(approved.status, WithdrawalStatus::Approved);
    assert_eq!(approved.proof.as_deref(), Some("txn-001"));

    let err = h
        .backoffice
        .withdrawals
        .resolve(withdrawal.id, Resolution::reject(None))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "not_pending");

    // A late reject must not release the paid-out claim.
    assert!(h.submission(ids[0]).await.is_withdrawn);
    assert_eq!(
        h.backoffice.withdrawals.get(withdrawal.id).await.unwrap(),
        approved
    );
}

#[tokio::test]
async fn test_approval_forgives_clawbacks() {
    let h = harness();
    let supplier = h.supplier("dave").await;
    let first = h.submissions(supplier, 1, SubmissionStatus::Good).await;
    let old = h
        .backoffice
        .withdrawals
        .request_withdrawal(supplier, None)
        .await
        .unwrap();
    h.backoffice
        .withdrawals
        .resolve(old.id, Resolution::approve("paid"))
        .await
        .unwrap();
    h.backoffice
        .submissions
        .apply_status_change(first[0], SubmissionStatus::Bad, Some("bounced".into()))
        .await
        .unwrap();
    assert_eq!(h.submission(first[0]).await.amount, -20);

    h.submissions(supplier, 2, SubmissionStatus::Good).await;
    let next = h
        .backoffice
        .withdrawals
        .request_withdrawal(supplier, None)
        .await
        .unwrap();
    h.backoffice
        .withdrawals
        .resolve(next.id, Resolution::approve("paid again"))
        .await
        .unwrap();

    let demoted = h.submission(first[0]).await;
    assert_eq!(demoted.amount, 0);
    assert_eq!(demoted.status, SubmissionStatus::Bad);
    assert!(demoted.is_withdrawn);
}

#[tokio::test]
async fn test_reject_leaves_demoted_claims_locked() {
    let h = harness();
    let supplier = h.supplier("erin").await;
    let ids = h.submissions(supplier, 2, SubmissionStatus::Good).await;
    let withdrawal = h
        .backoffice
        .withdrawals
        .request_withdrawal(supplier, None)
        .await
        .unwrap();
    h.backoffice
        .submissions
        .apply_status_change(ids[0], SubmissionStatus::Bad, None)
        .await
        .unwrap();

    h.backoffice
        .withdrawals
        .resolve(withdrawal.id, Resolution::reject(None))
        .await
        .unwrap();

    let demoted = h.submission(ids[0]).await;
    assert!(demoted.is_withdrawn);
    assert_eq!(demoted.amount, -20);

    let released = h.submission(ids[1]).await;
    assert!(!released.is_withdrawn);
    assert_eq!(released.status, SubmissionStatus::Good);
}

#[tokio::test]
async fn test_withdrawal_amount_is_a_snapshot() {
    let h = harness();
    let supplier = h.supplier("frank").await;
    let ids = h.submissions(supplier, 2, SubmissionStatus::Good).await;
    let withdrawal = h
        .backoffice
        .withdrawals
        .request_withdrawal(supplier, None)
        .await
        .unwrap();

    h.backoffice
        .submissions
        .apply_status_change(ids[0], SubmissionStatus::Bad, None)
        .await
        .unwrap();

    let stored = h.backoffice.withdrawals.get(withdrawal.id).await.unwrap();
    assert_eq!(stored.amount, 40);
}

#[tokio::test]
async fn test_resolving_unknown_withdrawal_is_not_found() {
    let h = harness();
    let err = h
        .backoffice
        .withdrawals
        .resolve(Uuid::new_v4(), Resolution::approve("paid"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "not_found");
}

#[tokio::test]
async fn test_resolution_notifies_supplier() {
    let h = harness();
    let supplier = h.supplier("gina").await;
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

    let inbox = h.inbox.for_supplier(supplier).await;
    assert!(inbox.iter().any(|n| n.title == "Withdrawal Approved"));
}

#[tokio::test]
async fn test_stats_rank_suppliers_by_approved_amount() {
    let h = harness();
    let alice = h.supplier("alice").await;
    let bob = h.supplier("bob").await;

    h.submissions(alice, 2, SubmissionStatus::Good).await;
    let paid = h
        .backoffice
        .withdrawals
        .request_withdrawal(alice, None)
        .await
        .unwrap();
    h.backoffice
        .withdrawals
        .resolve(paid.id, Resolution::approve("paid"))
        .await
        .unwrap();

    h.submissions(bob, 1, SubmissionStatus::Good).await;
    h.submissions(bob, 1, SubmissionStatus::Pending).await;
    h.backoffice
        .withdrawals
        .request_withdrawal(bob, None)
        .await
        .unwrap();

    let stats = h.backoffice.stats(1).await;
    assert_eq!(stats.submissions.total, 4);
    assert_eq!(stats.submissions.good, 3);
    assert_eq!(stats.submissions.pending, 1);
    assert_eq!(stats.withdrawals.total_withdrawn, 40);
    assert_eq!(stats.withdrawals.pending_amount, 20);
    assert_eq!(stats.top_suppliers.len(), 1);
    assert_eq!(stats.top_suppliers[0].username, "alice");
}
