// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::common::harness;
use futures::future::join_all;
use reward_ledger_node::{
    LedgerError, PayoutMethodOverride, SubmissionStatus, WithdrawalStatus,
};
use uuid::Uuid;

#[tokio::test]
async fn test_scenario_c_claims_only_open_good_submissions() {
    let h = harness();
    let supplier = h.supplier("alice").await;
    let good = h.submissions(supplier, 2, SubmissionStatus::Good).await;
    let bad = h.submissions(supplier, 1, SubmissionStatus::Bad).await;
    let pending = h.submissions(supplier, 1, SubmissionStatus::Pending).await;

    let withdrawal = h
        .backoffice
        .withdrawals
        .request_withdrawal(supplier, None)
        .await
        .unwrap();

    assert_eq!(withdrawal.amount, 40);
    assert_eq!(withdrawal.status, WithdrawalStatus::Pending);
    assert_eq!(withdrawal.payout.method_type, "paypal");
    assert_eq!(withdrawal.payout.account_number, "alice@pay.test");

    let mut claimed = withdrawal.claimed_submission_ids.clone();
    claimed.sort();
    let mut expected = good.clone();
    expected.sort();
    assert_eq!(claimed, expected);

    for id in &good {
        assert!(h.submission(*id).await.is_withdrawn);
    }
    assert!(!h.submission(bad[0]).await.is_withdrawn);
    assert!(!h.submission(pending[0]).await.is_withdrawn);

    let inbox = h.inbox.for_supplier(supplier).await;
    assert!(inbox.iter().any(|n| n.title == "Withdrawal Requested"));
}

#[tokio::test]
async fn test_nothing_left_to_withdraw_after_claim() {
    let h = harness();
    let supplier = h.supplier("bob").await;
    h.submissions(supplier, 1, SubmissionStatus::Good).await;

    h.backoffice
        .withdrawals
        .request_withdrawal(supplier, None)
        .await
        .unwrap();
    let err = h
        .backoffice
        .withdrawals
        .request_withdrawal(supplier, None)
        .await
        .unwrap_err();

    assert_eq!(err, LedgerError::NothingToWithdraw { supplier_id: supplier });
}

#[tokio::test]
async fn test_no_payout_method_is_rejected_before_claiming() {
    let h = harness();
    let supplier = h
        .backoffice
        .suppliers
        .register_supplier("carol", None)
        .await
        .unwrap()
        .supplier
        .id;
    let ids = h.submissions(supplier, 1, SubmissionStatus::Good).await;

    let err = h
        .backoffice
        .withdrawals
        .request_withdrawal(supplier, None)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "no_payout_method");
    assert!(!h.submission(ids[0]).await.is_withdrawn);
}

#[tokio::test]
async fn test_partial_override_is_merged_with_default_method() {
    let h = harness();
    let supplier = h.supplier("dave").await;
    h.submissions(supplier, 1, SubmissionStatus::Good).await;

    let withdrawal = h
        .backoffice
        .withdrawals
        .request_withdrawal(
            supplier,
            Some(PayoutMethodOverride {
                method_type: None,
                account_number: Some("  other@pay.test ".into()),
            }),
        )
        .await
        .unwrap();

    assert_eq!(withdrawal.payout.method_type, "paypal");
    assert_eq!(withdrawal.payout.account_number, "other@pay.test");
}

#[tokio::test]
async fn test_full_override_needs_no_stored_method() {
    let h = harness();
    let supplier = h
        .backoffice
        .suppliers
        .register_supplier("erin", None)
        .await
        .unwrap()
        .supplier
        .id;
    h.submissions(supplier, 1, SubmissionStatus::Good).await;

    let withdrawal = h
        .backoffice
        .withdrawals
        .request_withdrawal(
            supplier,
            Some(PayoutMethodOverride {
                method_type: Some("bank".into()),
                account_number: Some("DE89 3704".into()),
            }),
        )
        .await
        .unwrap();

    assert_eq!(withdrawal.payout.method_type, "bank");
    assert_eq!(withdrawal.amount, 20);
}

#[tokio::test]
async fn test_concurrent_requests_claim_each_submission_once() {
    let h = harness();
    let supplier = h.supplier("frank").await;
    h.submissions(supplier, 3, SubmissionStatus::Good).await;

    let workflow = h.backoffice.withdrawals.clone();
    let results = join_all((0..4).map(|_| workflow.request_withdrawal(supplier, None))).await;

    let succeeded: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(succeeded.len(), 1);
    assert_eq!(succeeded[0].amount, 60);
    assert!(results
        .iter()
        .filter(|r| r.is_err())
        .all(|r| matches!(r, Err(LedgerError::NothingToWithdraw { .. }))));
}

#[tokio::test]
async fn test_unknown_supplier_cannot_withdraw() {
    let h = harness();
    let err = h
        .backoffice
        .withdrawals
        .request_withdrawal(Uuid::new_v4(), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "not_found");
}

#[tokio::test]
async fn test_clawbacks_do_not_reduce_new_claims() {
    let h = harness();
    let supplier = h.supplier("gina").await;
    let first = h.submissions(supplier, 1, SubmissionStatus::Good).await;
    h.backoffice
        .withdrawals
        .request_withdrawal(supplier, None)
        .await
        .unwrap();
    h.backoffice
        .submissions
        .apply_status_change(first[0], SubmissionStatus::Bad, None)
        .await
        .unwrap();

    h.submissions(supplier, 1, SubmissionStatus::Good).await;
    let second = h
        .backoffice
        .withdrawals
        .request_withdrawal(supplier, None)
        .await
        .unwrap();

    // The -20 clawback stays on the claimed row and is not netted here.
    assert_eq!(second.amount, 20);
    let balance = h.backoffice.suppliers.supplier_balance(supplier).await.unwrap();
    assert_eq!(balance.available, 0);
    assert_eq!(balance.clawbacks, -20);
}
