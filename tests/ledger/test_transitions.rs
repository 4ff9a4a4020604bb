// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::common::harness;
use reward_ledger_node::{settings::SettingKey, LedgerError, StatusChange, SubmissionStatus};
use uuid::Uuid;

#[tokio::test]
async fn test_scenario_a_good_then_bad_before_claim() {
    let h = harness();
    let supplier = h.supplier("alice").await;
    let ids = h.submissions(supplier, 1, SubmissionStatus::Pending).await;

    let change = h
        .backoffice
        .submissions
        .apply_status_change(ids[0], SubmissionStatus::Good, Some("looks real".into()))
        .await
        .unwrap();
    assert!(change.is_updated());
    assert_eq!(h.submission(ids[0]).await.amount, 20);

    h.backoffice
        .submissions
        .apply_status_change(ids[0], SubmissionStatus::Bad, None)
        .await
        .unwrap();

    let submission = h.submission(ids[0]).await;
    assert_eq!(submission.status, SubmissionStatus::Bad);
    assert_eq!(submission.amount, 0);
    assert!(!submission.is_withdrawn);
}

#[tokio::test]
async fn test_same_status_is_reported_without_write() {
    let h = harness();
    let supplier = h.supplier("bob").await;
    let ids = h.submissions(supplier, 1, SubmissionStatus::Good).await;
    let before = h.submission(ids[0]).await;
    let notifications_before = h.inbox.for_supplier(supplier).await.len();

    let change = h
        .backoffice
        .submissions
        .apply_status_change(ids[0], SubmissionStatus::Good, Some("again".into()))
        .await
        .unwrap();

    assert_eq!(
        change,
        StatusChange::Unchanged {
            submission_id: ids[0],
            status: SubmissionStatus::Good
        }
    );
    assert_eq!(change.message(), "Status is already 'good'. No update needed.");
    assert_eq!(h.submission(ids[0]).await, before);
    assert_eq!(
        h.inbox.for_supplier(supplier).await.len(),
        notifications_before
    );
}

#[tokio::test]
async fn test_status_change_notifies_owner() {
    let h = harness();
    let supplier = h.supplier("carol").await;
    let ids = h.submissions(supplier, 1, SubmissionStatus::Pending).await;
    let email = h.submission(ids[0]).await.email;

    h.backoffice
        .submissions
        .apply_status_change(ids[0], SubmissionStatus::Bad, None)
        .await
        .unwrap();

    let inbox = h.inbox.for_supplier(supplier).await;
    let last = inbox.last().unwrap();
    assert_eq!(last.title, "Email Status Updated");
    assert_eq!(
        last.message,
        format!("The status of your email ({}) has been changed to \"bad\".", email)
    );
}

#[tokio::test]
async fn test_claimed_submission_cannot_be_revived() {
    let h = harness();
    let supplier = h.supplier("dave").await;
    let ids = h.submissions(supplier, 1, SubmissionStatus::Good).await;
    h.backoffice
        .withdrawals
        .request_withdrawal(supplier, None)
        .await
        .unwrap();

    let err = h
        .backoffice
        .submissions
        .apply_status_change(ids[0], SubmissionStatus::Pending, None)
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::WithdrawnLocked { submission_id: ids[0] });

    let submission = h.submission(ids[0]).await;
    assert_eq!(submission.status, SubmissionStatus::Good);
    assert_eq!(submission.amount, 20);
    assert!(submission.is_withdrawn);
}

#[tokio::test]
async fn test_claimed_good_demoted_to_bad_is_clawed_back() {
    let h = harness();
    let supplier = h.supplier("erin").await;
    let ids = h.submissions(supplier, 1, SubmissionStatus::Good).await;
    h.backoffice
        .withdrawals
        .request_withdrawal(supplier, None)
        .await
        .unwrap();

    h.backoffice
        .submissions
        .apply_status_change(ids[0], SubmissionStatus::Bad, Some("fraud".into()))
        .await
        .unwrap();

    let submission = h.submission(ids[0]).await;
    assert_eq!(submission.status, SubmissionStatus::Bad);
    assert_eq!(submission.amount, -20);
    assert!(submission.is_withdrawn);

    // Once demoted, a claimed submission is locked to bad.
    let err = h
        .backoffice
        .submissions
        .apply_status_change(ids[0], SubmissionStatus::Good, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "withdrawn_locked");
}

#[tokio::test]
async fn test_reward_is_read_at_transition_time() {
    let h = harness();
    let supplier = h.supplier("frank").await;
    let ids = h.submissions(supplier, 2, SubmissionStatus::Pending).await;

    h.backoffice
        .submissions
        .apply_status_change(ids[0], SubmissionStatus::Good, None)
        .await
        .unwrap();
    h.backoffice
        .settings
        .set(SettingKey::DefaultEmailReward, 35)
        .await
        .unwrap();
    h.backoffice
        .submissions
        .apply_status_change(ids[1], SubmissionStatus::Good, None)
        .await
        .unwrap();

    assert_eq!(h.submission(ids[0]).await.amount, 20);
    assert_eq!(h.submission(ids[1]).await.amount, 35);
}

#[tokio::test]
async fn test_unknown_submission_is_not_found() {
    let h = harness();
    let err = h
        .backoffice
        .submissions
        .apply_status_change(Uuid::new_v4(), SubmissionStatus::Good, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "not_found");
}

#[test]
fn test_unknown_status_value_is_rejected() {
    let err = "approved".parse::<SubmissionStatus>().unwrap_err();
    assert_eq!(err, LedgerError::InvalidStatus("approved".into()));
}
