// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use super::transition::{plan_transition, Transition};
use super::types::{
    parse_email_list, BulkEntryOutcome, BulkFailure, BulkUpdateSummary, StatusChange, Submission,
    SubmissionFilter, SubmissionStatus, SubmissionView,
};
use crate::error::{LedgerError, LedgerResult};
use crate::events::{EventDispatcher, LedgerEvent};
use crate::settings::RewardSettingProvider;
use crate::store::{Store, Tables};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Where a bulk update finds each submission.
enum Target<'a> {
    Id(Uuid),
    Email(&'a str),
}

impl Target<'_> {
    fn label(&self) -> String {
        match self {
            Target::Id(id) => id.to_string(),
            Target::Email(email) => email.to_string(),
        }
    }

    fn lookup(&self, tables: &Tables) -> Option<Uuid> {
        match self {
            Target::Id(id) => tables.submissions.contains_key(id).then_some(*id),
            Target::Email(email) => tables.submission_by_email(email).map(|s| s.id),
        }
    }
}

/// Applies operator verdicts to submissions and keeps their amounts in
/// line with the transition rules.
#[derive(Clone)]
pub struct SubmissionLedger {
    store: Store,
    settings: Arc<dyn RewardSettingProvider>,
    dispatcher: EventDispatcher,
}

impl SubmissionLedger {
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

    /// Moves one submission to `new_status`.
    ///
    /// The withdraw-lock check and the write happen in one transaction, so a
    /// concurrent claim either lands first (and this fails `WithdrawnLocked`)
    /// or after (and claims the updated row).
    pub async fn apply_status_change(
        &self,
        submission_id: Uuid,
        new_status: SubmissionStatus,
        remarks: Option<String>,
    ) -> LedgerResult<StatusChange> {
        let reward = self.settings.current_reward().await;
        let change = self
            .store
            .transact(|t| {
                let id = Target::Id(submission_id)
                    .lookup(t)
                    .ok_or_else(|| LedgerError::not_found("Submission", submission_id))?;
                apply_in(t, id, new_status, remarks, reward)
            })
            .await?;

        self.announce(&change).await;
        Ok(change)
    }

    pub async fn bulk_update_by_ids(
        &self,
        ids: &[Uuid],
        new_status: SubmissionStatus,
        remarks: Option<String>,
    ) -> LedgerResult<BulkUpdateSummary> {
        if ids.is_empty() {
            return Err(LedgerError::invalid_input("ids", "at least one id is required"));
        }
        let targets: Vec<Target> = ids.iter().copied().map(Target::Id).collect();
        self.bulk_update(targets, new_status, remarks).await
    }

    /// Same as [`Self::bulk_update_by_ids`] for operator-pasted email text.
    pub async fn bulk_update_by_emails(
        &self,
        raw_emails: &str,
        new_status: SubmissionStatus,
        remarks: Option<String>,
    ) -> LedgerResult<BulkUpdateSummary> {
        let emails = parse_email_list(raw_emails);
        if emails.is_empty() {
            return Err(LedgerError::EmptyBatch);
        }
        let targets: Vec<Target> = emails.iter().map(|e| Target::Email(e)).collect();
        self.bulk_update(targets, new_status, remarks).await
    }

    /// The whole batch commits once. A record that fails its transition is
    /// left untouched and reported, so one failure never undoes the rest.
    async fn bulk_update(
        &self,
        targets: Vec<Target<'_>>,
        new_status: SubmissionStatus,
        remarks: Option<String>,
    ) -> LedgerResult<BulkUpdateSummary> {
        let reward = self.settings.current_reward().await;

        let (summary, events) = self
            .store
            .transact(|t| {
                let mut summary = BulkUpdateSummary::default();
                let mut events = Vec::new();

                for target in &targets {
                    let Some(id) = target.lookup(t) else {
                        summary.not_found.push(target.label());
                        continue;
                    };

                    match apply_in(t, id, new_status, remarks.clone(), reward) {
                        Ok(change) => match status_event(&change) {
                            Some(event) => {
                                summary.updated += 1;
                                events.push(event);
                            }
                            None => summary.skipped += 1,
                        },
                        Err(e) => {
                            warn!("Bulk status update failed for {}: {}", target.label(), e);
                            summary.failed.push(BulkFailure {
                                target: target.label(),
                                kind: e.kind().to_string(),
                                message: e.to_string(),
                            });
                        }
                    }
                }

                Ok((summary, events))
            })
            .await?;

        info!(
            status = %new_status,
            updated = summary.updated,
            skipped = summary.skipped,
            not_found = summary.not_found.len(),
            failed = summary.failed.len(),
            "Bulk status update finished"
        );

        self.dispatcher.publish(events).await;
        Ok(summary)
    }

    /// Operator upload of a supplier's emails. Addresses already on file are
    /// reported back as duplicates; new ones start `pending` and are then
    /// moved to `status` through the normal transition rules.
    pub async fn bulk_entry(
        &self,
        supplier_id: Uuid,
        raw_emails: &str,
        status: SubmissionStatus,
        remarks: Option<String>,
    ) -> LedgerResult<BulkEntryOutcome> {
        let emails = parse_email_list(raw_emails);
        if emails.is_empty() {
            return Err(LedgerError::EmptyBatch);
        }

        let reward = self.settings.current_reward().await;
        let (outcome, changes) = self
            .store
            .transact(|t| {
                if !t.suppliers.contains_key(&supplier_id) {
                    return Err(LedgerError::not_found("Supplier", supplier_id));
                }

                let mut outcome = BulkEntryOutcome::default();
                let mut changes = Vec::new();

                for email in &emails {
                    if t.submission_by_email(email).is_some() {
                        outcome.duplicates.push(email.clone());
                        continue;
                    }

                    let submission = Submission::new(supplier_id, email.clone());
                    let id = submission.id;
                    t.submissions.insert(id, submission);
                    outcome.created.push(id);

                    if status != SubmissionStatus::Pending {
                        changes.push(apply_in(t, id, status, remarks.clone(), reward)?);
                    }
                }

                Ok((outcome, changes))
            })
            .await?;

        info!(
            supplier_id = %supplier_id,
            created = outcome.created.len(),
            duplicates = outcome.duplicates.len(),
            "📥 Bulk email entry stored"
        );

        let mut events = vec![LedgerEvent::SubmissionsUploaded {
            supplier_id,
            created: outcome.created.len(),
            duplicates: outcome.duplicates.clone(),
        }];
        events.extend(changes.iter().filter_map(status_event));
        self.dispatcher.publish(events).await;

        Ok(outcome)
    }

    pub async fn get(&self, submission_id: Uuid) -> LedgerResult<SubmissionView> {
        self.store
            .read(|t| t.submissions.get(&submission_id).map(SubmissionView::from))
            .await
            .ok_or_else(|| LedgerError::not_found("Submission", submission_id))
    }

    pub async fn list(&self, filter: &SubmissionFilter) -> Vec<SubmissionView> {
        let mut views: Vec<SubmissionView> = self
            .store
            .read(|t| {
                t.submissions
                    .values()
                    .filter(|s| filter.status.map_or(true, |status| s.status() == status))
                    .filter(|s| filter.supplier_id.map_or(true, |id| s.supplier_id == id))
                    .map(SubmissionView::from)
                    .collect()
            })
            .await;
        views.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        views
    }

    async fn announce(&self, change: &StatusChange) {
        if let Some(event) = status_event(change) {
            self.dispatcher.publish(vec![event]).await;
        }
    }
}

/// Applies a verdict to a submission inside an open transaction.
fn apply_in(
    tables: &mut Tables,
    submission_id: Uuid,
    new_status: SubmissionStatus,
    remarks: Option<String>,
    reward: i64,
) -> LedgerResult<StatusChange> {
    let submission = tables
        .submissions
        .get_mut(&submission_id)
        .ok_or_else(|| LedgerError::not_found("Submission", submission_id))?;

    match plan_transition(submission, new_status, reward)? {
        Transition::Unchanged => {
            debug!(submission_id = %submission_id, "Status already {}", new_status);
            Ok(StatusChange::Unchanged {
                submission_id,
                status: new_status,
            })
        }
        Transition::Apply { state, amount } => {
            let previous = submission.status();
            submission.state = state;
            submission.amount = amount;
            submission.remarks = remarks;
            submission.updated_at = Utc::now();

            debug!(
                submission_id = %submission_id,
                amount,
                "Submission moved {} -> {}", previous, new_status
            );

            Ok(StatusChange::Updated {
                submission_id,
                supplier_id: submission.supplier_id,
                email: submission.email.clone(),
                previous,
                status: new_status,
                amount,
            })
        }
    }
}

fn status_event(change: &StatusChange) -> Option<LedgerEvent> {
    match change {
        StatusChange::Updated {
            submission_id,
            supplier_id,
            email,
            previous,
            status,
            amount,
        } => Some(LedgerEvent::SubmissionStatusChanged {
            submission_id: *submission_id,
            supplier_id: *supplier_id,
            email: email.clone(),
            previous: *previous,
            status: *status,
            amount: *amount,
        }),
        StatusChange::Unchanged { .. } => None,
    }
}
