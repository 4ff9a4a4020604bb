// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod ledger;
pub mod transition;
pub mod types;

pub use ledger::SubmissionLedger;
pub use transition::{next_amount, plan_transition, Transition};
pub use types::{
    parse_email_list, BulkEntryOutcome, BulkFailure, BulkUpdateSummary, ClaimedStatus,
    StatusChange, Submission, SubmissionFilter, SubmissionState, SubmissionStatus,
    SubmissionView,
};
