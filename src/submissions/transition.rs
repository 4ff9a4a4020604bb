// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Status transition rules for submissions
//!
//! The amount a submission contributes to the ledger is derived only from
//! (previous status, previous withdraw-lock, new status) and the reward in
//! force at the moment of the transition:
//!
//! | previous       | withdrawn | new            | amount   |
//! |----------------|-----------|----------------|----------|
//! | pending / bad  | any       | good           | +reward  |
//! | good           | false     | bad / pending  | 0        |
//! | good           | true      | bad / pending  | -reward  |
//! | pending        | any       | bad            | 0        |
//! | bad            | any       | pending        | 0        |

use super::types::{Submission, SubmissionState, SubmissionStatus};
use crate::error::{LedgerError, LedgerResult};

/// Amount after moving from `previous` to `new`, or `None` when the status
/// does not change.
pub fn next_amount(
    previous: SubmissionStatus,
    is_withdrawn: bool,
    new: SubmissionStatus,
    reward: i64,
) -> Option<i64> {
    use SubmissionStatus::*;

    match (previous, new) {
        (Pending, Pending) | (Good, Good) | (Bad, Bad) => None,
        (Pending | Bad, Good) => Some(reward),
        (Good, Bad | Pending) if is_withdrawn => Some(-reward),
        (Good, Bad | Pending) => Some(0),
        (Pending, Bad) | (Bad, Pending) => Some(0),
    }
}

/// What applying a verdict to a submission would do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Unchanged,
    Apply { state: SubmissionState, amount: i64 },
}

/// Validates a verdict against the withdraw-lock and computes the new state.
pub fn plan_transition(
    submission: &Submission,
    new_status: SubmissionStatus,
    reward: i64,
) -> LedgerResult<Transition> {
    let previous = submission.status();

    if previous == new_status {
        return Ok(Transition::Unchanged);
    }

    let state = submission
        .state
        .with_status(new_status)
        .ok_or(LedgerError::WithdrawnLocked {
            submission_id: submission.id,
        })?;

    let amount = next_amount(previous, submission.is_withdrawn(), new_status, reward)
        .unwrap_or(submission.amount);

    Ok(Transition::Apply { state, amount })
}
