// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod ledger;
pub mod types;
pub mod withdrawal;

pub use ledger::BonusLedger;
pub use types::{Bonus, BonusKind, BonusWithdrawal};
pub use withdrawal::BonusWithdrawalWorkflow;
