// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod types;
pub mod workflow;

pub use types::{ResolveAction, Resolution, Withdrawal, WithdrawalFilter, WithdrawalStatus};
pub use workflow::WithdrawalWorkflow;
