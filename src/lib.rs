// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod backoffice;
pub mod bonus;
pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod monitoring;
pub mod notify;
pub mod settings;
pub mod stats;
pub mod store;
pub mod submissions;
pub mod supplier;
pub mod version;
pub mod withdrawals;

// Re-export main types
pub use backoffice::Backoffice;
pub use bonus::{Bonus, BonusKind, BonusLedger, BonusWithdrawal, BonusWithdrawalWorkflow};
pub use config::AppConfig;
pub use error::{LedgerError, LedgerResult};
pub use events::{EventDispatcher, LedgerEvent};
pub use notify::{Notification, NotificationKind, Notifier, RecordingNotifier, TracingNotifier};
pub use settings::{RewardSettingProvider, SettingKey, SystemSettings, DEFAULT_EMAIL_REWARD};
pub use store::Store;
pub use submissions::{StatusChange, Submission, SubmissionLedger, SubmissionState, SubmissionStatus};
pub use supplier::{PayoutMethodOverride, SupplierRegistry};
pub use withdrawals::{ResolveAction, Resolution, Withdrawal, WithdrawalStatus, WithdrawalWorkflow};
