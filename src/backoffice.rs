// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Composition root
//!
//! Wires one store into the settings, dispatcher, ledgers and workflows so
//! every component shares the same tables and the same notifier.

use crate::bonus::{BonusLedger, BonusWithdrawalWorkflow};
use crate::config::AppConfig;
use crate::events::EventDispatcher;
use crate::monitoring::LedgerMetrics;
use crate::notify::Notifier;
use crate::settings::{RewardSettingProvider, SystemSettings};
use crate::stats::LedgerStats;
use crate::store::Store;
use crate::submissions::SubmissionLedger;
use crate::supplier::SupplierRegistry;
use crate::withdrawals::WithdrawalWorkflow;
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct Backoffice {
    pub store: Store,
    pub settings: Arc<SystemSettings>,
    pub metrics: LedgerMetrics,
    pub dispatcher: EventDispatcher,
    pub suppliers: SupplierRegistry,
    pub submissions: SubmissionLedger,
    pub withdrawals: WithdrawalWorkflow,
    pub bonuses: BonusLedger,
    pub bonus_withdrawals: BonusWithdrawalWorkflow,
}

impl Backoffice {
    pub fn new(store: Store, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let metrics = LedgerMetrics::new()?;
        let settings = Arc::new(SystemSettings::new(store.clone()));
        let provider: Arc<dyn RewardSettingProvider> = settings.clone();

        let bonuses = BonusLedger::new(store.clone());
        let dispatcher = EventDispatcher::new(notifier, metrics.clone());

        Ok(Self {
            suppliers: SupplierRegistry::new(store.clone(), provider.clone(), dispatcher.clone()),
            submissions: SubmissionLedger::new(store.clone(), provider.clone(), dispatcher.clone()),
            withdrawals: WithdrawalWorkflow::new(store.clone(), dispatcher.clone()),
            bonus_withdrawals: BonusWithdrawalWorkflow::new(
                store.clone(),
                provider,
                dispatcher.clone(),
            ),
            bonuses,
            dispatcher,
            metrics,
            settings,
            store,
        })
    }

    /// In-memory back office with default settings.
    pub fn in_memory(notifier: Arc<dyn Notifier>) -> Result<Self> {
        Self::new(Store::in_memory(), notifier)
    }

    /// Opens the configured store and seeds reward defaults that have never
    /// been set.
    pub async fn from_config(config: &AppConfig, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let store = Store::open(&config.store).await?;
        let backoffice = Self::new(store, notifier)?;
        backoffice.settings.seed_defaults(&config.rewards).await?;

        info!(
            "Back office ready (email reward {})",
            backoffice.settings.current_reward().await
        );
        Ok(backoffice)
    }

    pub async fn stats(&self, top_limit: usize) -> LedgerStats {
        LedgerStats::collect(&self.store, top_limit).await
    }
}
