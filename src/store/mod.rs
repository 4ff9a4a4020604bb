// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Ledger Store
//!
//! In-memory tables guarded by a single async `RwLock`. Writers go through
//! [`Store::transact`], which runs the mutation against a scratch copy and
//! only swaps it in once the closure succeeds and the snapshot (if any) has
//! been written. A failed operation therefore leaves no partial writes.

pub mod snapshot;

pub use snapshot::SnapshotFile;

use crate::bonus::{Bonus, BonusKind, BonusWithdrawal};
use crate::config::StoreConfig;
use crate::error::LedgerResult;
use crate::submissions::Submission;
use crate::supplier::{PayoutMethod, Supplier};
use crate::withdrawals::{Withdrawal, WithdrawalStatus};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

/// Every persisted record of the ledger.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tables {
    pub suppliers: HashMap<Uuid, Supplier>,
    pub payout_methods: HashMap<Uuid, PayoutMethod>,
    pub submissions: HashMap<Uuid, Submission>,
    pub withdrawals: HashMap<Uuid, Withdrawal>,
    pub bonuses: HashMap<Uuid, Bonus>,
    pub bonus_withdrawals: HashMap<Uuid, BonusWithdrawal>,
    pub settings: BTreeMap<String, String>,
}

impl Tables {
    pub fn supplier_by_username(&self, username: &str) -> Option<&Supplier> {
        self.suppliers
            .values()
            .find(|s| s.username.eq_ignore_ascii_case(username))
    }

    pub fn submission_by_email(&self, email: &str) -> Option<&Submission> {
        self.submissions
            .values()
            .find(|s| s.email.eq_ignore_ascii_case(email))
    }

    pub fn default_payout_method(&self, supplier_id: Uuid) -> Option<&PayoutMethod> {
        self.payout_methods
            .values()
            .find(|m| m.supplier_id == supplier_id && m.is_default)
    }

    pub fn submissions_of(&self, supplier_id: Uuid) -> impl Iterator<Item = &Submission> {
        self.submissions
            .values()
            .filter(move |s| s.supplier_id == supplier_id)
    }

    pub fn approved_withdrawal_count(&self, supplier_id: Uuid) -> usize {
        self.withdrawals
            .values()
            .filter(|w| w.supplier_id == supplier_id && w.status == WithdrawalStatus::Approved)
            .count()
    }

    pub fn has_pending_bonus_withdrawal(&self, supplier_id: Uuid, kind: BonusKind) -> bool {
        self.bonus_withdrawals.values().any(|w| {
            w.supplier_id == supplier_id && w.kind == kind && w.status == WithdrawalStatus::Pending
        })
    }
}

/// Shared handle to the ledger tables.
#[derive(Clone)]
pub struct Store {
    tables: Arc<RwLock<Tables>>,
    snapshot: Option<SnapshotFile>,
}

impl Store {
    /// Store that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables::default())),
            snapshot: None,
        }
    }

    /// Opens the store described by `config`, loading the snapshot file when
    /// one is configured and present.
    pub async fn open(config: &StoreConfig) -> LedgerResult<Self> {
        let Some(path) = &config.snapshot_path else {
            info!("Ledger store running in memory only");
            return Ok(Self::in_memory());
        };

        let snapshot = SnapshotFile::new(path);
        let tables = snapshot.load().await?.unwrap_or_default();
        info!(
            "Ledger store opened from {} ({} submissions, {} withdrawals)",
            path.display(),
            tables.submissions.len(),
            tables.withdrawals.len()
        );

        Ok(Self {
            tables: Arc::new(RwLock::new(tables)),
            snapshot: Some(snapshot),
        })
    }

    /// Runs a read-only query against a consistent view of the tables.
    pub async fn read<T>(&self, query: impl FnOnce(&Tables) -> T) -> T {
        let tables = self.tables.read().await;
        query(&tables)
    }

    /// Applies `mutation` atomically.
    ///
    /// Writers are serialized by the table lock, so two transactions never
    /// observe each other's intermediate state.
    pub async fn transact<T>(
        &self,
        mutation: impl FnOnce(&mut Tables) -> LedgerResult<T>,
    ) -> LedgerResult<T> {
        let mut tables = self.tables.write().await;
        let mut scratch = tables.clone();

        let output = mutation(&mut scratch)?;

        if let Some(snapshot) = &self.snapshot {
            snapshot.save(&scratch).await?;
        }

        *tables = scratch;
        debug!("Ledger transaction committed");
        Ok(output)
    }
}
