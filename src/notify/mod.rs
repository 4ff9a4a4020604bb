// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Supplier notifications
//!
//! Delivery is fire-and-forget: the dispatcher logs a failed `notify` and
//! moves on, so a flaky channel never rolls back a ledger change.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    DuplicateEmail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        supplier_id: Uuid,
        title: impl Into<String>,
        message: impl Into<String>,
        kind: NotificationKind,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            supplier_id,
            title: title.into(),
            message: message.into(),
            kind,
            metadata: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: Notification) -> anyhow::Result<()>;
}

/// Writes notifications to the log only.
#[derive(Debug, Clone, Default)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, notification: Notification) -> anyhow::Result<()> {
        info!(
            supplier_id = %notification.supplier_id,
            kind = ?notification.kind,
            "🔔 {}: {}",
            notification.title,
            notification.message
        );
        Ok(())
    }
}

/// Keeps every notification in memory so suppliers can list their inbox.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    inbox: Arc<RwLock<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn for_supplier(&self, supplier_id: Uuid) -> Vec<Notification> {
        self.inbox
            .read()
            .await
            .iter()
            .filter(|n| n.supplier_id == supplier_id)
            .cloned()
            .collect()
    }

    pub async fn all(&self) -> Vec<Notification> {
        self.inbox.read().await.clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: Notification) -> anyhow::Result<()> {
        TracingNotifier.notify(notification.clone()).await?;
        self.inbox.write().await.push(notification);
        Ok(())
    }
}
