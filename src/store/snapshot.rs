// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use super::Tables;
use crate::error::LedgerResult;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// JSON snapshot of the full table set.
///
/// Saves go to a sibling temp file first and are renamed into place, so a
/// crash mid-write never leaves a truncated snapshot behind.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub async fn load(&self) -> LedgerResult<Option<Tables>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                let tables = serde_json::from_slice(&bytes)?;
                debug!("Loaded ledger snapshot from {}", self.path.display());
                Ok(Some(tables))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    "No ledger snapshot at {}, starting empty",
                    self.path.display()
                );
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn save(&self, tables: &Tables) -> LedgerResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let bytes = serde_json::to_vec(tables)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
