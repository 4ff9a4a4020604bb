// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Service configuration
//!
//! Resolution order: built-in defaults, then the TOML file named by
//! `LEDGER_CONFIG` (if set), then individual `LEDGER_*` environment
//! variables. A `.env` file in the working directory is loaded first.

use crate::settings::DEFAULT_EMAIL_REWARD;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    pub operator_api_keys: Vec<String>,
    pub require_operator_key: bool,
    pub cors_allowed_origins: Vec<String>,
    pub top_suppliers_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            operator_api_keys: Vec::new(),
            require_operator_key: false,
            cors_allowed_origins: vec!["*".to_string()],
            top_suppliers_limit: 10,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON snapshot written after every committed transaction. In-memory
    /// only when unset.
    pub snapshot_path: Option<PathBuf>,
}

/// Values seeded into the settings table on first boot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardDefaults {
    pub email_reward: i64,
    pub signup_bonus: Option<i64>,
    pub referral_bonus: Option<i64>,
    pub referral_withdrawal_threshold: Option<i64>,
}

impl Default for RewardDefaults {
    fn default() -> Self {
        Self {
            email_reward: DEFAULT_EMAIL_REWARD,
            signup_bonus: None,
            referral_bonus: None,
            referral_withdrawal_threshold: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub rewards: RewardDefaults,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Defaults overridden by environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// `.env`, then `LEDGER_CONFIG`, then environment overrides.
    pub fn load() -> Result<Self> {
        if dotenv::dotenv().is_ok() {
            debug!("Loaded .env file");
        }

        let mut config = match std::env::var("LEDGER_CONFIG") {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(val) = std::env::var("LEDGER_LISTEN_ADDR") {
            match val.parse() {
                Ok(addr) => self.server.listen_addr = addr,
                Err(_) => warn!("Ignoring invalid LEDGER_LISTEN_ADDR '{}'", val),
            }
        }

        if let Ok(val) = std::env::var("LEDGER_OPERATOR_KEYS") {
            self.server.operator_api_keys = split_list(&val);
            if !self.server.operator_api_keys.is_empty() {
                self.server.require_operator_key = true;
            }
        }

        if let Ok(val) = std::env::var("LEDGER_CORS_ORIGINS") {
            self.server.cors_allowed_origins = split_list(&val);
        }

        if let Ok(val) = std::env::var("LEDGER_SNAPSHOT_PATH") {
            if !val.trim().is_empty() {
                self.store.snapshot_path = Some(PathBuf::from(val.trim()));
            }
        }

        if let Ok(val) = std::env::var("LEDGER_DEFAULT_EMAIL_REWARD") {
            match val.trim().parse() {
                Ok(reward) => self.rewards.email_reward = reward,
                Err(_) => warn!("Ignoring invalid LEDGER_DEFAULT_EMAIL_REWARD '{}'", val),
            }
        }

        if let Ok(val) = std::env::var("LEDGER_SIGNUP_BONUS") {
            if let Ok(num) = val.trim().parse() {
                self.rewards.signup_bonus = Some(num);
            }
        }

        if let Ok(val) = std::env::var("LEDGER_REFERRAL_BONUS") {
            if let Ok(num) = val.trim().parse() {
                self.rewards.referral_bonus = Some(num);
            }
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
