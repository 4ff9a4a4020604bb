// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Reward settings
//!
//! The per-email reward and bonus amounts are administrative values kept in
//! the store's settings table. Ledger operations read them through
//! [`RewardSettingProvider`] at call time and never cache them.

use crate::config::RewardDefaults;
use crate::error::{LedgerError, LedgerResult};
use crate::store::{Store, Tables};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

/// Reward per approved email when no setting has been stored.
pub const DEFAULT_EMAIL_REWARD: i64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingKey {
    DefaultEmailReward,
    DefaultSignupBonus,
    DefaultReferralBonus,
    ReferralWithdrawalThreshold,
}

impl SettingKey {
    pub const ALL: [SettingKey; 4] = [
        SettingKey::DefaultEmailReward,
        SettingKey::DefaultSignupBonus,
        SettingKey::DefaultReferralBonus,
        SettingKey::ReferralWithdrawalThreshold,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::DefaultEmailReward => "default_email_reward",
            SettingKey::DefaultSignupBonus => "default_signup_bonus",
            SettingKey::DefaultReferralBonus => "default_referral_bonus",
            SettingKey::ReferralWithdrawalThreshold => "referral_withdrawal_threshold",
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SettingKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s.trim())
            .ok_or_else(|| LedgerError::InvalidSetting {
                key: s.to_string(),
                reason: "unknown setting".to_string(),
            })
    }
}

/// Read-only view of the reward configuration used by the ledgers.
#[async_trait]
pub trait RewardSettingProvider: Send + Sync {
    /// Reward granted when a submission becomes `good`.
    async fn current_reward(&self) -> i64;

    async fn signup_bonus(&self) -> Option<i64>;

    async fn referral_bonus(&self) -> Option<i64>;

    /// Minimum referral bonus total a supplier must reach before withdrawing.
    async fn referral_withdrawal_threshold(&self) -> Option<i64>;
}

/// Snapshot of every known setting, served to operators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsView {
    pub default_email_reward: i64,
    pub default_signup_bonus: Option<i64>,
    pub default_referral_bonus: Option<i64>,
    pub referral_withdrawal_threshold: Option<i64>,
}

/// Store-backed settings table.
#[derive(Clone)]
pub struct SystemSettings {
    store: Store,
}

impl SystemSettings {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn get(&self, key: SettingKey) -> Option<i64> {
        self.store.read(|t| read_setting(t, key)).await
    }

    pub async fn set(&self, key: SettingKey, value: i64) -> LedgerResult<()> {
        if value < 0 {
            return Err(LedgerError::InvalidSetting {
                key: key.to_string(),
                reason: "value must be a non-negative number".to_string(),
            });
        }

        self.store
            .transact(|t| {
                t.settings.insert(key.as_str().to_string(), value.to_string());
                Ok(())
            })
            .await?;

        info!(setting = %key, value, "System setting updated");
        Ok(())
    }

    /// Writes configured defaults for keys that have never been set. Values
    /// already in the store win over the config file.
    pub async fn seed_defaults(&self, defaults: &RewardDefaults) -> LedgerResult<()> {
        let seeds = [
            (SettingKey::DefaultEmailReward, Some(defaults.email_reward)),
            (SettingKey::DefaultSignupBonus, defaults.signup_bonus),
            (SettingKey::DefaultReferralBonus, defaults.referral_bonus),
            (
                SettingKey::ReferralWithdrawalThreshold,
                defaults.referral_withdrawal_threshold,
            ),
        ];

        for (key, value) in seeds {
            if let Some(value) = value {
                if value < 0 {
                    return Err(LedgerError::InvalidSetting {
                        key: key.to_string(),
                        reason: "value must be a non-negative number".to_string(),
                    });
                }
            }
        }

        self.store
            .transact(|t| {
                for (key, value) in seeds {
                    if let Some(value) = value {
                        t.settings
                            .entry(key.as_str().to_string())
                            .or_insert_with(|| value.to_string());
                    }
                }
                Ok(())
            })
            .await
    }

    pub async fn view(&self) -> SettingsView {
        self.store
            .read(|t| SettingsView {
                default_email_reward: read_setting(t, SettingKey::DefaultEmailReward)
                    .unwrap_or(DEFAULT_EMAIL_REWARD),
                default_signup_bonus: read_setting(t, SettingKey::DefaultSignupBonus),
                default_referral_bonus: read_setting(t, SettingKey::DefaultReferralBonus),
                referral_withdrawal_threshold: read_setting(
                    t,
                    SettingKey::ReferralWithdrawalThreshold,
                ),
            })
            .await
    }
}

fn read_setting(tables: &Tables, key: SettingKey) -> Option<i64> {
    let raw = tables.settings.get(key.as_str())?;
    match raw.trim().parse::<i64>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(setting = %key, value = %raw, "Ignoring unparsable setting value");
            None
        }
    }
}

#[async_trait]
impl RewardSettingProvider for SystemSettings {
    async fn current_reward(&self) -> i64 {
        self.get(SettingKey::DefaultEmailReward)
            .await
            .unwrap_or(DEFAULT_EMAIL_REWARD)
    }

    async fn signup_bonus(&self) -> Option<i64> {
        self.get(SettingKey::DefaultSignupBonus).await
    }

    async fn referral_bonus(&self) -> Option<i64> {
        self.get(SettingKey::DefaultReferralBonus).await
    }

    async fn referral_withdrawal_threshold(&self) -> Option<i64> {
        self.get(SettingKey::ReferralWithdrawalThreshold).await
    }
}
