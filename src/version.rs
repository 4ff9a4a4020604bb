// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the reward ledger node

/// Full version string with feature description
pub const VERSION: &str = "v1.2.0-bonus-withdrawals-2025-11-03";

/// Semantic version number
pub const VERSION_NUMBER: &str = "1.2.0";

pub const VERSION_MAJOR: u32 = 1;
pub const VERSION_MINOR: u32 = 2;
pub const VERSION_PATCH: u32 = 0;

/// Build date
pub const BUILD_DATE: &str = "2025-11-03";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "submission-ledger",
    "withdraw-lock",
    "clawbacks",
    "bulk-status-updates",
    "bulk-email-entry",
    "withdrawal-workflow",
    "first-withdrawal-bonus-unlock",
    "referral-bonuses",
    "bonus-withdrawals",
    "json-snapshots",
    "prometheus-metrics",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Reward Ledger Node {} ({})", VERSION_NUMBER, BUILD_DATE)
}

/// Get full version info for API responses
pub fn get_version_info() -> serde_json::Value {
    serde_json::json!({
        "version": VERSION_NUMBER,
        "build": VERSION,
        "date": BUILD_DATE,
        "features": FEATURES,
    })
}
