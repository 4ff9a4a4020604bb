// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// src/monitoring/mod.rs - Ledger metrics

pub mod metrics;

pub use metrics::LedgerMetrics;
