// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use reward_ledger_node::{
    api::{start_server, AppState},
    config::AppConfig,
    version,
};
use std::env;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    println!("🚀 Starting Reward Ledger Node...\n");
    println!("📦 BUILD VERSION: {}", version::VERSION);
    println!("📅 Build Date: {}", version::BUILD_DATE);
    println!();

    let config = AppConfig::load()?;
    info!(
        listen_addr = %config.server.listen_addr,
        snapshot = ?config.store.snapshot_path,
        operator_keys = config.server.operator_api_keys.len(),
        "Configuration loaded"
    );
    if !config.server.require_operator_key {
        println!("⚠️  Operator routes are open (no operator key required)");
    }

    let state = AppState::from_config(&config).await?;
    println!("✅ Ledger ready, API on http://{}", config.server.listen_addr);

    start_server(state).await?;

    println!("👋 Reward Ledger Node stopped");
    Ok(())
}
