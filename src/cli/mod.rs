// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod client;
pub mod operator;

use anyhow::Result;
use clap::{Parser, Subcommand};

use client::LedgerClient;

/// Reward ledger operator CLI
#[derive(Parser, Debug)]
#[command(name = "ledger-cli")]
#[command(version = crate::version::VERSION_NUMBER)]
#[command(about = "Operator tools for the reward ledger", long_about = None)]
pub struct Cli {
    /// Base URL of the ledger API
    #[arg(
        long,
        global = true,
        env = "LEDGER_SERVER_URL",
        default_value = "http://127.0.0.1:8080"
    )]
    pub server: String,

    /// Operator key sent as x-operator-key
    #[arg(long, global = true, env = "LEDGER_OPERATOR_KEY")]
    pub operator_key: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Set the status of one submission
    UpdateStatus(operator::UpdateStatusArgs),

    /// Set the status of many submissions by id or email
    BulkStatus(operator::BulkStatusArgs),

    /// Approve or reject a withdrawal
    ResolveWithdrawal(operator::ResolveArgs),

    /// Approve or reject a bonus withdrawal
    ResolveBonusWithdrawal(operator::ResolveArgs),

    /// Show submission and withdrawal totals
    Stats(operator::StatsArgs),
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let client = LedgerClient::new(&cli.server, cli.operator_key.clone())?;

    match cli.command {
        Commands::UpdateStatus(args) => operator::update_status(&client, args).await,
        Commands::BulkStatus(args) => operator::bulk_status(&client, args).await,
        Commands::ResolveWithdrawal(args) => {
            operator::resolve(&client, "/v1/withdrawals", args).await
        }
        Commands::ResolveBonusWithdrawal(args) => {
            operator::resolve(&client, "/v1/bonus-withdrawals", args).await
        }
        Commands::Stats(args) => operator::stats(&client, args).await,
    }
}
