// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Args;
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing::info;
use uuid::Uuid;

use super::client::LedgerClient;

/// Arguments for update-status command
#[derive(Args, Debug)]
pub struct UpdateStatusArgs {
    /// Submission id
    #[arg(long)]
    pub id: Uuid,

    /// New status (good/bad/pending)
    #[arg(long)]
    pub status: String,

    #[arg(long)]
    pub remarks: Option<String>,
}

/// Arguments for bulk-status command
#[derive(Args, Debug)]
#[command(group(clap::ArgGroup::new("targets").required(true).args(["ids", "emails_file"])))]
pub struct BulkStatusArgs {
    /// Comma-separated submission ids
    #[arg(long, value_delimiter = ',')]
    pub ids: Vec<Uuid>,

    /// File with one email address per line
    #[arg(long)]
    pub emails_file: Option<PathBuf>,

    /// New status (good/bad/pending)
    #[arg(long)]
    pub status: String,

    #[arg(long)]
    pub remarks: Option<String>,
}

/// Arguments for resolve commands
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Withdrawal id
    #[arg(long)]
    pub id: Uuid,

    /// approve or reject
    #[arg(long)]
    pub action: String,

    /// Required when approving
    #[arg(long)]
    pub remarks: Option<String>,

    /// Payout proof reference
    #[arg(long)]
    pub proof: Option<String>,
}

/// Arguments for stats command
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// How many top suppliers to list
    #[arg(long)]
    pub top: Option<usize>,
}

pub async fn update_status(client: &LedgerClient, args: UpdateStatusArgs) -> Result<()> {
    let response: Value = client
        .patch(
            &format!("/v1/submissions/{}/status", args.id),
            &json!({ "status": args.status, "remarks": args.remarks }),
        )
        .await?;
    print_message(&response);
    Ok(())
}

pub async fn bulk_status(client: &LedgerClient, args: BulkStatusArgs) -> Result<()> {
    let response: Value = match &args.emails_file {
        Some(path) => {
            let emails = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            client
                .patch(
                    "/v1/submissions/bulk-status-by-email",
                    &json!({ "emails": emails, "status": args.status, "remarks": args.remarks }),
                )
                .await?
        }
        None => {
            client
                .patch(
                    "/v1/submissions/bulk-status",
                    &json!({ "ids": args.ids, "status": args.status, "remarks": args.remarks }),
                )
                .await?
        }
    };

    print_message(&response);
    if let Some(data) = response.get("data") {
        println!("{}", serde_json::to_string_pretty(data)?);
    }
    Ok(())
}

pub async fn resolve(client: &LedgerClient, base: &str, args: ResolveArgs) -> Result<()> {
    info!("Resolving {} {} ({})", base, args.id, args.action);
    let response: Value = client
        .patch(
            &format!("{}/{}/resolve", base, args.id),
            &json!({ "action": args.action, "remarks": args.remarks, "proof": args.proof }),
        )
        .await?;
    print_message(&response);
    Ok(())
}

pub async fn stats(client: &LedgerClient, args: StatsArgs) -> Result<()> {
    let path = match args.top {
        Some(top) => format!("/v1/stats?top={}", top),
        None => "/v1/stats".to_string(),
    };
    let stats: Value = client.get(&path).await?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

fn print_message(response: &Value) {
    if let Some(message) = response.get("message").and_then(Value::as_str) {
        println!("✅ {}", message);
    }
}
