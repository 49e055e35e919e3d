// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;

use aagate_core::domain::gateway_config::GatewayConfigManifest;
use aagate_core::domain::risk::classify_risk_tier;

use super::format_risk;
use crate::embedded;

#[derive(Subcommand)]
pub enum RiskCommand {
    /// Daily average risk across all agents
    Trend {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

pub async fn handle_command(command: RiskCommand, config: &GatewayConfigManifest) -> Result<()> {
    match command {
        RiskCommand::Trend { json } => trend(config, json).await,
    }
}

async fn trend(config: &GatewayConfigManifest, json: bool) -> Result<()> {
    let catalog = embedded::catalog_service(config)?;
    let trend = catalog
        .platform_risk_trend()
        .await
        .context("Failed to compute platform risk")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&trend)?);
        return Ok(());
    }

    if trend.is_empty() {
        println!("{}", "No risk history recorded".yellow());
        return Ok(());
    }

    println!("{}", "Platform Risk Trend:".bold());
    for point in &trend {
        let tier = classify_risk_tier(i64::from(point.risk_score));
        let bar = "#".repeat(usize::from(point.risk_score / 2));
        println!(
            "  {}  {}  {}",
            point.date.format("%Y-%m-%d"),
            format_risk(point.risk_score, tier),
            bar.dimmed()
        );
    }

    Ok(())
}
