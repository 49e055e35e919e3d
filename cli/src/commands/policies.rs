// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Policy commands
//!
//! Commands: list, show

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;

use aagate_core::domain::gateway_config::GatewayConfigManifest;
use aagate_core::domain::policy::PolicyId;

use crate::embedded;

#[derive(Subcommand)]
pub enum PoliciesCommand {
    /// List all policies
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show a policy including its Rego source
    Show {
        /// Policy ID
        #[arg(value_name = "POLICY_ID")]
        id: String,
    },
}

pub async fn handle_command(
    command: PoliciesCommand,
    config: &GatewayConfigManifest,
) -> Result<()> {
    match command {
        PoliciesCommand::List { json } => list(config, json).await,
        PoliciesCommand::Show { id } => show(config, &id).await,
    }
}

async fn list(config: &GatewayConfigManifest, json: bool) -> Result<()> {
    let catalog = embedded::catalog_service(config)?;
    let policies = catalog.list_policies().await.context("Failed to list policies")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&policies)?);
        return Ok(());
    }

    println!("{:<8} {:<32} {:<30}", "ID", "NAME", "CONTROL");
    println!("{}", "-".repeat(72));
    for policy in &policies {
        println!(
            "{:<8} {:<32} {:<30}",
            policy.id.as_str(),
            policy.name,
            policy.control
        );
    }

    Ok(())
}

async fn show(config: &GatewayConfigManifest, id: &str) -> Result<()> {
    let catalog = embedded::catalog_service(config)?;
    let policy = catalog
        .find_policy(&PolicyId::new(id))
        .await
        .context("Failed to load policy")?
        .with_context(|| format!("Policy '{}' not found", id))?;

    println!("{} ({})", policy.name.bold(), policy.id);
    println!("  Control:     {}", policy.control);
    println!("  Description: {}", policy.description);
    if let Some(package) = policy.rego_package() {
        println!("  Package:     {}", package);
    }
    println!();
    println!("{}", "Rego:".bold());
    for line in policy.rego_code.lines() {
        println!("  {}", line.dimmed());
    }

    let agents = catalog.list_agents().await?;
    let enforced_by: Vec<_> = agents
        .iter()
        .filter(|agent| agent.references_policy(&policy.id))
        .map(|agent| agent.id.as_str())
        .collect();
    println!();
    println!("{} {}", "Referenced by:".bold(), enforced_by.join(", "));

    Ok(())
}
