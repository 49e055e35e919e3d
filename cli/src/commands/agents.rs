// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Agent catalog commands
//!
//! Commands: list, show

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;

use aagate_core::domain::agent::{AgentId, LogLevel};
use aagate_core::domain::gateway_config::GatewayConfigManifest;

use super::{format_risk, format_severity};
use crate::embedded;

#[derive(Subcommand)]
pub enum AgentsCommand {
    /// List all agents
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show one agent with its logs and policies
    Show {
        /// Agent ID
        #[arg(value_name = "AGENT_ID")]
        id: String,

        /// Only show WARN and ERROR log entries
        #[arg(long)]
        problems: bool,

        /// Print JSON instead of formatted output
        #[arg(long)]
        json: bool,
    },
}

pub async fn handle_command(command: AgentsCommand, config: &GatewayConfigManifest) -> Result<()> {
    match command {
        AgentsCommand::List { json } => list(config, json).await,
        AgentsCommand::Show { id, problems, json } => show(config, &id, problems, json).await,
    }
}

async fn list(config: &GatewayConfigManifest, json: bool) -> Result<()> {
    let catalog = embedded::catalog_service(config)?;
    let overview = catalog.overview().await.context("Failed to list agents")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&overview.agents)?);
        return Ok(());
    }

    if overview.agents.is_empty() {
        println!("{}", "No agents in catalog".yellow());
        return Ok(());
    }

    println!(
        "{:<12} {:<16} {:<18} {:<8} {:<10} {:<20}",
        "ID", "NAME", "CATEGORY", "STATUS", "RISK", "LAST CHECK-IN"
    );
    println!("{}", "-".repeat(88));

    for agent in &overview.agents {
        println!(
            "{:<12} {:<16} {:<18} {} {} {}",
            agent.id.as_str(),
            agent.name,
            agent.category.to_string(),
            format_severity(agent.severity),
            format_risk(agent.risk_score, agent.risk_tier),
            agent.last_check_in.format("%Y-%m-%d %H:%M UTC"),
        );
    }

    Ok(())
}

async fn show(config: &GatewayConfigManifest, id: &str, problems: bool, json: bool) -> Result<()> {
    let catalog = embedded::catalog_service(config)?;
    let detail = catalog
        .agent_detail(&AgentId::new(id))
        .await
        .context("Failed to load agent")?
        .with_context(|| format!("Agent '{}' not found", id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&detail)?);
        return Ok(());
    }

    let agent = &detail.agent;
    println!("{} ({})", agent.name.bold(), agent.id);
    println!("  Category:      {}", agent.category);
    println!("  Status:        {} ({})", agent.status, format_severity(detail.severity));
    println!("  Risk:          {}", format_risk(agent.risk_score, detail.risk_tier));
    println!("  Model:         {}", agent.model);
    println!("  Version:       {}", agent.version);
    println!("  Last check-in: {}", agent.last_check_in.to_rfc3339());
    println!();

    println!("{}", "Risk History:".bold());
    if agent.risk_history.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for point in &agent.risk_history {
        println!("  {}  {:>3}", point.date.format("%Y-%m-%d"), point.risk_score);
    }
    println!();

    println!("{}", "Logs:".bold());
    let logs: Vec<_> = if problems {
        agent.problem_logs().collect()
    } else {
        agent.logs.iter().collect()
    };
    if logs.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for log in logs {
        let level = format!("{:<5}", log.level.to_string());
        let level = match log.level {
            LogLevel::Error => level.red(),
            LogLevel::Warn => level.yellow(),
            LogLevel::Info => level.normal(),
        };
        println!("  {} {} {}", log.timestamp.format("%Y-%m-%d %H:%M:%S"), level, log.message);
    }
    println!();

    println!("{}", "Policies:".bold());
    if detail.policies.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for policy in &detail.policies {
        println!("  {:<6} {} [{}]", policy.id.as_str(), policy.name, policy.control.dimmed());
    }

    Ok(())
}
