// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use anyhow::{Context, Result};
use colored::Colorize;

use aagate_core::domain::agent::AgentId;
use aagate_core::domain::drift::ParameterChangeKind;
use aagate_core::domain::gateway_config::GatewayConfigManifest;

use crate::embedded;

pub async fn run(agent_id: &str, config: &GatewayConfigManifest) -> Result<()> {
    let catalog = embedded::catalog_service(config)?;
    let drift = catalog
        .shadow_drift(&AgentId::new(agent_id))
        .await
        .context("Failed to load shadow deployment")?
        .with_context(|| format!("Agent '{}' has no shadow deployment", agent_id))?;

    if drift.is_empty() {
        println!("{}", "✓ Shadow matches production".green());
        return Ok(());
    }

    println!("{} {}", "Shadow drift for".bold(), agent_id.bold());

    if let Some(change) = &drift.model_change {
        println!("  Model:   {} → {}", change.production, change.shadow);
    }
    if let Some(change) = &drift.version_change {
        println!("  Version: {} → {}", change.production, change.shadow);
    }

    for permission in &drift.added_permissions {
        println!("  {} {}", "+".red().bold(), permission);
    }
    for permission in &drift.removed_permissions {
        println!("  {} {}", "-".green().bold(), permission);
    }

    for change in &drift.parameter_changes {
        let render = |value: &Option<serde_json::Value>| {
            value
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "(unset)".to_string())
        };
        let marker = match change.kind {
            ParameterChangeKind::Added => "+",
            ParameterChangeKind::Removed => "-",
            ParameterChangeKind::Modified => "~",
        };
        println!(
            "  {} {}: {} → {}",
            marker.yellow(),
            change.name,
            render(&change.production),
            render(&change.shadow)
        );
    }

    if drift.escalates_privileges() {
        println!();
        println!(
            "{}",
            "⚠ Shadow grants permissions production does not hold".red().bold()
        );
    }

    Ok(())
}
