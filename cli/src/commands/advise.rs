// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Advisory commands
//!
//! Commands: anomaly, violation
//!
//! Input is validated before any provider is initialised, so a malformed
//! request is reported even when no API key is configured.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use aagate_core::domain::advisory::{
    parse_signal_lines, AdvisoryError, AdvisoryRequest, AdvisoryResponse, AnomalyAdvisoryRequest,
    FieldIssue, ViolationAdvisoryRequest,
};
use aagate_core::domain::gateway_config::GatewayConfigManifest;
use aagate_core::domain::risk::classify_risk_tier;

use crate::embedded;

#[derive(Subcommand)]
pub enum AdviseCommand {
    /// Decide whether an agent's security signals are anomalous
    Anomaly {
        /// Agent under analysis
        #[arg(long)]
        agent_id: String,

        /// Security signal (repeatable)
        #[arg(long = "signal", value_name = "TEXT")]
        signals: Vec<String>,

        /// File with one security signal per line
        #[arg(long, value_name = "FILE")]
        signals_file: Option<PathBuf>,

        /// Print JSON instead of formatted output
        #[arg(long)]
        json: bool,
    },

    /// Classify a policy violation and suggest remediations
    Violation {
        /// Description of the violation (at least 10 characters)
        #[arg(long)]
        description: String,

        /// Related security logs (at least 10 characters)
        #[arg(long, conflicts_with = "logs_file")]
        logs: Option<String>,

        /// Read security logs from a file
        #[arg(long, value_name = "FILE")]
        logs_file: Option<PathBuf>,

        /// Print JSON instead of formatted output
        #[arg(long)]
        json: bool,
    },
}

pub async fn handle_command(command: AdviseCommand, config: &GatewayConfigManifest) -> Result<()> {
    let (request, json) = match command {
        AdviseCommand::Anomaly {
            agent_id,
            mut signals,
            signals_file,
            json,
        } => {
            if let Some(path) = signals_file {
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read signals from {:?}", path))?;
                signals.extend(parse_signal_lines(&content));
            }
            (
                AdvisoryRequest::Anomaly(AnomalyAdvisoryRequest::new(agent_id, signals)),
                json,
            )
        }
        AdviseCommand::Violation {
            description,
            logs,
            logs_file,
            json,
        } => {
            let logs = match (logs, logs_file) {
                (Some(logs), _) => logs,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read security logs from {:?}", path))?,
                (None, None) => String::new(),
            };
            (
                AdvisoryRequest::Violation(ViolationAdvisoryRequest::new(description, logs)),
                json,
            )
        }
    };

    if let Err(issues) = request.validate() {
        print_issues(&issues);
        anyhow::bail!("Invalid {} advisory request", request.kind());
    }

    let gateway = embedded::advisory_gateway(config)?;

    let response = match gateway.request_advisory(&request).await {
        Ok(response) => response,
        Err(AdvisoryError::Validation(issues)) => {
            print_issues(&issues);
            anyhow::bail!("Invalid {} advisory request", request.kind());
        }
        Err(e) => return Err(e).context("Advisory request failed"),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    print_response(&response);
    Ok(())
}

fn print_issues(issues: &[FieldIssue]) {
    eprintln!("{}", "Request rejected:".red().bold());
    for issue in issues {
        eprintln!("  {} {}", issue.field.bold(), issue.message);
    }
}

fn print_response(response: &AdvisoryResponse) {
    match response {
        AdvisoryResponse::Anomaly(advisory) => {
            let verdict = if advisory.is_anomalous {
                "ANOMALOUS".red().bold()
            } else {
                "NORMAL".green().bold()
            };
            let tier = classify_risk_tier(advisory.anomaly_score.round() as i64);
            println!("{}  score {:.0} ({})", verdict, advisory.anomaly_score, tier);
            println!();
            println!("{}", "Explanation:".bold());
            println!("  {}", advisory.explanation);
            println!();
            println!("{}", "Suggested Remediation:".bold());
            println!("  {}", advisory.suggested_remediation);
        }
        AdvisoryResponse::Violation(advisory) => {
            println!("{} {}", "Classification:".bold(), advisory.classification);
            println!();
            println!("{}", "Context:".bold());
            println!("  {}", advisory.context);
            println!();
            println!("{}", "Suggested Remediations:".bold());
            println!("  {}", advisory.suggested_remediations);
        }
    }
}
