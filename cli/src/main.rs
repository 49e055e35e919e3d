// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # AAGATE Gateway CLI
//!
//! The `aagate` binary serves the governance dashboard API and exposes the
//! same catalog, risk and advisory operations from the terminal.
//!
//! ## Commands
//!
//! - `aagate serve` - Run the HTTP API (and optional Prometheus exporter)
//! - `aagate agents list|show` - Browse the agent catalog
//! - `aagate policies list|show` - Browse governance policies
//! - `aagate risk trend` - Platform-wide daily risk average
//! - `aagate drift <AGENT_ID>` - Shadow configuration drift
//! - `aagate advise anomaly|violation` - Ask the advisory service
//! - `aagate config show|validate|generate` - Configuration management

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use aagate_core::domain::gateway_config::{GatewayConfigManifest, LoggingConfig};

mod commands;
mod embedded;

use commands::{AdviseCommand, AgentsCommand, ConfigCommand, PoliciesCommand, RiskCommand};

/// AAGATE - Governance gateway for autonomous AI agents
#[derive(Parser)]
#[command(name = "aagate")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "AAGATE_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). Defaults to the configured level.
    #[arg(long, global = true, env = "AAGATE_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    #[command(name = "serve")]
    Serve {
        /// Bind address (default: spec.api.bind_address)
        #[arg(long, env = "AAGATE_HOST")]
        host: Option<String>,

        /// HTTP port (default: spec.api.port)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Agent catalog
    #[command(name = "agents")]
    Agents {
        #[command(subcommand)]
        command: AgentsCommand,
    },

    /// Governance policies
    #[command(name = "policies")]
    Policies {
        #[command(subcommand)]
        command: PoliciesCommand,
    },

    /// Platform risk
    #[command(name = "risk")]
    Risk {
        #[command(subcommand)]
        command: RiskCommand,
    },

    /// Show configuration drift between an agent and its shadow deployment
    #[command(name = "drift")]
    Drift {
        /// Production agent ID
        #[arg(value_name = "AGENT_ID")]
        agent_id: String,
    },

    /// Request an advisory from the configured model
    #[command(name = "advise")]
    Advise {
        #[command(subcommand)]
        command: AdviseCommand,
    },

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Logging is configured from the manifest, so a broken manifest is
    // reported on stderr rather than through tracing.
    let config = match GatewayConfigManifest::load_or_default(cli.config.clone()) {
        Ok(config) => config,
        Err(e) => {
            if !matches!(cli.command, Some(Commands::Config { .. })) {
                return Err(e).context("Failed to load configuration");
            }
            eprintln!("{} {:#}", "warning:".yellow().bold(), e);
            GatewayConfigManifest::default()
        }
    };

    init_logging(cli.log_level.as_deref(), &config.spec.observability.logging)?;

    match cli.command {
        Some(Commands::Serve { host, port }) => commands::serve::run(config, host, port).await,
        Some(Commands::Agents { command }) => {
            commands::agents::handle_command(command, &config).await
        }
        Some(Commands::Policies { command }) => {
            commands::policies::handle_command(command, &config).await
        }
        Some(Commands::Risk { command }) => commands::risk::handle_command(command, &config).await,
        Some(Commands::Drift { agent_id }) => commands::drift::run(&agent_id, &config).await,
        Some(Commands::Advise { command }) => {
            commands::advise::handle_command(command, &config).await
        }
        Some(Commands::Config { command }) => {
            commands::config::handle_command(command, cli.config).await
        }
        None => {
            // No command provided - show help
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(1);
        }
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level_override: Option<&str>, logging: &LoggingConfig) -> Result<()> {
    let level = level_override.unwrap_or(&logging.level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.compact().init();
    }

    Ok(())
}
