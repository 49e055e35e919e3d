// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use aagate_core::domain::gateway_config::GatewayConfigManifest;
use aagate_core::infrastructure::llm::ProviderRegistry;
use aagate_core::infrastructure::prompt_template_engine::PromptTemplateEngine;

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Also contact every configured provider
        #[arg(long)]
        check_providers: bool,
    },

    /// Generate sample configuration
    Generate {
        /// Output path (default: ./aagate-config.yaml)
        #[arg(short, long, default_value = "./aagate-config.yaml")]
        output: PathBuf,

        /// Include examples and comments
        #[arg(long)]
        examples: bool,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => show(config_override, paths).await,
        ConfigCommand::Validate {
            file,
            check_providers,
        } => validate(file.or(config_override), check_providers).await,
        ConfigCommand::Generate {
            output,
            examples,
            force,
        } => generate(output, examples, force).await,
    }
}

async fn show(config_override: Option<PathBuf>, show_paths: bool) -> Result<()> {
    let config = GatewayConfigManifest::load_or_default(config_override.clone())
        .context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. AAGATE_CONFIG_PATH: {}",
            std::env::var("AAGATE_CONFIG_PATH")
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./aagate-config.yaml");
        println!("  4. ~/.aagate/config.yaml");
        println!();
    }

    println!("{}", "Current configuration:".bold());
    println!("  Name: {}", config.metadata.name);
    if let Some(version) = &config.metadata.version {
        println!("  Version: {}", version);
    }
    println!();

    println!("{}", "Catalog:".bold());
    match &config.spec.catalog.path {
        Some(path) => println!("  Source: {}", path.display()),
        None => println!("  Source: {}", "(builtin seed)".dimmed()),
    }
    println!();

    println!("{}", "LLM Providers:".bold());
    for provider in &config.spec.llm_providers {
        let state = if provider.enabled {
            "enabled".green()
        } else {
            "disabled".dimmed()
        };
        println!("  {} ({}) [{}]", provider.name.bold(), provider.provider_type, state);
        println!("    Endpoint: {}", provider.endpoint);
        for model in &provider.models {
            match model.context_window {
                Some(tokens) => println!(
                    "      - {} → {} ({} token context)",
                    model.alias, model.model, tokens
                ),
                None => println!("      - {} → {}", model.alias, model.model),
            }
        }
    }
    println!();

    let advisory = &config.spec.advisory;
    println!("{}", "Advisory:".bold());
    match config.resolve_alias(&advisory.model_alias) {
        Some((provider, model)) => println!(
            "  Model alias: {} → {} ({})",
            advisory.model_alias, model.model, provider.name
        ),
        None => println!(
            "  Model alias: {} {}",
            advisory.model_alias,
            "(unresolved)".red()
        ),
    }
    println!("  Temperature: {}", advisory.temperature);
    println!("  Max tokens: {}", advisory.max_tokens);
    println!("  Timeout: {}s", advisory.request_timeout_secs);
    if advisory.anomaly_prompt.is_some() || advisory.violation_prompt.is_some() {
        println!("  Prompt overrides: {}", "yes".yellow());
    }
    println!();

    println!("{}", "API:".bold());
    println!("  Listen: {}:{}", config.spec.api.bind_address, config.spec.api.port);
    println!();

    let observability = &config.spec.observability;
    println!("{}", "Observability:".bold());
    println!(
        "  Logging: {} ({})",
        observability.logging.level, observability.logging.format
    );
    if observability.metrics.enabled {
        println!("  Metrics: port {}", observability.metrics.port);
    } else {
        println!("  Metrics: {}", "disabled".dimmed());
    }

    Ok(())
}

async fn validate(config_path: Option<PathBuf>, check_providers: bool) -> Result<()> {
    println!("Validating configuration...");

    let config = GatewayConfigManifest::load_or_default(config_path)
        .context("Failed to load configuration")?;

    config
        .validate()
        .context("Configuration validation failed")?;

    let advisory = &config.spec.advisory;
    for (name, template) in [
        ("anomaly_prompt", &advisory.anomaly_prompt),
        ("violation_prompt", &advisory.violation_prompt),
    ] {
        if let Some(template) = template {
            PromptTemplateEngine::validate_template(template)
                .with_context(|| format!("spec.advisory.{} is not a valid template", name))?;
        }
    }

    println!("{}", "✓ Configuration is valid".green());

    if check_providers {
        println!();
        check_provider_health(&config).await?;
    }

    Ok(())
}

async fn check_provider_health(config: &GatewayConfigManifest) -> Result<()> {
    println!("Checking providers...");

    let registry =
        ProviderRegistry::from_config(config).context("Failed to initialize LLM providers")?;
    let mut results: Vec<_> = registry.health_check_all().await.into_iter().collect();
    results.sort_by(|a, b| a.0.cmp(&b.0));

    if results.is_empty() {
        anyhow::bail!("No provider could be initialised");
    }

    let mut failed = 0;
    for (alias, result) in &results {
        match result {
            Ok(()) => println!("  {} {}", "✓".green(), alias),
            Err(e) => {
                failed += 1;
                println!("  {} {}: {}", "✗".red(), alias, e);
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} model aliases are unreachable", failed, results.len());
    }
    Ok(())
}

async fn generate(output: PathBuf, with_examples: bool, force: bool) -> Result<()> {
    if output.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            output.display()
        );
    }

    let sample = if with_examples {
        include_str!("../../templates/config-with-examples.yaml")
    } else {
        include_str!("../../templates/config-minimal.yaml")
    };

    std::fs::write(&output, sample)
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );

    Ok(())
}
