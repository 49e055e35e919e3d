// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Embedded services
//!
//! Builds the catalog and advisory services in-process from the loaded
//! configuration. Used by `serve` and by every one-shot command.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

use aagate_core::{
    application::{AdvisoryGateway, CatalogService},
    domain::gateway_config::GatewayConfigManifest,
    infrastructure::{
        llm::ProviderRegistry, prompt_template_engine::PromptTemplateEngine, CatalogLoader,
        CatalogRepositories,
    },
};

/// Load the catalog named by `spec.catalog.path` (builtin seed when unset).
pub fn catalog_service(config: &GatewayConfigManifest) -> Result<CatalogService> {
    let catalog = CatalogLoader::load(config.spec.catalog.path.as_deref())
        .context("Failed to load governance catalog")?;

    info!(
        agents = catalog.agents.len(),
        policies = catalog.policies.len(),
        "Catalog loaded"
    );

    Ok(CatalogService::from_repositories(
        CatalogRepositories::in_memory(catalog),
    ))
}

/// Wire the advisory gateway to the provider bound to `spec.advisory.model_alias`.
pub fn advisory_gateway(config: &GatewayConfigManifest) -> Result<AdvisoryGateway> {
    let advisory = &config.spec.advisory;

    let registry =
        ProviderRegistry::from_config(config).context("Failed to initialize LLM providers")?;
    let provider = registry.resolve(&advisory.model_alias).with_context(|| {
        format!(
            "No usable provider for model alias '{}' (available: {:?})",
            advisory.model_alias,
            registry.available_aliases()
        )
    })?;

    let templates = PromptTemplateEngine::with_overrides(
        advisory.anomaly_prompt.as_deref(),
        advisory.violation_prompt.as_deref(),
    )?;

    Ok(AdvisoryGateway::new(
        provider,
        Arc::new(templates),
        advisory.generation_options(),
    ))
}

/// Like [`advisory_gateway`], but a server can still run its read-only
/// routes without a model, so failure is logged instead of returned.
pub fn optional_advisory_gateway(config: &GatewayConfigManifest) -> Option<Arc<AdvisoryGateway>> {
    match advisory_gateway(config) {
        Ok(gateway) => Some(Arc::new(gateway)),
        Err(e) => {
            warn!("Advisory endpoints disabled: {:#}", e);
            None
        }
    }
}
