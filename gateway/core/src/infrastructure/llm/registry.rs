// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// LLM Provider Registry - Model Alias Resolution and Provider Management
//
// Builds one adapter per configured model alias and resolves aliases to
// them. Calls are made exactly once: a failed generation is reported to the
// caller, never retried or rerouted.

use crate::domain::gateway_config::{GatewayConfigManifest, LLMProviderConfig, ModelConfig};
use crate::domain::llm::{LLMError, LLMProvider};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::anthropic::AnthropicAdapter;
use super::gemini::GeminiAdapter;
use super::ollama::OllamaAdapter;
use super::openai::OpenAIAdapter;

struct AliasBinding {
    provider_name: String,
    model: String,
    adapter: Arc<dyn LLMProvider>,
}

/// Registry for managing LLM providers and resolving model aliases
pub struct ProviderRegistry {
    bindings: HashMap<String, AliasBinding>,
}

impl ProviderRegistry {
    /// Create provider registry from gateway configuration.
    ///
    /// A provider that cannot be initialised (for example a missing API key)
    /// is skipped with a warning; its aliases stay unresolved.
    pub fn from_config(config: &GatewayConfigManifest) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(config.spec.advisory.request_timeout_secs);
        let mut bindings = HashMap::new();

        info!("Initializing LLM provider registry");

        for provider_config in &config.spec.llm_providers {
            if !provider_config.enabled {
                info!("Provider '{}' disabled, skipping", provider_config.name);
                continue;
            }

            let client = super::http_client(timeout)?;
            let api_key = match Self::resolve_api_key(provider_config) {
                Ok(key) => key,
                Err(e) => {
                    warn!("Failed to initialize provider '{}': {}", provider_config.name, e);
                    continue;
                }
            };

            for model_config in &provider_config.models {
                if bindings.contains_key(&model_config.alias) {
                    warn!(
                        "Alias '{}' already bound, ignoring duplicate on provider '{}'",
                        model_config.alias, provider_config.name
                    );
                    continue;
                }

                let adapter =
                    Self::create_adapter(provider_config, model_config, client.clone(), &api_key)?;
                info!(
                    "Mapping alias '{}' -> {} ({})",
                    model_config.alias, model_config.model, provider_config.name
                );
                bindings.insert(
                    model_config.alias.clone(),
                    AliasBinding {
                        provider_name: provider_config.name.clone(),
                        model: model_config.model.clone(),
                        adapter,
                    },
                );
            }
        }

        if bindings.is_empty() {
            warn!("No LLM providers available - advisory requests will be rejected");
        }

        Ok(Self { bindings })
    }

    /// Create the adapter serving one model of a provider
    fn create_adapter(
        config: &LLMProviderConfig,
        model: &ModelConfig,
        client: reqwest::Client,
        api_key: &str,
    ) -> anyhow::Result<Arc<dyn LLMProvider>> {
        let endpoint = config.endpoint.clone();
        let api_key = api_key.to_string();
        let model = model.model.clone();

        let provider: Arc<dyn LLMProvider> = match config.provider_type.as_str() {
            "gemini" => Arc::new(GeminiAdapter::new(client, endpoint, api_key, model)),
            "openai" => Arc::new(OpenAIAdapter::new(client, endpoint, api_key, model)),
            "openai-compatible" => {
                Arc::new(OpenAIAdapter::compatible(client, endpoint, api_key, model))
            }
            "anthropic" => Arc::new(AnthropicAdapter::new(client, endpoint, api_key, model)),
            "ollama" => Arc::new(OllamaAdapter::new(client, endpoint, model)),
            _ => anyhow::bail!("Unsupported provider type: {}", config.provider_type),
        };

        Ok(provider)
    }

    /// Resolve API key from config (supports "env:VAR_NAME" syntax)
    fn resolve_api_key(config: &LLMProviderConfig) -> anyhow::Result<String> {
        let key = match &config.api_key {
            Some(k) => match k.strip_prefix("env:") {
                Some(var_name) => std::env::var(var_name).map_err(|_| {
                    anyhow::anyhow!("Environment variable not set: {}", var_name)
                })?,
                None => k.clone(),
            },
            None => String::new(),
        };

        let needs_key = matches!(config.provider_type.as_str(), "gemini" | "openai" | "anthropic");
        if needs_key && key.is_empty() {
            anyhow::bail!("Provider type '{}' requires an api_key", config.provider_type);
        }

        Ok(key)
    }

    /// Adapter bound to a model alias
    pub fn resolve(&self, alias: &str) -> Result<Arc<dyn LLMProvider>, LLMError> {
        self.bindings
            .get(alias)
            .map(|binding| binding.adapter.clone())
            .ok_or_else(|| LLMError::ModelNotFound(format!("Model alias '{}' not found", alias)))
    }

    /// Check health of every bound alias, concurrently
    pub async fn health_check_all(&self) -> HashMap<String, Result<(), LLMError>> {
        let checks = self.bindings.iter().map(|(alias, binding)| async move {
            info!(
                "Health checking alias '{}' ({} / {})",
                alias, binding.provider_name, binding.model
            );
            (alias.clone(), binding.adapter.health_check().await)
        });

        futures::future::join_all(checks).await.into_iter().collect()
    }

    /// Get list of available model aliases, sorted
    pub fn available_aliases(&self) -> Vec<String> {
        let mut aliases: Vec<String> = self.bindings.keys().cloned().collect();
        aliases.sort();
        aliases
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(name: &str, provider_type: &str, api_key: Option<&str>, aliases: &[&str]) -> LLMProviderConfig {
        LLMProviderConfig {
            name: name.to_string(),
            provider_type: provider_type.to_string(),
            endpoint: "http://localhost:11434".to_string(),
            api_key: api_key.map(str::to_string),
            enabled: true,
            models: aliases
                .iter()
                .map(|alias| ModelConfig {
                    alias: alias.to_string(),
                    model: format!("{}-model", alias),
                    context_window: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_registry_creation() {
        let mut config = GatewayConfigManifest::default();
        config.spec.llm_providers = vec![provider("ollama-local", "ollama", None, &["default", "fast"])];

        let registry = ProviderRegistry::from_config(&config).unwrap();
        assert!(registry.resolve("default").is_ok());
        assert_eq!(registry.available_aliases(), vec!["default".to_string(), "fast".to_string()]);
        assert!(matches!(registry.resolve("smart"), Err(LLMError::ModelNotFound(_))));
    }

    #[test]
    fn test_provider_without_key_is_skipped() {
        let mut config = GatewayConfigManifest::default();
        config.spec.llm_providers = vec![
            provider("gemini", "gemini", Some("env:AAGATE_TEST_UNSET_GEMINI_KEY"), &["default"]),
            provider("ollama-local", "ollama", None, &["local"]),
        ];

        let registry = ProviderRegistry::from_config(&config).unwrap();
        assert!(registry.resolve("default").is_err());
        assert!(registry.resolve("local").is_ok());
    }

    #[test]
    fn test_first_binding_of_an_alias_wins() {
        let mut config = GatewayConfigManifest::default();
        config.spec.llm_providers = vec![
            provider("first", "ollama", None, &["default"]),
            provider("second", "openai-compatible", None, &["default"]),
        ];

        let registry = ProviderRegistry::from_config(&config).unwrap();
        assert_eq!(registry.bindings["default"].provider_name, "first");
    }
}
