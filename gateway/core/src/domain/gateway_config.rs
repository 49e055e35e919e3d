// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Gateway Configuration Types
//
// Defines the configuration schema of an AAGATE gateway process:
// - Kubernetes-style manifest format (apiVersion/kind/metadata/spec)
// - Catalog source
// - LLM provider configuration and model alias mapping
// - Advisory generation settings
// - HTTP API and observability settings

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::domain::llm::GenerationOptions;

pub const API_VERSION: &str = "aagate.dev/v1";
pub const KIND: &str = "GatewayConfig";

/// Provider types the infrastructure layer knows how to build.
pub const SUPPORTED_PROVIDER_TYPES: &[&str] =
    &["gemini", "openai", "openai-compatible", "anthropic", "ollama"];

/// Top-level Kubernetes-style gateway configuration manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfigManifest {
    /// API version (must be "aagate.dev/v1")
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Resource kind (must be "GatewayConfig")
    pub kind: String,

    pub metadata: ManifestMetadata,

    #[serde(default)]
    pub spec: GatewayConfigSpec,
}

/// Manifest metadata (Kubernetes-style)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    /// Human-readable deployment name
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
}

/// Gateway settings (content under `spec:`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfigSpec {
    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub llm_providers: Vec<LLMProviderConfig>,

    #[serde(default)]
    pub advisory: AdvisoryConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// YAML or JSON catalog file. The builtin seed catalog is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMProviderConfig {
    /// Unique provider name (e.g., "gemini", "ollama-local")
    pub name: String,

    /// Provider type
    #[serde(rename = "type")]
    pub provider_type: String, // "gemini", "openai", "openai-compatible", "anthropic", "ollama"

    /// API endpoint URL
    pub endpoint: String,

    /// API key (supports "env:VAR_NAME" for environment variables)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Whether this provider is active
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Available models on this provider
    pub models: Vec<ModelConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Alias referenced by `spec.advisory.model_alias` (e.g., "default", "fast")
    pub alias: String,

    /// Actual model identifier for the provider API
    pub model: String,

    /// Maximum context window size in tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_window: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisoryConfig {
    /// Model alias used for both advisory kinds
    #[serde(default = "default_model_alias")]
    pub model_alias: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Upper bound on a single provider call
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Replacement handlebars template for anomaly prompts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anomaly_prompt: Option<String>,

    /// Replacement handlebars template for violation prompts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violation_prompt: Option<String>,
}

impl AdvisoryConfig {
    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            max_tokens: Some(self.max_tokens),
            temperature: Some(self.temperature),
            stop_sequences: None,
            response_schema: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Network bind address (e.g. "0.0.0.0" or "127.0.0.1")
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// HTTP API port
    #[serde(default = "default_api_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json, text)
    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Expose a Prometheus scrape endpoint
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_model_alias() -> String {
    "default".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_request_timeout() -> u64 {
    60
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_api_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_metrics_port() -> u16 {
    9090
}

impl Default for GatewayConfigSpec {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig::default(),
            llm_providers: vec![LLMProviderConfig {
                name: "gemini".to_string(),
                provider_type: "gemini".to_string(),
                endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
                api_key: Some("env:GEMINI_API_KEY".to_string()),
                enabled: true,
                models: vec![ModelConfig {
                    alias: default_model_alias(),
                    model: "gemini-2.0-flash".to_string(),
                    context_window: Some(1_048_576),
                }],
            }],
            advisory: AdvisoryConfig::default(),
            api: ApiConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            model_alias: default_model_alias(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout(),
            anomaly_prompt: None,
            violation_prompt: None,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_api_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: default_metrics_port(),
        }
    }
}

impl Default for GatewayConfigManifest {
    fn default() -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ManifestMetadata {
                name: "aagate".to_string(),
                version: Some("1.0.0".to_string()),
                labels: None,
            },
            spec: GatewayConfigSpec::default(),
        }
    }
}

impl GatewayConfigManifest {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Save configuration to YAML file
    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Discover configuration file using precedence order
    /// 1. AAGATE_CONFIG_PATH environment variable
    /// 2. ./aagate-config.yaml (working directory)
    /// 3. ~/.aagate/config.yaml (user home)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("AAGATE_CONFIG_PATH") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./aagate-config.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".aagate").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        None
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // Explicit CLI path fails if missing or invalid
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path).map_err(|e| {
                anyhow::anyhow!("Failed to load config at {:?}: {}", path, e)
            })?;
            config.apply_env_overrides();
            return Ok(config);
        }

        if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            let mut config = Self::from_yaml_file(&config_path).map_err(|e| {
                anyhow::anyhow!("Failed to load config at {:?}: {}", config_path, e)
            })?;
            config.apply_env_overrides();
            Ok(config)
        } else {
            tracing::warn!("No configuration file found in standard locations. Using defaults.");
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        if let Ok(alias) = std::env::var("AAGATE_MODEL_ALIAS") {
            if alias.trim().is_empty() {
                tracing::warn!("AAGATE_MODEL_ALIAS is set but empty. Ignoring.");
            } else {
                tracing::info!("Environment override: AAGATE_MODEL_ALIAS={}", alias);
                self.spec.advisory.model_alias = alias;
            }
        }

        if let Ok(val) = std::env::var("AAGATE_API_PORT") {
            match val.parse::<u16>() {
                Ok(port) => {
                    tracing::info!("Environment override: AAGATE_API_PORT={}", port);
                    self.spec.api.port = port;
                }
                Err(_) => {
                    tracing::warn!(
                        "Invalid value for AAGATE_API_PORT: '{}'. Expected a port number. Ignoring.",
                        val
                    );
                }
            }
        }
    }

    /// Provider and model bound to `alias`, skipping disabled providers.
    pub fn resolve_alias(&self, alias: &str) -> Option<(&LLMProviderConfig, &ModelConfig)> {
        self.spec
            .llm_providers
            .iter()
            .filter(|p| p.enabled)
            .find_map(|p| p.models.iter().find(|m| m.alias == alias).map(|m| (p, m)))
    }

    /// Validate configuration, including that the advisory model alias is
    /// bound to an enabled provider.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_settings()?;
        self.validate_advisory_alias()
    }

    /// Fails when `spec.advisory.model_alias` matches no enabled provider model.
    pub fn validate_advisory_alias(&self) -> anyhow::Result<()> {
        let alias = &self.spec.advisory.model_alias;
        if self.resolve_alias(alias).is_none() {
            anyhow::bail!(
                "Advisory model alias '{}' does not match a model of any enabled provider",
                alias
            );
        }
        Ok(())
    }

    /// Every check of [`Self::validate`] except advisory alias resolution.
    /// The catalog routes can be served without any model configured.
    pub fn validate_settings(&self) -> anyhow::Result<()> {
        if self.api_version != API_VERSION {
            anyhow::bail!(
                "Invalid apiVersion: '{}'. Must be '{}'",
                self.api_version,
                API_VERSION
            );
        }

        if self.kind != KIND {
            anyhow::bail!("Invalid kind: '{}'. Must be '{}'", self.kind, KIND);
        }

        if self.metadata.name.is_empty() {
            anyhow::bail!("metadata.name cannot be empty");
        }

        let mut names = std::collections::HashSet::new();
        for provider in &self.spec.llm_providers {
            if provider.name.is_empty() {
                anyhow::bail!("LLM provider name cannot be empty");
            }

            if !names.insert(provider.name.as_str()) {
                anyhow::bail!("Duplicate LLM provider name: {}", provider.name);
            }

            if !SUPPORTED_PROVIDER_TYPES.contains(&provider.provider_type.as_str()) {
                anyhow::bail!(
                    "Unsupported LLM provider type '{}' for: {}. Expected one of: {}",
                    provider.provider_type,
                    provider.name,
                    SUPPORTED_PROVIDER_TYPES.join(", ")
                );
            }

            if provider.endpoint.is_empty() {
                anyhow::bail!("LLM provider endpoint cannot be empty for: {}", provider.name);
            }

            if provider.models.is_empty() {
                anyhow::bail!("LLM provider must have at least one model: {}", provider.name);
            }

            for model in &provider.models {
                if model.alias.is_empty() {
                    anyhow::bail!("Model alias cannot be empty in provider: {}", provider.name);
                }

                if model.model.is_empty() {
                    anyhow::bail!("Model identifier cannot be empty for alias: {}", model.alias);
                }
            }
        }

        let advisory = &self.spec.advisory;

        if !(0.0..=2.0).contains(&advisory.temperature) {
            anyhow::bail!(
                "spec.advisory.temperature must be within 0.0..=2.0, got {}",
                advisory.temperature
            );
        }

        if advisory.max_tokens == 0 {
            anyhow::bail!("spec.advisory.max_tokens must be greater than zero");
        }

        if advisory.request_timeout_secs == 0 {
            anyhow::bail!("spec.advisory.request_timeout_secs must be greater than zero");
        }

        match self.spec.observability.logging.format.as_str() {
            "json" | "text" => {}
            other => anyhow::bail!(
                "Invalid logging format '{}'. Must be 'json' or 'text'",
                other
            ),
        }

        Ok(())
    }
}
