// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Llm
//!
//! Domain interface of the external text-generation service.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Anti-corruption boundary between the advisory gateway and
//!   vendor APIs. Implementations live in `crate::infrastructure::llm`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Domain interface for LLM providers
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate a completion for a fully rendered prompt
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<GenerationResponse, LLMError>;

    /// Check if provider is healthy and accessible
    async fn health_check(&self) -> Result<(), LLMError>;
}

/// Options for LLM generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,

    /// Sampling temperature (0.0 = deterministic, 1.0 = creative)
    pub temperature: Option<f32>,

    /// Sequences that stop generation
    pub stop_sequences: Option<Vec<String>>,

    /// JSON schema the reply must conform to. Providers with a structured
    /// output mode are switched into it; the others rely on the prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<serde_json::Value>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_tokens: Some(1024),
            temperature: Some(0.2),
            stop_sequences: None,
            response_schema: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerationResponse {
    /// Generated text
    pub text: String,

    /// Token usage stats
    pub usage: TokenUsage,

    /// Provider type (e.g., "gemini", "ollama")
    pub provider: String,

    /// Model used (e.g., "gemini-2.0-flash", "llama3.2")
    pub model: String,

    /// Why generation stopped
    pub finish_reason: FinishReason,
}

#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Reason why generation stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishReason {
    /// Natural completion (model decided to stop)
    Stop,

    /// Hit max_tokens limit
    Length,

    /// Blocked by content filter
    ContentFilter,
}

/// Errors that can occur during LLM operations
#[derive(Debug, thiserror::Error)]
pub enum LLMError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider error: {0}")]
    Provider(String),
}

impl LLMError {
    /// Map a non-success HTTP status to the matching error.
    pub fn from_status(status: u16, body: String, model: &str) -> Self {
        match status {
            401 | 403 => LLMError::Authentication(body),
            429 => LLMError::RateLimit,
            404 => LLMError::ModelNotFound(model.to_string()),
            _ => LLMError::Provider(format!("HTTP {}: {}", status, body)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert!(matches!(
            LLMError::from_status(401, "bad key".into(), "m"),
            LLMError::Authentication(body) if body == "bad key"
        ));
        assert!(matches!(LLMError::from_status(429, String::new(), "m"), LLMError::RateLimit));
        assert!(matches!(
            LLMError::from_status(404, String::new(), "gemini-2.0-flash"),
            LLMError::ModelNotFound(model) if model == "gemini-2.0-flash"
        ));
        assert_eq!(
            LLMError::from_status(500, "boom".into(), "m").to_string(),
            "Provider error: HTTP 500: boom"
        );
    }
}
