// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// LLM Provider Infrastructure - Anti-Corruption Layer Implementations
//
// Each provider adapter translates between the domain `LLMProvider`
// interface and one vendor API.

pub mod gemini;
pub mod openai;
pub mod ollama;
pub mod anthropic;
pub mod registry;

pub use registry::ProviderRegistry;

use crate::domain::llm::LLMError;
use std::time::Duration;

/// HTTP client shared by the adapters of one provider.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, LLMError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| LLMError::Network(format!("Failed to build HTTP client: {}", e)))
}

/// Turn a non-success response into the matching error.
pub(crate) async fn error_from_response(response: reqwest::Response, model: &str) -> LLMError {
    let status = response.status().as_u16();
    let error_text = response.text().await.unwrap_or_default();
    LLMError::from_status(status, error_text, model)
}
