// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Advisory gateway behaviour against a scripted LLM provider.
//!
//! The mock records every prompt it receives, which lets these tests assert
//! that invalid requests never reach the provider and that each valid request
//! is sent exactly once.

use aagate_core::application::advisory::AdvisoryGateway;
use aagate_core::domain::advisory::{
    AdvisoryError, AdvisoryKind, AdvisoryRequest, AdvisoryResponse, AnomalyAdvisoryRequest,
    ViolationAdvisoryRequest,
};
use aagate_core::domain::llm::{
    FinishReason, GenerationOptions, GenerationResponse, LLMError, LLMProvider, TokenUsage,
};
use aagate_core::infrastructure::prompt_template_engine::PromptTemplateEngine;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

enum Reply {
    Text(String),
    Fail,
}

struct MockProvider {
    reply: Reply,
    prompts: Mutex<Vec<String>>,
    schemas: Mutex<Vec<Option<serde_json::Value>>>,
}

impl MockProvider {
    fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Reply::Text(text.to_string()),
            prompts: Mutex::new(vec![]),
            schemas: Mutex::new(vec![]),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: Reply::Fail,
            prompts: Mutex::new(vec![]),
            schemas: Mutex::new(vec![]),
        })
    }

    fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl LLMProvider for MockProvider {
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<GenerationResponse, LLMError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.schemas.lock().unwrap().push(options.response_schema.clone());

        match &self.reply {
            Reply::Text(text) => Ok(GenerationResponse {
                text: text.clone(),
                usage: TokenUsage::default(),
                provider: "mock".to_string(),
                model: "mock-model".to_string(),
                finish_reason: FinishReason::Stop,
            }),
            Reply::Fail => Err(LLMError::Network("connection reset".to_string())),
        }
    }

    async fn health_check(&self) -> Result<(), LLMError> {
        Ok(())
    }
}

fn gateway(provider: Arc<MockProvider>) -> AdvisoryGateway {
    AdvisoryGateway::new(
        provider,
        Arc::new(PromptTemplateEngine::new().unwrap()),
        GenerationOptions::default(),
    )
}

const ANOMALY_REPLY: &str = r#"{"isAnomalous":true,"anomalyScore":85,"explanation":"Memory pressure combined with denied access to a secure data source.","suggestedRemediation":"Quarantine the agent and review its data source grants."}"#;

const VIOLATION_REPLY: &str = r#"{"classification":"Unauthorized data access","context":"MAESTRO layer 2 data operations; AIVSS high.","suggestedRemediations":"Revoke the grant and rotate credentials."}"#;

#[tokio::test]
async fn test_anomaly_pass_through() {
    let provider = MockProvider::replying(ANOMALY_REPLY);
    let gateway = gateway(provider.clone());

    let request = AnomalyAdvisoryRequest::new(
        "agent-003",
        vec![
            "High memory usage detected: 92%.".to_string(),
            "Failed to access data source: /secure/db1. Permission denied.".to_string(),
        ],
    );
    let advisory = gateway.detect_anomalies(&request).await.unwrap();

    assert!(advisory.is_anomalous);
    assert_eq!(advisory.anomaly_score, 85.0);
    assert_eq!(provider.calls(), 1);

    let prompt = provider.last_prompt();
    assert!(prompt.contains("agent-003"));
    assert!(prompt.contains("- High memory usage detected: 92%."));

    let schema = provider.schemas.lock().unwrap()[0].clone().unwrap();
    assert_eq!(schema["properties"]["anomalyScore"]["type"], "number");
}

#[tokio::test]
async fn test_invalid_anomaly_request_never_calls_provider() {
    let provider = MockProvider::replying(ANOMALY_REPLY);
    let gateway = gateway(provider.clone());

    let err = gateway
        .detect_anomalies(&AnomalyAdvisoryRequest::new("agent-003", vec![]))
        .await
        .unwrap_err();

    match err {
        AdvisoryError::Validation(issues) => {
            assert_eq!(issues.len(), 1);
            assert_eq!(issues[0].field, "securitySignals");
            assert_eq!(issues[0].message, "Please provide at least one security signal.");
        }
        other => panic!("expected validation error, got {:?}", other),
    }
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_missing_agent_id_never_calls_provider() {
    let provider = MockProvider::replying(ANOMALY_REPLY);
    let gateway = gateway(provider.clone());

    for agent_id in ["", "   "] {
        let request = AnomalyAdvisoryRequest::new(agent_id, vec!["signal".to_string()]);
        let err = gateway.detect_anomalies(&request).await.unwrap_err();

        match err {
            AdvisoryError::Validation(issues) => {
                assert_eq!(issues.len(), 1);
                assert_eq!(issues[0].field, "agentId");
                assert_eq!(issues[0].message, "Agent ID is required.");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_violation_length_boundary() {
    let provider = MockProvider::replying(VIOLATION_REPLY);
    let gateway = gateway(provider.clone());

    let short = ViolationAdvisoryRequest::new("Leak!", "ERROR: Failed to access /secure/db1");
    assert!(matches!(
        gateway.analyze_violation(&short).await,
        Err(AdvisoryError::Validation(_))
    ));
    assert_eq!(provider.calls(), 0);

    let exact = ViolationAdvisoryRequest::new("0123456789", "ERROR: Failed to access /secure/db1");
    let advisory = gateway.analyze_violation(&exact).await.unwrap();
    assert_eq!(advisory.classification, "Unauthorized data access");
    assert_eq!(provider.calls(), 1);
    assert!(provider.last_prompt().contains("Policy Violation Description: 0123456789"));
}

#[tokio::test]
async fn test_provider_failure_is_remote_invocation_error() {
    let provider = MockProvider::failing();
    let gateway = gateway(provider.clone());

    let err = gateway
        .analyze_violation(&ViolationAdvisoryRequest::new(
            "Agent exported PII to an external endpoint",
            "WARN: outbound transfer of 2MB to api.example.com",
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, AdvisoryError::RemoteInvocation(ref msg) if msg.contains("connection reset")));
    assert_eq!(err.kind_label(), "remote_invocation");
    // One attempt, no retry.
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn test_null_output_is_an_error_not_a_default() {
    let provider = MockProvider::replying("null");
    let gateway = gateway(provider);

    let err = gateway
        .detect_anomalies(&AnomalyAdvisoryRequest::new("agent-001", vec!["signal".to_string()]))
        .await
        .unwrap_err();
    assert!(matches!(err, AdvisoryError::RemoteInvocation(_)));
}

#[tokio::test]
async fn test_out_of_range_score_is_rejected() {
    let provider = MockProvider::replying(
        r#"{"isAnomalous":true,"anomalyScore":140,"explanation":"x","suggestedRemediation":"y"}"#,
    );
    let gateway = gateway(provider);

    let err = gateway
        .detect_anomalies(&AnomalyAdvisoryRequest::new("agent-001", vec!["signal".to_string()]))
        .await
        .unwrap_err();
    assert!(matches!(err, AdvisoryError::RemoteInvocation(ref msg) if msg.contains("anomalyScore")));
}

#[tokio::test]
async fn test_response_kind_matches_request_kind() {
    let provider = MockProvider::replying(VIOLATION_REPLY);
    let gateway = gateway(provider);

    let request = AdvisoryRequest::Violation(ViolationAdvisoryRequest::new(
        "Agent exported PII to an external endpoint",
        "WARN: outbound transfer of 2MB to api.example.com",
    ));
    let response = gateway.request_advisory(&request).await.unwrap();

    assert_eq!(response.kind(), AdvisoryKind::Violation);
    assert!(matches!(response, AdvisoryResponse::Violation(_)));
}

#[tokio::test]
async fn test_concurrent_requests_are_independent() {
    let provider = MockProvider::replying(ANOMALY_REPLY);
    let gateway = Arc::new(gateway(provider.clone()));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let gateway = gateway.clone();
            tokio::spawn(async move {
                let request =
                    AnomalyAdvisoryRequest::new(format!("agent-{:03}", i), vec![format!("signal {}", i)]);
                gateway.detect_anomalies(&request).await
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }
    assert_eq!(provider.calls(), 8);
}
