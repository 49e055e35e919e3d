// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Router tests driven through `tower::ServiceExt::oneshot`.

use aagate_core::application::advisory::AdvisoryGateway;
use aagate_core::application::catalog::CatalogService;
use aagate_core::domain::llm::{
    FinishReason, GenerationOptions, GenerationResponse, LLMError, LLMProvider, TokenUsage,
};
use aagate_core::infrastructure::prompt_template_engine::PromptTemplateEngine;
use aagate_core::infrastructure::{CatalogLoader, CatalogRepositories};
use aagate_core::presentation::api::app;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

struct FixedProvider(Result<&'static str, ()>);

#[async_trait]
impl LLMProvider for FixedProvider {
    async fn generate(
        &self,
        _prompt: &str,
        _options: &GenerationOptions,
    ) -> Result<GenerationResponse, LLMError> {
        match self.0 {
            Ok(text) => Ok(GenerationResponse {
                text: text.to_string(),
                usage: TokenUsage::default(),
                provider: "fixed".to_string(),
                model: "fixed".to_string(),
                finish_reason: FinishReason::Stop,
            }),
            Err(()) => Err(LLMError::RateLimit),
        }
    }

    async fn health_check(&self) -> Result<(), LLMError> {
        Ok(())
    }
}

fn router(provider: Option<FixedProvider>) -> Router {
    let catalog = CatalogService::from_repositories(CatalogRepositories::in_memory(
        CatalogLoader::builtin().unwrap(),
    ));
    let advisories = provider.map(|p| {
        Arc::new(AdvisoryGateway::new(
            Arc::new(p),
            Arc::new(PromptTemplateEngine::new().unwrap()),
            GenerationOptions::default(),
        ))
    });
    app(catalog, advisories)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let resp = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn post(app: Router, uri: &str, body: String) -> (StatusCode, Value) {
    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get(router(None), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_agent_detail_and_missing_agent() {
    let (status, body) = get(router(None), "/api/agents/agent-003").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["agent"]["name"], "Sentinel");
    assert_eq!(body["severity"], "caution");
    assert_eq!(body["riskTier"], "high");
    assert_eq!(body["agent"]["riskHistory"][0]["date"], "2024-07-25");

    let (status, _) = get(router(None), "/api/agents/agent-404").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_platform_risk_trend() {
    let (status, body) = get(router(None), "/api/risk/platform").await;
    assert_eq!(status, StatusCode::OK);
    let trend = body.as_array().unwrap();
    assert_eq!(trend.len(), 7);
    assert_eq!(trend[0], json!({"date": "2024-07-25", "riskScore": 29}));
}

#[tokio::test]
async fn test_shadow_drift_route() {
    let (status, body) = get(router(None), "/api/agents/agent-001/shadow-drift").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["addedPermissions"], json!(["api:billing"]));

    let (status, _) = get(router(None), "/api/agents/agent-003/shadow-drift").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_anomaly_success_envelope() {
    let provider = FixedProvider(Ok(
        r#"{"isAnomalous":false,"anomalyScore":12,"explanation":"Nominal.","suggestedRemediation":"None."}"#,
    ));
    let body = json!({"agentId": "agent-002", "securitySignals": ["Agent online and connected."]});

    let (status, body) = post(router(Some(provider)), "/api/advisories/anomaly", body.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["anomalyScore"], 12.0);
}

#[tokio::test]
async fn test_violation_validation_envelope() {
    let provider = FixedProvider(Ok("{}"));
    let body = json!({"violationDescription": "short", "securityLogs": "also short"});

    let (status, body) = post(router(Some(provider)), "/api/advisories/violation", body.to_string()).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["status"], "failure");
    assert_eq!(body["kind"], "validation");
    assert_eq!(body["issues"][0]["field"], "violationDescription");
    assert_eq!(body["issues"][0]["message"], "Please provide a detailed description.");
}

#[tokio::test]
async fn test_remote_failure_envelope() {
    let provider = FixedProvider(Err(()));
    let body = json!({"agentId": "agent-003", "securitySignals": ["High memory usage detected: 92%."]});

    let (status, body) = post(router(Some(provider)), "/api/advisories/anomaly", body.to_string()).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["kind"], "remote_invocation");
    assert!(body.get("issues").is_none());
}

#[tokio::test]
async fn test_malformed_json_is_validation_failure() {
    let provider = FixedProvider(Ok("{}"));
    let (status, body) = post(
        router(Some(provider)),
        "/api/advisories/anomaly",
        r#"{"agentId": 7"#.to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "validation");
}

#[tokio::test]
async fn test_advisories_unavailable_without_provider() {
    let body = json!({"agentId": "agent-003", "securitySignals": ["x"]});
    let (status, body) = post(router(None), "/api/advisories/anomaly", body.to_string()).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["kind"], "unavailable");
}
