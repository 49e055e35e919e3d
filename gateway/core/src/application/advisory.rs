// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Advisory Gateway
//!
//! Typed request/response wrapper around the external text-generation
//! service. Every call runs the same pipeline:
//!
//! 1. validate the payload locally (the service is never contacted on failure)
//! 2. render the kind's prompt template
//! 3. invoke the provider once, asking for structured JSON output
//! 4. parse and check the reply against the kind's output shape
//!
//! Outcomes are counted in `aagate_advisory_requests_total{kind,outcome}`.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;

use crate::domain::advisory::{
    AdvisoryError, AdvisoryKind, AdvisoryRequest, AdvisoryResponse, AnomalyAdvisory,
    AnomalyAdvisoryRequest, FieldIssue, ViolationAdvisory, ViolationAdvisoryRequest,
};
use crate::domain::llm::{FinishReason, GenerationOptions, LLMProvider};
use crate::infrastructure::prompt_template_engine::{
    AdvisoryPromptContext, PromptTemplateEngine, PromptTemplateId,
};

pub const ADVISORY_REQUESTS_METRIC: &str = "aagate_advisory_requests_total";

/// Binds an advisory payload type to its template and output shape.
pub trait AdvisorySchema: Sync {
    const KIND: AdvisoryKind;
    const TEMPLATE: PromptTemplateId;

    type Output: DeserializeOwned + Serialize + Send;

    fn validate(&self) -> Result<(), Vec<FieldIssue>>;

    fn prompt_context(&self) -> AdvisoryPromptContext;

    /// JSON schema of `Output`, handed to providers with a structured mode
    fn response_schema() -> serde_json::Value;

    /// Constraints the schema alone cannot express
    fn check_output(_output: &Self::Output) -> Result<(), String> {
        Ok(())
    }
}

impl AdvisorySchema for AnomalyAdvisoryRequest {
    const KIND: AdvisoryKind = AdvisoryKind::Anomaly;
    const TEMPLATE: PromptTemplateId = PromptTemplateId::AnomalyAdvisory;

    type Output = AnomalyAdvisory;

    fn validate(&self) -> Result<(), Vec<FieldIssue>> {
        AnomalyAdvisoryRequest::validate(self)
    }

    fn prompt_context(&self) -> AdvisoryPromptContext {
        AdvisoryPromptContext::from(self)
    }

    fn response_schema() -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "isAnomalous": {
                    "type": "boolean",
                    "description": "Whether the agent behavior is anomalous."
                },
                "anomalyScore": {
                    "type": "number",
                    "description": "Severity of the anomaly, 0-100."
                },
                "explanation": {
                    "type": "string",
                    "description": "Why the behavior is or is not considered anomalous."
                },
                "suggestedRemediation": {
                    "type": "string",
                    "description": "Suggested actions to remediate the anomalous behavior."
                }
            },
            "required": ["isAnomalous", "anomalyScore", "explanation", "suggestedRemediation"]
        })
    }

    fn check_output(output: &AnomalyAdvisory) -> Result<(), String> {
        output.check()
    }
}

impl AdvisorySchema for ViolationAdvisoryRequest {
    const KIND: AdvisoryKind = AdvisoryKind::Violation;
    const TEMPLATE: PromptTemplateId = PromptTemplateId::ViolationAdvisory;

    type Output = ViolationAdvisory;

    fn validate(&self) -> Result<(), Vec<FieldIssue>> {
        ViolationAdvisoryRequest::validate(self)
    }

    fn prompt_context(&self) -> AdvisoryPromptContext {
        AdvisoryPromptContext::from(self)
    }

    fn response_schema() -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "classification": {
                    "type": "string",
                    "description": "The classification of the policy violation."
                },
                "context": {
                    "type": "string",
                    "description": "Context using MAESTRO, AIVSS, SEI SSVC, and the CSA Red Teaming Guide."
                },
                "suggestedRemediations": {
                    "type": "string",
                    "description": "Suggested remediations to address the security issue."
                }
            },
            "required": ["classification", "context", "suggestedRemediations"]
        })
    }
}

pub struct AdvisoryGateway {
    provider: Arc<dyn LLMProvider>,
    templates: Arc<PromptTemplateEngine>,
    options: GenerationOptions,
}

impl AdvisoryGateway {
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        templates: Arc<PromptTemplateEngine>,
        options: GenerationOptions,
    ) -> Self {
        Self {
            provider,
            templates,
            options,
        }
    }

    pub async fn detect_anomalies(
        &self,
        request: &AnomalyAdvisoryRequest,
    ) -> Result<AnomalyAdvisory, AdvisoryError> {
        self.invoke(request).await
    }

    pub async fn analyze_violation(
        &self,
        request: &ViolationAdvisoryRequest,
    ) -> Result<ViolationAdvisory, AdvisoryError> {
        self.invoke(request).await
    }

    /// Dispatch on the request kind; the response kind always matches.
    pub async fn request_advisory(
        &self,
        request: &AdvisoryRequest,
    ) -> Result<AdvisoryResponse, AdvisoryError> {
        match request {
            AdvisoryRequest::Anomaly(payload) => {
                self.invoke(payload).await.map(AdvisoryResponse::Anomaly)
            }
            AdvisoryRequest::Violation(payload) => {
                self.invoke(payload).await.map(AdvisoryResponse::Violation)
            }
        }
    }

    async fn invoke<R: AdvisorySchema>(&self, request: &R) -> Result<R::Output, AdvisoryError> {
        let result = self.run(request).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.kind_label(),
        };
        metrics::counter!(
            ADVISORY_REQUESTS_METRIC,
            "kind" => R::KIND.as_str(),
            "outcome" => outcome
        )
        .increment(1);

        result
    }

    async fn run<R: AdvisorySchema>(&self, request: &R) -> Result<R::Output, AdvisoryError> {
        if let Err(issues) = request.validate() {
            tracing::debug!(kind = %R::KIND, issues = issues.len(), "Advisory request rejected");
            return Err(AdvisoryError::Validation(issues));
        }

        let prompt = self
            .templates
            .render(R::TEMPLATE, &request.prompt_context())
            .map_err(|e| {
                tracing::error!(kind = %R::KIND, "Prompt rendering failed: {:#}", e);
                AdvisoryError::RemoteInvocation(format!("{:#}", e))
            })?;

        let options = GenerationOptions {
            response_schema: Some(R::response_schema()),
            ..self.options.clone()
        };

        let started = Instant::now();
        let response = self.provider.generate(&prompt, &options).await.map_err(|e| {
            tracing::warn!(kind = %R::KIND, "Advisory service call failed: {}", e);
            AdvisoryError::RemoteInvocation(e.to_string())
        })?;

        tracing::info!(
            kind = %R::KIND,
            provider = %response.provider,
            model = %response.model,
            total_tokens = response.usage.total_tokens,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Advisory service responded"
        );
        if response.finish_reason != FinishReason::Stop {
            tracing::warn!(kind = %R::KIND, finish_reason = ?response.finish_reason, "Advisory output may be incomplete");
        }

        let output: R::Output =
            parse_structured_output(&response.text).map_err(AdvisoryError::RemoteInvocation)?;
        R::check_output(&output).map_err(AdvisoryError::RemoteInvocation)?;

        Ok(output)
    }
}

/// Parse model output into `T`. Accepts a bare JSON object, a fenced
/// ```` ```json ```` block, or an object embedded in surrounding prose.
/// Empty or `null` output is an error, never a default value.
pub fn parse_structured_output<T: DeserializeOwned>(text: &str) -> Result<T, String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err("advisory service returned no output".to_string());
    }

    // Structured-output mode returns bare JSON whose strings may themselves
    // contain code fences, so extraction only runs when that parse fails.
    let value: serde_json::Value = match serde_json::from_str(trimmed) {
        Ok(value) => value,
        Err(bare_err) => {
            let candidate = extract_json(trimmed)
                .ok_or_else(|| format!("advisory output is not valid JSON: {}", bare_err))?;
            serde_json::from_str(candidate)
                .map_err(|e| format!("advisory output is not valid JSON: {}", e))?
        }
    };

    if value.is_null() {
        return Err("advisory service returned no output".to_string());
    }

    serde_json::from_value(value)
        .map_err(|e| format!("advisory output does not match the expected shape: {}", e))
}

fn extract_json(text: &str) -> Option<&str> {
    for marker in ["```json", "```"] {
        if let Some(start) = text.find(marker) {
            let content_start = start + marker.len();
            if let Some(end_offset) = text[content_start..].rfind("```") {
                return Some(text[content_start..content_start + end_offset].trim());
            }
        }
    }

    // Object wrapped in prose
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if end > start => Some(&text[start..=end]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fenced_json() {
        let text = "Here you go:\n```json\n{\"classification\":\"Data exfiltration\",\"context\":\"MAESTRO L3\",\"suggestedRemediations\":\"Revoke api:billing\"}\n```";
        let advisory: ViolationAdvisory = parse_structured_output(text).unwrap();
        assert_eq!(advisory.classification, "Data exfiltration");
    }

    #[test]
    fn parses_object_embedded_in_prose() {
        let text = "Result: {\"isAnomalous\":false,\"anomalyScore\":3,\"explanation\":\"ok\",\"suggestedRemediation\":\"none\"} done";
        let advisory: AnomalyAdvisory = parse_structured_output(text).unwrap();
        assert!(!advisory.is_anomalous);
        assert_eq!(advisory.anomaly_score, 3.0);
    }

    #[test]
    fn bare_json_with_fenced_snippet_in_a_field() {
        let text = r#"{"classification":"Privilege escalation","context":"MAESTRO L4","suggestedRemediations":"Apply:\n```rego\ndeny[msg] { true }\n```"}"#;
        let advisory: ViolationAdvisory = parse_structured_output(text).unwrap();
        assert_eq!(advisory.classification, "Privilege escalation");
        assert!(advisory.suggested_remediations.contains("```rego"));
    }

    #[test]
    fn fenced_reply_with_nested_fence_in_a_field() {
        let text = "```json\n{\"classification\":\"Drift\",\"context\":\"SSVC\",\"suggestedRemediations\":\"Run ```kubectl rollout undo```\"}\n```";
        let advisory: ViolationAdvisory = parse_structured_output(text).unwrap();
        assert_eq!(advisory.suggested_remediations, "Run ```kubectl rollout undo```");
    }

    #[test]
    fn empty_and_null_output_are_errors() {
        assert!(parse_structured_output::<ViolationAdvisory>("   ").is_err());
        assert!(parse_structured_output::<ViolationAdvisory>("null").is_err());
    }

    #[test]
    fn missing_fields_are_errors() {
        let err = parse_structured_output::<AnomalyAdvisory>("{\"isAnomalous\":true}").unwrap_err();
        assert!(err.contains("expected shape"));
    }

    #[test]
    fn schemas_require_every_output_field() {
        let anomaly = AnomalyAdvisoryRequest::response_schema();
        assert_eq!(anomaly["required"].as_array().unwrap().len(), 4);
        let violation = ViolationAdvisoryRequest::response_schema();
        assert_eq!(violation["required"].as_array().unwrap().len(), 3);
    }
}
