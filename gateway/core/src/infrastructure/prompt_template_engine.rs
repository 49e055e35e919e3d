// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Prompt Template Engine
//!
//! Renders the two advisory prompts with Handlebars.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Turn a validated advisory payload into the final prompt text
//! - **Integration:** `AdvisoryGateway` → `LLMProvider::generate`
//!
//! # Supported Placeholders
//!
//! - `{{{agentId}}}` - Agent under analysis (anomaly)
//! - `{{#each securitySignals}}` - One entry per security signal (anomaly)
//! - `{{{violationDescription}}}` - Free-text violation description (violation)
//! - `{{{securityLogs}}}` - Related security log excerpt (violation)
//!
//! Triple-stash placeholders keep the text unescaped. Templates run in strict
//! mode, so a placeholder without a value fails the render instead of
//! silently producing an empty string.

use anyhow::{Context, Result};
use handlebars::Handlebars;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::advisory::{AnomalyAdvisoryRequest, ViolationAdvisoryRequest};

const ANOMALY_TEMPLATE: &str = r#"You are a security expert tasked with detecting anomalous behavior in AI agents.

Analyze the following security signals for agent ID {{{agentId}}} and determine if the agent's behavior is anomalous.

Security Signals:
{{#each securitySignals}}- {{{this}}}
{{/each}}
Based on these signals, determine the isAnomalous boolean, provide an anomalyScore (0-100), an explanation for your determination, and suggest a remediation.

Respond with a single JSON object with the fields "isAnomalous" (boolean), "anomalyScore" (number), "explanation" (string) and "suggestedRemediation" (string)."#;

const VIOLATION_TEMPLATE: &str = r#"You are a security expert specializing in classifying policy violations and suggesting remediations.

Analyze the following policy violation description and security logs to classify the violation, provide context using MAESTRO, AIVSS, SEI SSVC, and the CSA Red Teaming Guide, and suggest remediations.

Policy Violation Description: {{{violationDescription}}}
Security Logs: {{{securityLogs}}}

Respond with a single JSON object with the fields "classification" (string), "context" (string) and "suggestedRemediations" (string)."#;

// ============================================================================
// Template Identity
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptTemplateId {
    AnomalyAdvisory,
    ViolationAdvisory,
}

impl PromptTemplateId {
    pub const ALL: [PromptTemplateId; 2] =
        [PromptTemplateId::AnomalyAdvisory, PromptTemplateId::ViolationAdvisory];

    pub fn as_str(&self) -> &'static str {
        match self {
            PromptTemplateId::AnomalyAdvisory => "anomaly-advisory",
            PromptTemplateId::ViolationAdvisory => "violation-advisory",
        }
    }

    /// Template text shipped with the gateway
    pub fn builtin(&self) -> &'static str {
        match self {
            PromptTemplateId::AnomalyAdvisory => ANOMALY_TEMPLATE,
            PromptTemplateId::ViolationAdvisory => VIOLATION_TEMPLATE,
        }
    }
}

impl fmt::Display for PromptTemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Template Context
// ============================================================================

/// Context data for advisory prompt rendering
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisoryPromptContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_signals: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub violation_description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_logs: Option<String>,
}

impl AdvisoryPromptContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter for agent id
    pub fn agent_id(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    /// Builder-style setter for security signals
    pub fn security_signals(mut self, signals: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.security_signals = Some(signals.into_iter().map(Into::into).collect());
        self
    }

    /// Builder-style setter for violation description
    pub fn violation_description(mut self, description: impl Into<String>) -> Self {
        self.violation_description = Some(description.into());
        self
    }

    /// Builder-style setter for security logs
    pub fn security_logs(mut self, logs: impl Into<String>) -> Self {
        self.security_logs = Some(logs.into());
        self
    }
}

impl From<&AnomalyAdvisoryRequest> for AdvisoryPromptContext {
    fn from(request: &AnomalyAdvisoryRequest) -> Self {
        Self::new()
            .agent_id(request.agent_id.as_str())
            .security_signals(request.security_signals.iter().map(String::as_str))
    }
}

impl From<&ViolationAdvisoryRequest> for AdvisoryPromptContext {
    fn from(request: &ViolationAdvisoryRequest) -> Self {
        Self::new()
            .violation_description(request.violation_description.as_str())
            .security_logs(request.security_logs.as_str())
    }
}

// ============================================================================
// Template Engine
// ============================================================================

pub struct PromptTemplateEngine {
    handlebars: Handlebars<'static>,
}

impl PromptTemplateEngine {
    /// Create an engine with the builtin advisory templates registered
    pub fn new() -> Result<Self> {
        Self::with_overrides(None, None)
    }

    /// Create an engine, replacing either builtin template. Overrides are
    /// compiled here so a broken template fails at startup.
    pub fn with_overrides(anomaly: Option<&str>, violation: Option<&str>) -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars.register_escape_fn(handlebars::no_escape);

        for id in PromptTemplateId::ALL {
            let template = match id {
                PromptTemplateId::AnomalyAdvisory => anomaly,
                PromptTemplateId::ViolationAdvisory => violation,
            };
            if template.is_some() {
                tracing::info!(template = %id, "Using prompt template override");
            }
            handlebars
                .register_template_string(id.as_str(), template.unwrap_or(id.builtin()))
                .with_context(|| format!("Invalid Handlebars template '{}'", id))?;
        }

        Ok(Self { handlebars })
    }

    /// Render a registered template with context
    pub fn render(&self, id: PromptTemplateId, context: &AdvisoryPromptContext) -> Result<String> {
        self.handlebars
            .render(id.as_str(), context)
            .with_context(|| format!("Failed to render prompt template '{}'", id))
    }

    /// Validate template syntax without registering it
    pub fn validate_template(template: &str) -> Result<()> {
        handlebars::template::Template::compile(template)
            .map(|_| ())
            .context("Invalid Handlebars template syntax")
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anomaly_rendering() {
        let engine = PromptTemplateEngine::new().unwrap();
        let request = AnomalyAdvisoryRequest::new(
            "agent-003",
            vec![
                "High memory usage detected: 92%.".to_string(),
                "Failed to access data source: /secure/db1. Reason: Permission denied.".to_string(),
            ],
        );

        let prompt = engine
            .render(PromptTemplateId::AnomalyAdvisory, &AdvisoryPromptContext::from(&request))
            .unwrap();

        assert!(prompt.contains("agent ID agent-003"));
        assert!(prompt.contains("- High memory usage detected: 92%.\n"));
        assert!(prompt.contains("- Failed to access data source: /secure/db1."));
        assert!(prompt.contains("anomalyScore (0-100)"));
    }

    #[test]
    fn test_violation_rendering_is_unescaped() {
        let engine = PromptTemplateEngine::new().unwrap();
        let request = ViolationAdvisoryRequest::new(
            "Agent 'Janus' exported <PII> to an external endpoint",
            "ERROR: Failed to apply policy p003 & retry scheduled",
        );

        let prompt = engine
            .render(PromptTemplateId::ViolationAdvisory, &AdvisoryPromptContext::from(&request))
            .unwrap();

        assert!(prompt.contains("Policy Violation Description: Agent 'Janus' exported <PII>"));
        assert!(prompt.contains("Security Logs: ERROR: Failed to apply policy p003 & retry"));
    }

    #[test]
    fn test_missing_variables_fail_in_strict_mode() {
        let engine = PromptTemplateEngine::new().unwrap();
        let context = AdvisoryPromptContext::new().agent_id("agent-001");

        assert!(engine
            .render(PromptTemplateId::ViolationAdvisory, &context)
            .is_err());
    }

    #[test]
    fn test_override_replaces_builtin() {
        let engine =
            PromptTemplateEngine::with_overrides(Some("Agent {{{agentId}}}"), None).unwrap();
        let context = AdvisoryPromptContext::new()
            .agent_id("agent-002")
            .security_signals(["signal"]);

        let prompt = engine
            .render(PromptTemplateId::AnomalyAdvisory, &context)
            .unwrap();
        assert_eq!(prompt, "Agent agent-002");
    }

    #[test]
    fn test_broken_override_is_rejected() {
        assert!(PromptTemplateEngine::with_overrides(None, Some("{{securityLogs")).is_err());
    }

    #[test]
    fn test_validate_template() {
        assert!(PromptTemplateEngine::validate_template("{{{agentId}}}").is_ok());
        assert!(PromptTemplateEngine::validate_template("{{#each securitySignals}}").is_err());
    }
}
