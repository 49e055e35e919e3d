// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Advisory Requests and Responses
//!
//! Typed contracts of the two advisory calls the dashboard makes to the
//! external text-generation service:
//!
//! - **anomaly**: is this agent behaving anomalously given a list of
//!   security signals?
//! - **violation**: classify a described policy violation and propose
//!   remediations given the related security logs.
//!
//! Requests are validated locally before anything is sent. Responses are
//! checked after they are parsed. Every failure becomes an [`AdvisoryError`].

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Minimum length, in characters, of both violation free-text fields.
pub const MIN_VIOLATION_TEXT_LEN: usize = 10;

/// Anomaly scores are reported on this closed range.
pub const ANOMALY_SCORE_RANGE: std::ops::RangeInclusive<f64> = 0.0..=100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryKind {
    Anomaly,
    Violation,
}

impl AdvisoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdvisoryKind::Anomaly => "anomaly",
            AdvisoryKind::Violation => "violation",
        }
    }
}

impl fmt::Display for AdvisoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field-level validation problem, phrased for the end user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AdvisoryError {
    /// Rejected locally; the advisory service was never contacted.
    #[error("invalid advisory request: {}", join_issues(.0))]
    Validation(Vec<FieldIssue>),

    /// The advisory service was called but produced no usable result.
    #[error("advisory service call failed: {0}")]
    RemoteInvocation(String),
}

impl AdvisoryError {
    pub fn kind_label(&self) -> &'static str {
        match self {
            AdvisoryError::Validation(_) => "validation",
            AdvisoryError::RemoteInvocation(_) => "remote_invocation",
        }
    }

    pub fn issues(&self) -> &[FieldIssue] {
        match self {
            AdvisoryError::Validation(issues) => issues,
            AdvisoryError::RemoteInvocation(_) => &[],
        }
    }
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// ============================================================================
// Anomaly advisory
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyAdvisoryRequest {
    #[serde(default)]
    pub agent_id: String,
    #[serde(default)]
    pub security_signals: Vec<String>,
}

impl AnomalyAdvisoryRequest {
    pub fn new(agent_id: impl Into<String>, security_signals: Vec<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            security_signals,
        }
    }

    pub fn validate(&self) -> Result<(), Vec<FieldIssue>> {
        let mut issues = Vec::new();

        if self.agent_id.trim().is_empty() {
            issues.push(FieldIssue::new("agentId", "Agent ID is required."));
        }

        if self.security_signals.is_empty() {
            issues.push(FieldIssue::new(
                "securitySignals",
                "Please provide at least one security signal.",
            ));
        }
        for (index, signal) in self.security_signals.iter().enumerate() {
            if signal.trim().is_empty() {
                issues.push(FieldIssue::new(
                    format!("securitySignals[{}]", index),
                    "Security signals must not be blank.",
                ));
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }
}

/// Split free text into one signal per non-blank line.
pub fn parse_signal_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyAdvisory {
    pub is_anomalous: bool,
    /// Severity on `0..=100`.
    pub anomaly_score: f64,
    pub explanation: String,
    pub suggested_remediation: String,
}

impl AnomalyAdvisory {
    pub fn check(&self) -> Result<(), String> {
        if !self.anomaly_score.is_finite() || !ANOMALY_SCORE_RANGE.contains(&self.anomaly_score) {
            return Err(format!(
                "anomalyScore {} is outside the range 0-100",
                self.anomaly_score
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Violation advisory
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationAdvisoryRequest {
    #[serde(default)]
    pub violation_description: String,
    #[serde(default)]
    pub security_logs: String,
}

impl ViolationAdvisoryRequest {
    pub fn new(violation_description: impl Into<String>, security_logs: impl Into<String>) -> Self {
        Self {
            violation_description: violation_description.into(),
            security_logs: security_logs.into(),
        }
    }

    pub fn validate(&self) -> Result<(), Vec<FieldIssue>> {
        let mut issues = Vec::new();

        if self.violation_description.chars().count() < MIN_VIOLATION_TEXT_LEN {
            issues.push(FieldIssue::new(
                "violationDescription",
                "Please provide a detailed description.",
            ));
        }
        if self.security_logs.chars().count() < MIN_VIOLATION_TEXT_LEN {
            issues.push(FieldIssue::new(
                "securityLogs",
                "Please provide relevant security logs.",
            ));
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationAdvisory {
    pub classification: String,
    /// Framing against MAESTRO, AIVSS, SEI SSVC and the CSA Red Teaming Guide.
    pub context: String,
    pub suggested_remediations: String,
}

// ============================================================================
// Tagged unions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum AdvisoryRequest {
    Anomaly(AnomalyAdvisoryRequest),
    Violation(ViolationAdvisoryRequest),
}

impl AdvisoryRequest {
    pub fn kind(&self) -> AdvisoryKind {
        match self {
            AdvisoryRequest::Anomaly(_) => AdvisoryKind::Anomaly,
            AdvisoryRequest::Violation(_) => AdvisoryKind::Violation,
        }
    }

    pub fn validate(&self) -> Result<(), Vec<FieldIssue>> {
        match self {
            AdvisoryRequest::Anomaly(request) => request.validate(),
            AdvisoryRequest::Violation(request) => request.validate(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "advisory", rename_all = "snake_case")]
pub enum AdvisoryResponse {
    Anomaly(AnomalyAdvisory),
    Violation(ViolationAdvisory),
}

impl AdvisoryResponse {
    pub fn kind(&self) -> AdvisoryKind {
        match self {
            AdvisoryResponse::Anomaly(_) => AdvisoryKind::Anomaly,
            AdvisoryResponse::Violation(_) => AdvisoryKind::Violation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anomaly_request_requires_agent_and_signals() {
        let issues = AnomalyAdvisoryRequest::new("", vec![]).validate().unwrap_err();
        let fields: Vec<_> = issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(fields, vec!["agentId", "securitySignals"]);

        let issues = AnomalyAdvisoryRequest::new("agent-003", vec!["ok".into(), "  ".into()])
            .validate()
            .unwrap_err();
        assert_eq!(issues, vec![FieldIssue::new("securitySignals[1]", "Security signals must not be blank.")]);

        assert!(AnomalyAdvisoryRequest::new("agent-003", vec!["High memory usage detected: 92%.".into()])
            .validate()
            .is_ok());
    }

    #[test]
    fn violation_fields_need_ten_characters() {
        let short = ViolationAdvisoryRequest::new("short", "0123456789");
        let issues = short.validate().unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "violationDescription");

        assert!(ViolationAdvisoryRequest::new("0123456789", "0123456789").validate().is_ok());
        // Length counts characters, not bytes.
        assert!(ViolationAdvisoryRequest::new("ééééé", "0123456789").validate().is_err());
    }

    #[test]
    fn missing_fields_deserialize_to_invalid_requests() {
        let request: AnomalyAdvisoryRequest = serde_json::from_str("{}").unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn parse_signal_lines_drops_blank_lines() {
        let signals = parse_signal_lines(
            "High memory usage detected: 92%.\n\n  Failed to access data source: /secure/db1.  \n",
        );
        assert_eq!(
            signals,
            vec![
                "High memory usage detected: 92%.".to_string(),
                "Failed to access data source: /secure/db1.".to_string(),
            ]
        );
    }

    #[test]
    fn anomaly_score_must_stay_in_range() {
        let mut advisory = AnomalyAdvisory {
            is_anomalous: true,
            anomaly_score: 85.0,
            explanation: "memory spike".into(),
            suggested_remediation: "restart".into(),
        };
        assert!(advisory.check().is_ok());
        advisory.anomaly_score = 100.5;
        assert!(advisory.check().is_err());
        advisory.anomaly_score = f64::NAN;
        assert!(advisory.check().is_err());
    }

    #[test]
    fn tagged_request_wire_shape() {
        let request = AdvisoryRequest::Anomaly(AnomalyAdvisoryRequest::new(
            "agent-003",
            vec!["signal".into()],
        ));
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["kind"], "anomaly");
        assert_eq!(json["payload"]["agentId"], "agent-003");
        assert_eq!(request.kind(), AdvisoryKind::Anomaly);
    }

    #[test]
    fn validation_error_display_lists_fields() {
        let err = AdvisoryError::Validation(vec![FieldIssue::new("agentId", "Agent ID is required.")]);
        assert_eq!(err.to_string(), "invalid advisory request: agentId: Agent ID is required.");
        assert_eq!(err.kind_label(), "validation");
        assert_eq!(err.issues().len(), 1);
    }
}
