// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Agent Aggregate
//!
//! Identity and status snapshot of a monitored AI system, together with its
//! daily risk samples, its operational log and the ids of the governance
//! policies attached to it.
//!
//! Agents are catalog reference data: they are built once at startup and never
//! mutated or deleted at runtime (a retired agent is reported `offline`).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

use crate::domain::policy::PolicyId;
use crate::domain::risk::{classify_risk_tier, classify_status, RiskTier, StatusSeverity};

/// Upper bound (inclusive) of every risk score.
pub const MAX_RISK_SCORE: u8 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgentCategory {
    LanguageModel,
    AutonomousAgent,
    DataAnalysis,
}

impl fmt::Display for AgentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AgentCategory::LanguageModel => "Language Model",
            AgentCategory::AutonomousAgent => "Autonomous Agent",
            AgentCategory::DataAnalysis => "Data Analysis",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Online,
    Offline,
    Warning,
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AgentStatus::Online => "Online",
            AgentStatus::Offline => "Offline",
            AgentStatus::Warning => "Warning",
        })
    }
}

/// One daily risk sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskHistoryPoint {
    #[serde(with = "calendar_date")]
    pub date: NaiveDate,
    pub risk_score: u8,
}

impl RiskHistoryPoint {
    pub fn new(date: NaiveDate, risk_score: u8) -> Self {
        Self { date, risk_score }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[serde(alias = "INFO")]
    Info,
    #[serde(alias = "WARN")]
    Warn,
    #[serde(alias = "ERROR")]
    Error,
}

impl LogLevel {
    /// Warnings and errors get highlighted in every log view.
    pub fn is_problem(&self) -> bool {
        matches!(self, LogLevel::Warn | LogLevel::Error)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentLog {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub category: AgentCategory,
    pub status: AgentStatus,
    pub risk_score: u8,
    pub last_check_in: DateTime<Utc>,
    pub model: String,
    pub version: String,
    /// Chronological daily samples, one per calendar date.
    #[serde(default)]
    pub risk_history: Vec<RiskHistoryPoint>,
    /// Ordered by occurrence.
    #[serde(default)]
    pub logs: Vec<AgentLog>,
    #[serde(default)]
    pub policies: Vec<PolicyId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AgentInvariantError {
    #[error("agent id must not be empty")]
    EmptyId,

    #[error("agent '{agent}': risk score {score} is outside 0..=100")]
    RiskScoreOutOfRange { agent: AgentId, score: u8 },

    #[error("agent '{agent}': risk score {score} recorded on {date} is outside 0..=100")]
    HistoryScoreOutOfRange {
        agent: AgentId,
        date: NaiveDate,
        score: u8,
    },

    #[error("agent '{agent}': more than one risk sample recorded on {date}")]
    DuplicateHistoryDate { agent: AgentId, date: NaiveDate },
}

impl Agent {
    /// Check the aggregate invariants without modifying anything.
    pub fn validate(&self) -> Result<(), AgentInvariantError> {
        if self.id.as_str().trim().is_empty() {
            return Err(AgentInvariantError::EmptyId);
        }

        if self.risk_score > MAX_RISK_SCORE {
            return Err(AgentInvariantError::RiskScoreOutOfRange {
                agent: self.id.clone(),
                score: self.risk_score,
            });
        }

        let mut seen = HashSet::with_capacity(self.risk_history.len());
        for point in &self.risk_history {
            if point.risk_score > MAX_RISK_SCORE {
                return Err(AgentInvariantError::HistoryScoreOutOfRange {
                    agent: self.id.clone(),
                    date: point.date,
                    score: point.risk_score,
                });
            }
            if !seen.insert(point.date) {
                return Err(AgentInvariantError::DuplicateHistoryDate {
                    agent: self.id.clone(),
                    date: point.date,
                });
            }
        }

        Ok(())
    }

    /// Validate, then put the risk history into calendar order and drop
    /// repeated policy references.
    pub fn normalized(mut self) -> Result<Self, AgentInvariantError> {
        self.validate()?;
        self.risk_history.sort_by_key(|point| point.date);

        let mut seen = HashSet::with_capacity(self.policies.len());
        self.policies.retain(|id| seen.insert(id.clone()));

        Ok(self)
    }

    pub fn status_severity(&self) -> StatusSeverity {
        classify_status(self.status)
    }

    pub fn risk_tier(&self) -> RiskTier {
        classify_risk_tier(i64::from(self.risk_score))
    }

    pub fn references_policy(&self, policy: &PolicyId) -> bool {
        self.policies.contains(policy)
    }

    /// Warnings and errors, oldest first.
    pub fn problem_logs(&self) -> impl Iterator<Item = &AgentLog> {
        self.logs.iter().filter(|log| log.level.is_problem())
    }
}

/// `YYYY-MM-DD` calendar dates. Month and day may be written without zero
/// padding (`2024-7-9`); serialization always emits the padded form.
pub mod calendar_date {
    use chrono::NaiveDate;
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d";

    pub fn parse(raw: &str) -> Result<NaiveDate, chrono::ParseError> {
        NaiveDate::parse_from_str(raw.trim(), FORMAT)
    }

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&date.format(FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(|e| D::Error::custom(format!("invalid calendar date '{}': {}", raw, e)))
    }
}
