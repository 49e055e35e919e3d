// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Risk Aggregation and Classification
//!
//! Pure functions over catalog data:
//!
//! - [`aggregate_platform_risk`] averages every agent's daily samples into a
//!   single platform-wide trend.
//! - [`classify_status`] maps an [`AgentStatus`] to its visual severity.
//! - [`classify_risk_tier`] buckets a numeric score into low/medium/high.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::domain::agent::{Agent, AgentStatus, RiskHistoryPoint};

/// Lowest score classified as [`RiskTier::Medium`].
pub const MEDIUM_RISK_THRESHOLD: i64 = 40;
/// Lowest score classified as [`RiskTier::High`].
pub const HIGH_RISK_THRESHOLD: i64 = 70;

/// Severity bucket of a risk score. Ordered `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RiskTier::Low => "low",
            RiskTier::Medium => "medium",
            RiskTier::High => "high",
        })
    }
}

/// Visual severity of an agent's connection status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusSeverity {
    Nominal,
    Caution,
    /// Status unknown because the agent is not reporting.
    Inactive,
}

impl fmt::Display for StatusSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StatusSeverity::Nominal => "nominal",
            StatusSeverity::Caution => "caution",
            StatusSeverity::Inactive => "inactive",
        })
    }
}

pub fn classify_status(status: AgentStatus) -> StatusSeverity {
    match status {
        AgentStatus::Online => StatusSeverity::Nominal,
        AgentStatus::Warning => StatusSeverity::Caution,
        AgentStatus::Offline => StatusSeverity::Inactive,
    }
}

/// Defined for every integer; values outside 0..=100 use the same thresholds.
pub fn classify_risk_tier(score: i64) -> RiskTier {
    if score < MEDIUM_RISK_THRESHOLD {
        RiskTier::Low
    } else if score < HIGH_RISK_THRESHOLD {
        RiskTier::Medium
    } else {
        RiskTier::High
    }
}

/// Platform-wide daily average risk.
///
/// One point per distinct date found in any agent's history, each the mean of
/// that date's samples rounded half-up, ordered by calendar date.
pub fn aggregate_platform_risk<'a, I>(agents: I) -> Vec<RiskHistoryPoint>
where
    I: IntoIterator<Item = &'a Agent>,
{
    let mut by_date: BTreeMap<NaiveDate, (u32, u32)> = BTreeMap::new();

    for agent in agents {
        for point in &agent.risk_history {
            let (total, count) = by_date.entry(point.date).or_insert((0, 0));
            *total += u32::from(point.risk_score);
            *count += 1;
        }
    }

    by_date
        .into_iter()
        .map(|(date, (total, count))| RiskHistoryPoint::new(date, rounded_mean(total, count)))
        .collect()
}

/// `round(total / count)` with halves rounded up, in integer arithmetic.
fn rounded_mean(total: u32, count: u32) -> u8 {
    let mean = (2 * u64::from(total) + u64::from(count)) / (2 * u64::from(count));
    // Each sample is a u8, so the mean is too.
    mean as u8
}
