// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Platform risk aggregation and classification over whole catalogs.

use aagate_core::domain::agent::{
    calendar_date, Agent, AgentCategory, AgentId, AgentStatus, RiskHistoryPoint,
};
use aagate_core::domain::risk::{
    aggregate_platform_risk, classify_risk_tier, classify_status, RiskTier, StatusSeverity,
};
use aagate_core::infrastructure::CatalogLoader;

fn agent(id: &str, status: AgentStatus, history: &[(&str, u8)]) -> Agent {
    Agent {
        id: AgentId::new(id),
        name: id.to_string(),
        category: AgentCategory::LanguageModel,
        status,
        risk_score: history.last().map(|(_, score)| *score).unwrap_or(0),
        last_check_in: "2024-07-31T10:00:00Z".parse().unwrap(),
        model: "Gemini 2.0-Flash".to_string(),
        version: "1.0.0".to_string(),
        risk_history: history
            .iter()
            .map(|(date, score)| RiskHistoryPoint::new(calendar_date::parse(date).unwrap(), *score))
            .collect(),
        logs: vec![],
        policies: vec![],
    }
}

fn points(trend: &[RiskHistoryPoint]) -> Vec<(String, u8)> {
    trend
        .iter()
        .map(|p| (p.date.format(calendar_date::FORMAT).to_string(), p.risk_score))
        .collect()
}

#[test]
fn test_two_agents_same_day_average() {
    let agents = vec![
        agent("a", AgentStatus::Online, &[("2024-07-25", 20)]),
        agent("b", AgentStatus::Online, &[("2024-07-25", 40)]),
    ];

    assert_eq!(
        points(&aggregate_platform_risk(&agents)),
        vec![("2024-07-25".to_string(), 30)]
    );
}

#[test]
fn test_half_rounds_up() {
    let agents = vec![
        agent("a", AgentStatus::Online, &[("2024-07-25", 20)]),
        agent("b", AgentStatus::Online, &[("2024-07-25", 21)]),
    ];

    assert_eq!(aggregate_platform_risk(&agents)[0].risk_score, 21);
}

#[test]
fn test_dates_sorted_chronologically_not_lexically() {
    // Unpadded input would sort "2024-7-10" before "2024-7-9" as text.
    let agents = vec![
        agent("a", AgentStatus::Online, &[("2024-7-10", 50), ("2024-7-9", 10)]),
        agent("b", AgentStatus::Offline, &[("2024-07-09", 30)]),
    ];

    assert_eq!(
        points(&aggregate_platform_risk(&agents)),
        vec![("2024-07-09".to_string(), 20), ("2024-07-10".to_string(), 50)]
    );
}

#[test]
fn test_sparse_histories_average_present_samples_only() {
    let agents = vec![
        agent("a", AgentStatus::Online, &[("2024-07-25", 10), ("2024-07-26", 90)]),
        agent("b", AgentStatus::Online, &[("2024-07-26", 70)]),
        agent("c", AgentStatus::Online, &[]),
    ];

    assert_eq!(
        points(&aggregate_platform_risk(&agents)),
        vec![("2024-07-25".to_string(), 10), ("2024-07-26".to_string(), 80)]
    );
}

#[test]
fn test_empty_catalog_has_empty_trend() {
    let agents: Vec<Agent> = vec![];
    assert!(aggregate_platform_risk(&agents).is_empty());
}

#[test]
fn test_builtin_catalog_trend() {
    let catalog = CatalogLoader::builtin().unwrap();
    let trend = points(&aggregate_platform_risk(&catalog.agents));

    assert_eq!(trend.len(), 7);
    // (20 + 10 + 45 + 40) / 4 = 28.75
    assert_eq!(trend[0], ("2024-07-25".to_string(), 29));
    // (22 + 8 + 78 + 45) / 4 = 38.25
    assert_eq!(trend[6], ("2024-07-31".to_string(), 38));
}

#[test]
fn test_classifiers_on_builtin_catalog() {
    let catalog = CatalogLoader::builtin().unwrap();
    let classified: Vec<_> = catalog
        .agents
        .iter()
        .map(|a| (a.id.as_str().to_string(), classify_status(a.status), classify_risk_tier(a.risk_score.into())))
        .collect();

    assert_eq!(
        classified,
        vec![
            ("agent-001".to_string(), StatusSeverity::Nominal, RiskTier::Low),
            ("agent-002".to_string(), StatusSeverity::Nominal, RiskTier::Low),
            ("agent-003".to_string(), StatusSeverity::Caution, RiskTier::High),
            ("agent-004".to_string(), StatusSeverity::Inactive, RiskTier::Medium),
        ]
    );
}

#[test]
fn test_tier_boundaries() {
    assert_eq!(classify_risk_tier(39), RiskTier::Low);
    assert_eq!(classify_risk_tier(40), RiskTier::Medium);
    assert_eq!(classify_risk_tier(69), RiskTier::Medium);
    assert_eq!(classify_risk_tier(70), RiskTier::High);
}
