// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Catalog queries behind the dashboard views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::agent::{Agent, AgentCategory, AgentId, AgentStatus, RiskHistoryPoint};
use crate::domain::drift::ConfigDrift;
use crate::domain::policy::{Policy, PolicyId};
use crate::domain::repository::{
    AgentRepository, PolicyRepository, RepositoryError, ShadowDeploymentRepository,
};
use crate::domain::risk::{aggregate_platform_risk, RiskTier, StatusSeverity};
use crate::infrastructure::repositories::CatalogRepositories;

/// One agent with its classifications and the policies it references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentDetail {
    pub agent: Agent,
    pub severity: StatusSeverity,
    pub risk_tier: RiskTier,
    /// Catalog order. References to unknown policies are omitted.
    pub policies: Vec<Policy>,
}

/// Row of the agent table on the overview page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSummary {
    pub id: AgentId,
    pub name: String,
    pub category: AgentCategory,
    pub status: AgentStatus,
    pub severity: StatusSeverity,
    pub risk_score: u8,
    pub risk_tier: RiskTier,
    pub last_check_in: DateTime<Utc>,
    pub model: String,
}

impl From<&Agent> for AgentSummary {
    fn from(agent: &Agent) -> Self {
        Self {
            id: agent.id.clone(),
            name: agent.name.clone(),
            category: agent.category,
            status: agent.status,
            severity: agent.status_severity(),
            risk_score: agent.risk_score,
            risk_tier: agent.risk_tier(),
            last_check_in: agent.last_check_in,
            model: agent.model.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformOverview {
    pub risk_trend: Vec<RiskHistoryPoint>,
    pub agents: Vec<AgentSummary>,
}

#[derive(Clone)]
pub struct CatalogService {
    agents: Arc<dyn AgentRepository>,
    policies: Arc<dyn PolicyRepository>,
    shadows: Arc<dyn ShadowDeploymentRepository>,
}

impl CatalogService {
    pub fn new(
        agents: Arc<dyn AgentRepository>,
        policies: Arc<dyn PolicyRepository>,
        shadows: Arc<dyn ShadowDeploymentRepository>,
    ) -> Self {
        Self {
            agents,
            policies,
            shadows,
        }
    }

    pub fn from_repositories(repositories: CatalogRepositories) -> Self {
        Self::new(
            repositories.agents,
            repositories.policies,
            repositories.shadows,
        )
    }

    pub async fn list_agents(&self) -> Result<Vec<Agent>, RepositoryError> {
        self.agents.list_all().await
    }

    pub async fn find_agent(&self, id: &AgentId) -> Result<Option<Agent>, RepositoryError> {
        self.agents.find_by_id(id).await
    }

    pub async fn list_policies(&self) -> Result<Vec<Policy>, RepositoryError> {
        self.policies.list_all().await
    }

    pub async fn find_policy(&self, id: &PolicyId) -> Result<Option<Policy>, RepositoryError> {
        self.policies.find_by_id(id).await
    }

    pub async fn policies_by_ids(&self, ids: &[PolicyId]) -> Result<Vec<Policy>, RepositoryError> {
        self.policies.find_by_ids(ids).await
    }

    pub async fn agent_detail(&self, id: &AgentId) -> Result<Option<AgentDetail>, RepositoryError> {
        let Some(agent) = self.agents.find_by_id(id).await? else {
            return Ok(None);
        };
        let policies = self.policies.find_by_ids(&agent.policies).await?;

        Ok(Some(AgentDetail {
            severity: agent.status_severity(),
            risk_tier: agent.risk_tier(),
            policies,
            agent,
        }))
    }

    /// Daily platform average over every agent's history.
    pub async fn platform_risk_trend(&self) -> Result<Vec<RiskHistoryPoint>, RepositoryError> {
        let agents = self.agents.list_all().await?;
        Ok(aggregate_platform_risk(&agents))
    }

    pub async fn overview(&self) -> Result<PlatformOverview, RepositoryError> {
        let agents = self.agents.list_all().await?;
        Ok(PlatformOverview {
            risk_trend: aggregate_platform_risk(&agents),
            agents: agents.iter().map(AgentSummary::from).collect(),
        })
    }

    /// `None` when the agent has no shadow deployment.
    pub async fn shadow_drift(&self, agent_id: &AgentId) -> Result<Option<ConfigDrift>, RepositoryError> {
        let deployment = self.shadows.find_by_agent(agent_id).await?;
        Ok(deployment.map(|d| d.drift()))
    }
}
