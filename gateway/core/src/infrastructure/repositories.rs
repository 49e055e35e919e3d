// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Repository Implementations
//!
//! In-memory implementations of the catalog repositories defined in
//! `crate::domain::repository`.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Serve the validated catalog to the application layer
//! - **Pattern:** Repository (DDD), Adapter (Hexagonal Architecture)
//!
//! The catalog is immutable once loaded, so the repositories share their
//! data behind an `Arc` and take no locks. Listing preserves catalog order;
//! lookups go through an id index.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::agent::{Agent, AgentId};
use crate::domain::catalog::Catalog;
use crate::domain::drift::ShadowDeployment;
use crate::domain::policy::{Policy, PolicyId};
use crate::domain::repository::{
    AgentRepository, PolicyRepository, RepositoryError, ShadowDeploymentRepository,
};

#[derive(Clone)]
pub struct InMemoryAgentRepository {
    agents: Arc<Vec<Agent>>,
    index: Arc<HashMap<AgentId, usize>>,
}

impl InMemoryAgentRepository {
    pub fn new(agents: Vec<Agent>) -> Self {
        let index = agents
            .iter()
            .enumerate()
            .map(|(position, agent)| (agent.id.clone(), position))
            .collect();
        Self {
            agents: Arc::new(agents),
            index: Arc::new(index),
        }
    }
}

#[async_trait]
impl AgentRepository for InMemoryAgentRepository {
    async fn find_by_id(&self, id: &AgentId) -> Result<Option<Agent>, RepositoryError> {
        Ok(self.index.get(id).map(|&position| self.agents[position].clone()))
    }

    async fn list_all(&self) -> Result<Vec<Agent>, RepositoryError> {
        Ok(self.agents.as_ref().clone())
    }
}

#[derive(Clone)]
pub struct InMemoryPolicyRepository {
    policies: Arc<Vec<Policy>>,
    index: Arc<HashMap<PolicyId, usize>>,
}

impl InMemoryPolicyRepository {
    pub fn new(policies: Vec<Policy>) -> Self {
        let index = policies
            .iter()
            .enumerate()
            .map(|(position, policy)| (policy.id.clone(), position))
            .collect();
        Self {
            policies: Arc::new(policies),
            index: Arc::new(index),
        }
    }
}

#[async_trait]
impl PolicyRepository for InMemoryPolicyRepository {
    async fn find_by_id(&self, id: &PolicyId) -> Result<Option<Policy>, RepositoryError> {
        Ok(self.index.get(id).map(|&position| self.policies[position].clone()))
    }

    async fn list_all(&self) -> Result<Vec<Policy>, RepositoryError> {
        Ok(self.policies.as_ref().clone())
    }

    async fn find_by_ids(&self, ids: &[PolicyId]) -> Result<Vec<Policy>, RepositoryError> {
        Ok(self
            .policies
            .iter()
            .filter(|policy| ids.contains(&policy.id))
            .cloned()
            .collect())
    }
}

#[derive(Clone)]
pub struct InMemoryShadowDeploymentRepository {
    deployments: Arc<HashMap<AgentId, ShadowDeployment>>,
}

impl InMemoryShadowDeploymentRepository {
    pub fn new(deployments: Vec<ShadowDeployment>) -> Self {
        Self {
            deployments: Arc::new(
                deployments
                    .into_iter()
                    .map(|deployment| (deployment.agent_id.clone(), deployment))
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl ShadowDeploymentRepository for InMemoryShadowDeploymentRepository {
    async fn find_by_agent(
        &self,
        agent_id: &AgentId,
    ) -> Result<Option<ShadowDeployment>, RepositoryError> {
        Ok(self.deployments.get(agent_id).cloned())
    }
}

/// The three repositories over one validated catalog.
#[derive(Clone)]
pub struct CatalogRepositories {
    pub agents: Arc<dyn AgentRepository>,
    pub policies: Arc<dyn PolicyRepository>,
    pub shadows: Arc<dyn ShadowDeploymentRepository>,
}

impl CatalogRepositories {
    pub fn in_memory(catalog: Catalog) -> Self {
        Self {
            agents: Arc::new(InMemoryAgentRepository::new(catalog.agents)),
            policies: Arc::new(InMemoryPolicyRepository::new(catalog.policies)),
            shadows: Arc::new(InMemoryShadowDeploymentRepository::new(
                catalog.shadow_deployments,
            )),
        }
    }
}
