// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Governance Catalog
//!
//! The reference data the dashboard reads: policies, agents and shadow
//! deployments. A catalog is ingested once at process start, checked with
//! [`Catalog::validated`], and then handed to the repositories read-only.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::domain::agent::{Agent, AgentId, AgentInvariantError};
use crate::domain::drift::ShadowDeployment;
use crate::domain::policy::{Policy, PolicyError, PolicyId};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    #[serde(default)]
    pub policies: Vec<Policy>,
    #[serde(default)]
    pub agents: Vec<Agent>,
    #[serde(default)]
    pub shadow_deployments: Vec<ShadowDeployment>,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to parse catalog: {0}")]
    Parse(String),

    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("duplicate agent id '{0}'")]
    DuplicateAgent(AgentId),

    #[error("duplicate policy id '{0}'")]
    DuplicatePolicy(PolicyId),

    #[error("shadow deployment references unknown agent '{0}'")]
    UnknownShadowAgent(AgentId),

    #[error("more than one shadow deployment for agent '{0}'")]
    DuplicateShadow(AgentId),

    #[error(transparent)]
    Agent(#[from] AgentInvariantError),

    #[error(transparent)]
    Policy(#[from] PolicyError),
}

/// An agent's reference to a policy id that the catalog does not contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingPolicyRef {
    pub agent: AgentId,
    pub policy: PolicyId,
}

impl Catalog {
    /// Enforce identity uniqueness and entity invariants, normalising agents
    /// on the way (history in calendar order, no repeated policy ids).
    ///
    /// Dangling policy references are not an error; see
    /// [`Catalog::dangling_policy_refs`].
    pub fn validated(self) -> Result<Self, CatalogError> {
        let mut policy_ids = HashSet::with_capacity(self.policies.len());
        for policy in &self.policies {
            policy.validate()?;
            if !policy_ids.insert(policy.id.clone()) {
                return Err(CatalogError::DuplicatePolicy(policy.id.clone()));
            }
        }

        let mut agent_ids = HashSet::with_capacity(self.agents.len());
        let mut agents = Vec::with_capacity(self.agents.len());
        for agent in self.agents {
            if !agent_ids.insert(agent.id.clone()) {
                return Err(CatalogError::DuplicateAgent(agent.id));
            }
            agents.push(agent.normalized()?);
        }

        let mut shadowed = HashSet::with_capacity(self.shadow_deployments.len());
        for deployment in &self.shadow_deployments {
            if !agent_ids.contains(&deployment.agent_id) {
                return Err(CatalogError::UnknownShadowAgent(deployment.agent_id.clone()));
            }
            if !shadowed.insert(deployment.agent_id.clone()) {
                return Err(CatalogError::DuplicateShadow(deployment.agent_id.clone()));
            }
        }

        Ok(Self {
            policies: self.policies,
            agents,
            shadow_deployments: self.shadow_deployments,
        })
    }

    pub fn dangling_policy_refs(&self) -> Vec<DanglingPolicyRef> {
        let known: HashSet<&PolicyId> = self.policies.iter().map(|p| &p.id).collect();
        self.agents
            .iter()
            .flat_map(|agent| {
                agent
                    .policies
                    .iter()
                    .filter(|id| !known.contains(id))
                    .map(|id| DanglingPolicyRef {
                        agent: agent.id.clone(),
                        policy: id.clone(),
                    })
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}
