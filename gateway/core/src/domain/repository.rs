// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Repository Interfaces
//!
//! Read contracts for the catalog aggregates, following the DDD Repository
//! pattern: interface defined in the domain layer, implemented in
//! `crate::infrastructure::repositories`.
//!
//! | Trait | Aggregate | Implementations |
//! |-------|-----------|----------------|
//! | `AgentRepository` | `Agent` | `InMemoryAgentRepository` |
//! | `PolicyRepository` | `Policy` | `InMemoryPolicyRepository` |
//! | `ShadowDeploymentRepository` | `ShadowDeployment` | `InMemoryShadowDeploymentRepository` |
//!
//! The catalog has no runtime writer, so the contracts are read-only. A miss
//! is `Ok(None)` (or an empty `Vec`), never an error.

use async_trait::async_trait;

use crate::domain::agent::{Agent, AgentId};
use crate::domain::drift::ShadowDeployment;
use crate::domain::policy::{Policy, PolicyId};

#[async_trait]
pub trait AgentRepository: Send + Sync {
    /// Find agent by ID
    async fn find_by_id(&self, id: &AgentId) -> Result<Option<Agent>, RepositoryError>;

    /// List all agents in catalog order
    async fn list_all(&self) -> Result<Vec<Agent>, RepositoryError>;
}

#[async_trait]
pub trait PolicyRepository: Send + Sync {
    /// Find policy by ID
    async fn find_by_id(&self, id: &PolicyId) -> Result<Option<Policy>, RepositoryError>;

    /// List all policies in catalog order
    async fn list_all(&self) -> Result<Vec<Policy>, RepositoryError>;

    /// Policies whose id is in `ids`, in catalog order. Unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[PolicyId]) -> Result<Vec<Policy>, RepositoryError>;
}

#[async_trait]
pub trait ShadowDeploymentRepository: Send + Sync {
    /// Shadow deployment paired with a production agent, if any
    async fn find_by_agent(&self, agent_id: &AgentId) -> Result<Option<ShadowDeployment>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Catalog backend unavailable: {0}")]
    Unavailable(String),
}
