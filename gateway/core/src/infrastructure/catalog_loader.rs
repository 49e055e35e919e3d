// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Catalog Loader
//!
//! Ingests the governance catalog from the builtin seed or from a YAML/JSON
//! file, and validates it before it reaches the repositories.

use std::path::Path;

use crate::domain::catalog::{Catalog, CatalogError};

const SEED_CATALOG: &str = include_str!("../../seed/catalog.yaml");

pub struct CatalogLoader;

impl CatalogLoader {
    /// Builtin catalog shipped with the gateway
    pub fn builtin() -> Result<Catalog, CatalogError> {
        Self::from_yaml_str(SEED_CATALOG)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Catalog, CatalogError> {
        let catalog: Catalog =
            serde_yaml::from_str(yaml).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Self::finish(catalog)
    }

    pub fn from_json_str(json: &str) -> Result<Catalog, CatalogError> {
        let catalog: Catalog =
            serde_json::from_str(json).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Self::finish(catalog)
    }

    /// Load a catalog file; `.json` files are parsed as JSON, anything else as YAML
    pub fn from_file(path: impl AsRef<Path>) -> Result<Catalog, CatalogError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;

        tracing::info!("Loading catalog from {:?}", path);
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    /// Load from `path` when given, otherwise the builtin catalog
    pub fn load(path: Option<&Path>) -> Result<Catalog, CatalogError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                tracing::info!("Using builtin catalog");
                Self::builtin()
            }
        }
    }

    fn finish(catalog: Catalog) -> Result<Catalog, CatalogError> {
        let catalog = catalog.validated()?;

        for dangling in catalog.dangling_policy_refs() {
            tracing::warn!(
                agent = %dangling.agent,
                policy = %dangling.policy,
                "Agent references a policy missing from the catalog"
            );
        }

        tracing::debug!(
            agents = catalog.agents.len(),
            policies = catalog.policies.len(),
            shadow_deployments = catalog.shadow_deployments.len(),
            "Catalog loaded"
        );

        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::agent::AgentId;
    use std::io::Write;

    #[test]
    fn builtin_catalog_is_valid() {
        let catalog = CatalogLoader::builtin().unwrap();
        assert_eq!(catalog.policies.len(), 3);
        assert_eq!(catalog.agents.len(), 4);
        assert_eq!(catalog.shadow_deployments.len(), 1);
        assert!(catalog.dangling_policy_refs().is_empty());

        let sentinel = catalog
            .agents
            .iter()
            .find(|a| a.id == AgentId::new("agent-003"))
            .unwrap();
        assert_eq!(sentinel.risk_score, 78);
        assert_eq!(sentinel.risk_history.len(), 7);
        assert_eq!(sentinel.problem_logs().count(), 2);
    }

    #[test]
    fn json_file_is_detected_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"policies":[],"agents":[{{"id":"a1","name":"A","category":"language-model","status":"online","riskScore":30,"lastCheckIn":"2024-07-31T10:00:00Z","model":"m","version":"1","riskHistory":[{{"date":"2024-7-2","riskScore":30}},{{"date":"2024-7-1","riskScore":20}}]}}]}}"#
        )
        .unwrap();

        let catalog = CatalogLoader::from_file(file.path()).unwrap();
        let history = &catalog.agents[0].risk_history;
        assert_eq!(history[0].risk_score, 20);
        assert_eq!(history[1].risk_score, 30);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = CatalogLoader::from_file("/nonexistent/catalog.yaml").unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let err = CatalogLoader::from_yaml_str("agents: [ {id: ").unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }
}
