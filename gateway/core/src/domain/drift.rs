// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Shadow Configuration Drift
//!
//! A shadow deployment runs a candidate configuration of a production agent
//! side by side with it. Drift detection reports the structural differences a
//! reviewer has to sign off before the shadow is promoted: permission grants
//! and revocations, parameter changes, and model or version changes.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::domain::agent::AgentId;

/// Deployed configuration of one agent instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfigSnapshot {
    pub name: String,
    pub version: String,
    pub model: String,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub parameters: BTreeMap<String, serde_json::Value>,
}

/// A production agent paired with its shadow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShadowDeployment {
    pub agent_id: AgentId,
    pub production: AgentConfigSnapshot,
    pub shadow: AgentConfigSnapshot,
}

impl ShadowDeployment {
    pub fn drift(&self) -> ConfigDrift {
        detect_config_drift(&self.production, &self.shadow)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueChange {
    pub production: String,
    pub shadow: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterChangeKind {
    Added,
    Removed,
    Modified,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterChange {
    pub name: String,
    pub kind: ParameterChangeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDrift {
    /// Granted to the shadow but not to production.
    pub added_permissions: Vec<String>,
    /// Held by production but dropped from the shadow.
    pub removed_permissions: Vec<String>,
    pub parameter_changes: Vec<ParameterChange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_change: Option<ValueChange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_change: Option<ValueChange>,
}

impl ConfigDrift {
    pub fn is_empty(&self) -> bool {
        self.added_permissions.is_empty()
            && self.removed_permissions.is_empty()
            && self.parameter_changes.is_empty()
            && self.model_change.is_none()
            && self.version_change.is_none()
    }

    /// New permissions widen what the agent may do and need review first.
    pub fn escalates_privileges(&self) -> bool {
        !self.added_permissions.is_empty()
    }
}

pub fn detect_config_drift(
    production: &AgentConfigSnapshot,
    shadow: &AgentConfigSnapshot,
) -> ConfigDrift {
    let prod_perms: BTreeSet<&str> = production.permissions.iter().map(String::as_str).collect();
    let shadow_perms: BTreeSet<&str> = shadow.permissions.iter().map(String::as_str).collect();

    let added_permissions = shadow_perms
        .difference(&prod_perms)
        .map(|p| p.to_string())
        .collect();
    let removed_permissions = prod_perms
        .difference(&shadow_perms)
        .map(|p| p.to_string())
        .collect();

    let names: BTreeSet<&String> = production
        .parameters
        .keys()
        .chain(shadow.parameters.keys())
        .collect();

    let parameter_changes = names
        .into_iter()
        .filter_map(|name| {
            let before = production.parameters.get(name);
            let after = shadow.parameters.get(name);
            let kind = match (before, after) {
                (Some(b), Some(a)) if same_value(b, a) => return None,
                (Some(_), Some(_)) => ParameterChangeKind::Modified,
                (None, Some(_)) => ParameterChangeKind::Added,
                (Some(_), None) => ParameterChangeKind::Removed,
                (None, None) => return None,
            };
            Some(ParameterChange {
                name: name.clone(),
                kind,
                production: before.cloned(),
                shadow: after.cloned(),
            })
        })
        .collect();

    ConfigDrift {
        added_permissions,
        removed_permissions,
        parameter_changes,
        model_change: changed(&production.model, &shadow.model),
        version_change: changed(&production.version, &shadow.version),
    }
}

/// Structural equality where numbers compare by value, so `1024` and
/// `1024.0` are the same setting.
fn same_value(a: &serde_json::Value, b: &serde_json::Value) -> bool {
    use serde_json::Value;

    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(x, y)| same_value(x, y))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(key, value)| y.get(key).is_some_and(|other| same_value(value, other)))
        }
        _ => a == b,
    }
}

fn changed(production: &str, shadow: &str) -> Option<ValueChange> {
    (production != shadow).then(|| ValueChange {
        production: production.to_string(),
        shadow: shadow.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot(version: &str, permissions: &[&str], max_tokens: u64) -> AgentConfigSnapshot {
        AgentConfigSnapshot {
            name: "Janus".to_string(),
            version: version.to_string(),
            model: "Gemini 2.0-Flash".to_string(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            parameters: BTreeMap::from([
                ("temperature".to_string(), json!(0.7)),
                ("max_tokens".to_string(), json!(max_tokens)),
            ]),
        }
    }

    #[test]
    fn reports_added_permission_and_modified_parameter() {
        let production = snapshot("1.2.3", &["read:database", "write:logs", "api:external"], 1024);
        let shadow = snapshot(
            "1.2.4-shadow",
            &["read:database", "write:logs", "api:external", "api:billing"],
            2048,
        );

        let drift = detect_config_drift(&production, &shadow);

        assert_eq!(drift.added_permissions, vec!["api:billing".to_string()]);
        assert!(drift.removed_permissions.is_empty());
        assert_eq!(drift.parameter_changes.len(), 1);
        let change = &drift.parameter_changes[0];
        assert_eq!(change.name, "max_tokens");
        assert_eq!(change.kind, ParameterChangeKind::Modified);
        assert_eq!(change.production, Some(json!(1024)));
        assert_eq!(change.shadow, Some(json!(2048)));
        assert!(drift.model_change.is_none());
        assert_eq!(drift.version_change.as_ref().unwrap().shadow, "1.2.4-shadow");
        assert!(drift.escalates_privileges());
    }

    #[test]
    fn integer_and_float_forms_of_a_number_are_equal() {
        let production = snapshot("1.2.3", &["read:database"], 1024);
        let mut shadow = production.clone();
        shadow.parameters.insert("max_tokens".to_string(), json!(1024.0));
        shadow
            .parameters
            .insert("stop".to_string(), json!({ "limits": [1, 2.5] }));
        let mut production = production;
        production
            .parameters
            .insert("stop".to_string(), json!({ "limits": [1.0, 2.5] }));

        assert!(detect_config_drift(&production, &shadow).is_empty());

        shadow.parameters.insert("max_tokens".to_string(), json!(1024.5));
        let drift = detect_config_drift(&production, &shadow);
        assert_eq!(drift.parameter_changes.len(), 1);
        assert_eq!(drift.parameter_changes[0].kind, ParameterChangeKind::Modified);
    }

    #[test]
    fn identical_snapshots_have_no_drift() {
        let production = snapshot("1.2.3", &["read:database"], 1024);
        assert!(detect_config_drift(&production, &production.clone()).is_empty());
    }

    #[test]
    fn reports_removed_and_added_parameters() {
        let production = snapshot("1.0.0", &["write:logs"], 512);
        let mut shadow = production.clone();
        shadow.permissions.clear();
        shadow.parameters.remove("temperature");
        shadow.parameters.insert("top_p".to_string(), json!(0.9));

        let drift = detect_config_drift(&production, &shadow);
        assert_eq!(drift.removed_permissions, vec!["write:logs".to_string()]);
        let kinds: Vec<_> = drift
            .parameter_changes
            .iter()
            .map(|c| (c.name.as_str(), c.kind))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("temperature", ParameterChangeKind::Removed),
                ("top_p", ParameterChangeKind::Added),
            ]
        );
        assert!(!drift.escalates_privileges());
    }
}
