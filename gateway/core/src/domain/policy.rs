// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyId(pub String);

impl PolicyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PolicyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PolicyId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Governance rule document.
///
/// `rego_code` is stored and displayed verbatim; nothing in this crate parses
/// or evaluates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    pub id: PolicyId,
    pub name: String,
    pub description: String,
    /// Compliance framework citation, e.g. `NIST AI RMF - V.1`.
    pub control: String,
    pub rego_code: String,
}

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("policy id must not be empty")]
    EmptyId,

    #[error("policy '{0}' has no name")]
    MissingName(PolicyId),
}

impl Policy {
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.id.as_str().trim().is_empty() {
            return Err(PolicyError::EmptyId);
        }
        if self.name.trim().is_empty() {
            return Err(PolicyError::MissingName(self.id.clone()));
        }
        Ok(())
    }

    /// First `package` declaration of the Rego source, if any.
    pub fn rego_package(&self) -> Option<&str> {
        self.rego_code
            .lines()
            .map(str::trim)
            .find_map(|line| line.strip_prefix("package "))
            .map(str::trim)
    }
}
