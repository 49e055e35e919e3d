// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod advisory;
pub mod catalog;

// Re-export use cases for convenience
pub use advisory::{AdvisoryGateway, AdvisorySchema};
pub use catalog::{AgentDetail, AgentSummary, CatalogService, PlatformOverview};
