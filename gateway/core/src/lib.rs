// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # AAGATE Core (`aagate-core`)
//!
//! Governance model and advisory gateway behind the AAGATE dashboard.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Agent/policy catalog, platform risk aggregation, status and
//!   risk classification, and the typed anomaly/violation advisory gateway.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`domain`] | Entities, invariants, classifiers and provider interfaces |
//! | [`application`] | Catalog queries and the advisory gateway |
//! | [`infrastructure`] | Catalog loading, in-memory repositories, LLM adapters, prompt templates |
//! | [`presentation`] | HTTP surface (Axum) |

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
