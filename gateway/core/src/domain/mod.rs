// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Layer
//!
//! Pure types and functions. Nothing in here performs I/O; provider and
//! repository contracts are declared here and implemented in
//! `crate::infrastructure`.

pub mod agent;
pub mod policy;
pub mod risk;
pub mod drift;
pub mod catalog;
pub mod advisory;
pub mod llm;
pub mod repository;
pub mod gateway_config;
