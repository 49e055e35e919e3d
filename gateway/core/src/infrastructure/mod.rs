// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod catalog_loader;
pub mod repositories;
pub mod llm;
pub mod prompt_template_engine;

pub use catalog_loader::CatalogLoader;
pub use repositories::CatalogRepositories;
