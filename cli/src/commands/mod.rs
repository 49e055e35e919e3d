// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for AAGATE CLI

pub mod advise;
pub mod agents;
pub mod config;
pub mod drift;
pub mod policies;
pub mod risk;
pub mod serve;

pub use self::advise::AdviseCommand;
pub use self::agents::AgentsCommand;
pub use self::config::ConfigCommand;
pub use self::policies::PoliciesCommand;
pub use self::risk::RiskCommand;

use colored::{ColoredString, Colorize};

use aagate_core::domain::risk::{RiskTier, StatusSeverity};

/// Padded to the width of the longest label so tables stay aligned.
pub(crate) fn format_severity(severity: StatusSeverity) -> ColoredString {
    let label = format!("{:<8}", severity.to_string());
    match severity {
        StatusSeverity::Nominal => label.green(),
        StatusSeverity::Caution => label.yellow(),
        StatusSeverity::Inactive => label.dimmed(),
    }
}

pub(crate) fn format_risk(score: u8, tier: RiskTier) -> ColoredString {
    let label = format!("{:>3} {:<6}", score, tier.to_string());
    match tier {
        RiskTier::Low => label.green(),
        RiskTier::Medium => label.yellow(),
        RiskTier::High => label.red(),
    }
}
