// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent registry records and the derived liveness state.
//!
//! State is never stored: it is a pure function of `now - last_heartbeat`
//! against the configured thresholds, so reads and the reaper always agree.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::KernelError;
use crate::identity::Identity;

/// A registered agent row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRecord {
    pub id: String,
    pub agent_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    /// Identity prefix parsed at registration, when one was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worktree_id: Option<String>,
    pub registered_at: i64,
    pub last_heartbeat: i64,
}

impl AgentRecord {
    /// Derive the liveness state at `now`.
    pub fn state(&self, now: i64, thresholds: &StalenessThresholds) -> AgentState {
        let gap = now.saturating_sub(self.last_heartbeat);
        if gap >= thresholds.dead_after_ms {
            AgentState::Dead
        } else if gap >= thresholds.stale_after_ms {
            AgentState::Stale
        } else {
            AgentState::Active
        }
    }

    /// Split an identity into the stored prefix triple.
    pub fn identity_parts(identity: &Identity) -> (Option<String>, Option<String>, Option<String>) {
        (
            Some(identity.project().to_string()),
            identity.stack().map(String::from),
            identity.context().map(String::from),
        )
    }
}

/// Heartbeat-gap thresholds for staleness transitions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StalenessThresholds {
    pub stale_after_ms: i64,
    pub dead_after_ms: i64,
}

impl Default for StalenessThresholds {
    fn default() -> Self {
        Self {
            stale_after_ms: 10 * 60 * 1000,
            dead_after_ms: 20 * 60 * 1000,
        }
    }
}

/// Liveness state derived from the heartbeat gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentState {
    Active,
    Stale,
    Dead,
}

impl AgentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentState::Active => "active",
            AgentState::Stale => "stale",
            AgentState::Dead => "dead",
        }
    }

    /// Parse a state filter value from a query string.
    pub fn parse(s: &str) -> Result<Self, KernelError> {
        match s {
            "active" => Ok(AgentState::Active),
            "stale" => Ok(AgentState::Stale),
            "dead" => Ok(AgentState::Dead),
            other => Err(KernelError::validation(format!(
                "unknown agent state '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
