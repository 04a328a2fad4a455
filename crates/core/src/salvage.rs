// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resurrection entries: the salvage handoff for dead agents' sessions.
//!
//! Entries snapshot the dead agent's in-progress work so a successor can
//! pick it up even after the original rows change. Snapshots embed session
//! ids rather than live foreign keys, keeping lifecycle rules linear.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::KernelError;
use crate::identity::Identity;
use crate::session::{NoteRecord, SessionRecord};

/// State machine for a resurrection entry. All transitions are one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SalvageState {
    Pending,
    Claimed,
    Done,
    Abandoned,
    Dismissed,
}

impl SalvageState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SalvageState::Pending => "pending",
            SalvageState::Claimed => "claimed",
            SalvageState::Done => "done",
            SalvageState::Abandoned => "abandoned",
            SalvageState::Dismissed => "dismissed",
        }
    }

    pub fn parse(s: &str) -> Result<Self, KernelError> {
        match s {
            "pending" => Ok(SalvageState::Pending),
            "claimed" => Ok(SalvageState::Claimed),
            "done" => Ok(SalvageState::Done),
            "abandoned" => Ok(SalvageState::Abandoned),
            "dismissed" => Ok(SalvageState::Dismissed),
            other => Err(KernelError::validation(format!(
                "unknown salvage state '{}'",
                other
            ))),
        }
    }

    /// Legal transitions: pending → claimed | dismissed,
    /// claimed → done | abandoned.
    pub fn can_transition_to(&self, next: SalvageState) -> bool {
        matches!(
            (self, next),
            (SalvageState::Pending, SalvageState::Claimed)
                | (SalvageState::Pending, SalvageState::Dismissed)
                | (SalvageState::Claimed, SalvageState::Done)
                | (SalvageState::Claimed, SalvageState::Abandoned)
        )
    }
}

impl fmt::Display for SalvageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of one session captured at the agent's death.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session: SessionRecord,
    /// Most recent notes, newest last, bounded by config.
    pub notes: Vec<NoteRecord>,
}

/// One entry in the resurrection queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResurrectionEntry {
    pub id: i64,
    pub dead_agent_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<Identity>,
    pub sessions: Vec<SessionSnapshot>,
    pub created_at: i64,
    pub state: SalvageState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claimed_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claimed_at: Option<i64>,
}

#[cfg(test)]
#[path = "salvage_tests.rs"]
mod tests;
