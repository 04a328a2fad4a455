// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sessions, notes, and advisory file claims.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::KernelError;
use crate::identity::Identity;

/// Session lifecycle status. Terminal statuses never revert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Completed,
    Abandoned,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Completed => "completed",
            SessionStatus::Abandoned => "abandoned",
        }
    }

    pub fn parse(s: &str) -> Result<Self, KernelError> {
        match s {
            "active" => Ok(SessionStatus::Active),
            "completed" => Ok(SessionStatus::Completed),
            "abandoned" => Ok(SessionStatus::Abandoned),
            other => Err(KernelError::validation(format!(
                "unknown session status '{}'",
                other
            ))),
        }
    }

    /// Completed and abandoned sessions are read-only.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionStatus::Active)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mutable envelope grouping notes and file claims around a purpose.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    pub purpose: String,
    pub created_by: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub status: SessionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<Identity>,
}

/// An immutable timestamped entry within a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteRecord {
    pub id: i64,
    pub session_id: String,
    pub note_type: String,
    pub content: String,
    pub created_by: String,
    pub created_at: i64,
}

/// Advisory record that a session is working on a path.
///
/// Claims surface conflicts; they never block writers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileClaim {
    pub session_id: String,
    pub path: String,
    pub claimed_at: i64,
}

/// A conflict reported when claiming a path another active session holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimConflict {
    pub path: String,
    /// Session currently holding the claim.
    pub held_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub held_by_identity: Option<Identity>,
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
