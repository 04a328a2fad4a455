// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Changelog entries with computed rollups.
//!
//! An entry recorded for `a:b:c` is visible to queries for `a:b` and `a`;
//! the rollup is evaluated at query time, never materialized.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::KernelError;
use crate::identity::Identity;

/// Category of a changelog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Feature,
    Fix,
    Refactor,
    Docs,
    Chore,
    Breaking,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Feature => "feature",
            ChangeType::Fix => "fix",
            ChangeType::Refactor => "refactor",
            ChangeType::Docs => "docs",
            ChangeType::Chore => "chore",
            ChangeType::Breaking => "breaking",
        }
    }

    pub fn parse(s: &str) -> Result<Self, KernelError> {
        match s {
            "feature" => Ok(ChangeType::Feature),
            "fix" => Ok(ChangeType::Fix),
            "refactor" => Ok(ChangeType::Refactor),
            "docs" => Ok(ChangeType::Docs),
            "chore" => Ok(ChangeType::Chore),
            "breaking" => Ok(ChangeType::Breaking),
            other => Err(KernelError::validation(format!(
                "unknown change type '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable changelog row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangelogEntry {
    pub id: i64,
    pub identity: Identity,
    pub change_type: ChangeType,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    pub created_at: i64,
}

impl ChangelogEntry {
    /// True when this entry should appear in a query for `query_identity`.
    ///
    /// Visibility follows ancestry: a query for `a` sees entries for `a`,
    /// `a:b`, and `a:b:c`.
    pub fn visible_to(&self, query_identity: &Identity) -> bool {
        query_identity.is_ancestor_of(&self.identity)
    }
}

#[cfg(test)]
#[path = "changelog_tests.rs"]
mod tests;
