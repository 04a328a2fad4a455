// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Leased mutual-exclusion locks.

use serde::{Deserialize, Serialize};

/// A named, leased lock row.
///
/// Owners are caller-supplied opaque identifiers (often a pid string); they
/// are never cross-checked against the agent registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockRecord {
    pub name: String,
    pub owner: String,
    pub acquired_at: i64,
    /// `None` means the lease never expires.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
}

impl LockRecord {
    /// True when the lease has lapsed.
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
