// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Changelog recording and rollup queries.

use harbor_core::{ChangeType, ChangelogEntry, Clock, IdGen, Identity, KernelError};
use serde::Deserialize;

use crate::kernel::Kernel;

/// Payload for recording a changelog entry.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordChange {
    pub identity: Identity,
    pub change_type: ChangeType,
    pub summary: String,
    pub description: Option<String>,
    pub session_id: Option<String>,
    pub agent_id: Option<String>,
}

/// Default page size for changelog reads.
pub const DEFAULT_CHANGELOG_LIMIT: u32 = 100;

impl<C: Clock, I: IdGen> Kernel<C, I> {
    /// Record an immutable changelog entry; returns its id.
    pub fn record_change(&self, change: &RecordChange) -> Result<i64, KernelError> {
        if change.summary.is_empty() {
            return Err(KernelError::validation("summary must not be empty"));
        }
        let now = self.now();
        let id = self.store().append_changelog(
            &change.identity,
            change.change_type,
            &change.summary,
            change.description.as_deref(),
            change.session_id.as_deref(),
            change.agent_id.as_deref(),
            now,
        )?;
        self.record_activity(
            "changelog",
            "record",
            &change.identity.to_string(),
            Some(serde_json::json!({ "type": change.change_type.as_str() })),
            change.agent_id.as_deref(),
        );
        Ok(id)
    }

    /// Entries visible to `identity` (rollup includes descendants),
    /// newest-first; all entries when no identity is given.
    pub fn changelog(
        &self,
        identity: Option<&Identity>,
        change_type: Option<ChangeType>,
        limit: Option<u32>,
    ) -> Result<Vec<ChangelogEntry>, KernelError> {
        Ok(self.store().list_changelog(
            identity,
            change_type,
            limit.unwrap_or(DEFAULT_CHANGELOG_LIMIT),
        )?)
    }
}

#[cfg(test)]
#[path = "changelog_tests.rs"]
mod tests;
