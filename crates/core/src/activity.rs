// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Activity audit entries: one row per mutating kernel operation.

use serde::{Deserialize, Serialize};

/// A write-only audit row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: i64,
    /// Entity class: "service", "lock", "message", "agent", "session", ...
    pub entry_type: String,
    /// What happened: "claim", "release", "acquire", "publish", "error", ...
    pub action: String,
    /// The affected key (identity, lock name, channel, session id).
    pub target: String,
    /// Free-form JSON detail, when the operation has any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    pub created_at: i64,
}
