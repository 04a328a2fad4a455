// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent registry accessors.

use harbor_core::AgentRecord;
use rusqlite::{params, OptionalExtension, Row};

use crate::error::StorageError;
use crate::store::Store;

fn row_to_agent(row: &Row<'_>) -> Result<AgentRecord, rusqlite::Error> {
    Ok(AgentRecord {
        id: row.get("id")?,
        agent_type: row.get("agent_type")?,
        purpose: row.get("purpose")?,
        project: row.get("project")?,
        stack: row.get("stack")?,
        context: row.get("context")?,
        worktree_id: row.get("worktree_id")?,
        registered_at: row.get("registered_at")?,
        last_heartbeat: row.get("last_heartbeat")?,
    })
}

const SELECT: &str = "SELECT id, agent_type, purpose, project, stack, context, worktree_id, \
                      registered_at, last_heartbeat FROM agents";

impl Store {
    /// Upsert an agent: first call writes `registered_at`, every call
    /// refreshes the descriptive fields and the heartbeat.
    pub fn upsert_agent(&self, record: &AgentRecord) -> Result<(), StorageError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO agents
                     (id, agent_type, purpose, project, stack, context, worktree_id,
                      registered_at, last_heartbeat)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 ON CONFLICT(id) DO UPDATE SET
                     agent_type = excluded.agent_type,
                     purpose = excluded.purpose,
                     project = excluded.project,
                     stack = excluded.stack,
                     context = excluded.context,
                     worktree_id = excluded.worktree_id,
                     last_heartbeat = excluded.last_heartbeat",
                params![
                    record.id,
                    record.agent_type,
                    record.purpose,
                    record.project,
                    record.stack,
                    record.context,
                    record.worktree_id,
                    record.registered_at,
                    record.last_heartbeat,
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_agent(&self, id: &str) -> Result<Option<AgentRecord>, StorageError> {
        self.with_conn(|conn| {
            conn.query_row(&format!("{SELECT} WHERE id = ?1"), [id], row_to_agent)
                .optional()
                .map_err(Into::into)
        })
    }

    /// Refresh the heartbeat; returns false for an unknown id.
    pub fn touch_agent(&self, id: &str, now: i64) -> Result<bool, StorageError> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE agents SET last_heartbeat = ?2 WHERE id = ?1",
                params![id, now],
            )?;
            Ok(n > 0)
        })
    }

    /// Backdate or pin a heartbeat directly (reaper tests, debug tooling).
    pub fn set_agent_heartbeat(&self, id: &str, heartbeat: i64) -> Result<bool, StorageError> {
        self.touch_agent(id, heartbeat)
    }

    pub fn delete_agent(&self, id: &str) -> Result<bool, StorageError> {
        self.with_conn(|conn| {
            let n = conn.execute("DELETE FROM agents WHERE id = ?1", [id])?;
            Ok(n > 0)
        })
    }

    /// List agents, optionally restricted to a project prefix.
    pub fn list_agents(&self, project: Option<&str>) -> Result<Vec<AgentRecord>, StorageError> {
        self.with_conn(|conn| {
            let rows = match project {
                Some(p) => {
                    let mut stmt =
                        conn.prepare(&format!("{SELECT} WHERE project = ?1 ORDER BY id"))?;
                    let rows = stmt
                        .query_map([p], row_to_agent)?
                        .collect::<Result<Vec<_>, _>>()?;
                    rows
                }
                None => {
                    let mut stmt = conn.prepare(&format!("{SELECT} ORDER BY id"))?;
                    let rows = stmt
                        .query_map([], row_to_agent)?
                        .collect::<Result<Vec<_>, _>>()?;
                    rows
                }
            };
            Ok(rows)
        })
    }
}

#[cfg(test)]
#[path = "agents_tests.rs"]
mod tests;
