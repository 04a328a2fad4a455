// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resurrection queue accessors.
//!
//! Session snapshots are stored as one JSON column: the queue is read as a
//! unit and entries are immutable apart from their state machine, so there
//! is nothing to join against.

use harbor_core::{Identity, ResurrectionEntry, SalvageState, SessionSnapshot};
use rusqlite::{params, OptionalExtension, Row};

use crate::error::StorageError;
use crate::store::Store;

fn row_to_entry(row: &Row<'_>) -> Result<ResurrectionEntry, rusqlite::Error> {
    let identity: Option<String> = row.get("identity")?;
    let sessions_json: String = row.get("sessions")?;
    let state: String = row.get("state")?;
    Ok(ResurrectionEntry {
        id: row.get("id")?,
        dead_agent_id: row.get("dead_agent_id")?,
        identity: identity.and_then(|s| Identity::parse(&s).ok()),
        sessions: serde_json::from_str(&sessions_json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })?,
        created_at: row.get("created_at")?,
        state: SalvageState::parse(&state).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(std::io::Error::other(e.to_string())),
            )
        })?,
        claimed_by: row.get("claimed_by")?,
        claimed_at: row.get("claimed_at")?,
    })
}

const SELECT: &str = "SELECT id, dead_agent_id, identity, project, sessions, created_at, \
                      state, claimed_by, claimed_at FROM resurrection_entries";

impl Store {
    /// Insert a pending entry for a dead agent; returns the id.
    pub fn insert_resurrection(
        &self,
        dead_agent_id: &str,
        identity: Option<&Identity>,
        sessions: &[SessionSnapshot],
        now: i64,
    ) -> Result<i64, StorageError> {
        let json =
            serde_json::to_string(sessions).map_err(|e| StorageError::Corrupt(e.to_string()))?;
        let project = identity.map(|i| i.project().to_string());
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO resurrection_entries
                     (dead_agent_id, identity, project, sessions, created_at, state)
                 VALUES (?1, ?2, ?3, ?4, ?5, 'pending')",
                params![
                    dead_agent_id,
                    identity.map(|i| i.to_string()),
                    project,
                    json,
                    now,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_resurrection(&self, id: i64) -> Result<Option<ResurrectionEntry>, StorageError> {
        self.with_conn(|conn| {
            conn.query_row(&format!("{SELECT} WHERE id = ?1"), [id], row_to_entry)
                .optional()
                .map_err(Into::into)
        })
    }

    /// Entries filtered by state and/or project, oldest-first.
    pub fn list_resurrections(
        &self,
        state: Option<SalvageState>,
        project: Option<&str>,
    ) -> Result<Vec<ResurrectionEntry>, StorageError> {
        self.with_conn(|conn| {
            let mut sql = format!("{SELECT} WHERE 1=1");
            let mut args: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
            if let Some(s) = state {
                args.push(Box::new(s.as_str().to_string()));
                sql.push_str(&format!(" AND state = ?{}", args.len()));
            }
            if let Some(p) = project {
                args.push(Box::new(p.to_string()));
                sql.push_str(&format!(" AND project = ?{}", args.len()));
            }
            sql.push_str(" ORDER BY id");

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params_from_iter(args.iter()), row_to_entry)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Apply a state transition; returns false when the entry is unknown.
    pub fn update_resurrection_state(
        &self,
        id: i64,
        state: SalvageState,
        claimed_by: Option<&str>,
        now: i64,
    ) -> Result<bool, StorageError> {
        self.with_conn(|conn| {
            let n = match claimed_by {
                Some(by) => conn.execute(
                    "UPDATE resurrection_entries
                     SET state = ?2, claimed_by = ?3, claimed_at = ?4 WHERE id = ?1",
                    params![id, state.as_str(), by, now],
                )?,
                None => conn.execute(
                    "UPDATE resurrection_entries SET state = ?2 WHERE id = ?1",
                    params![id, state.as_str()],
                )?,
            };
            Ok(n > 0)
        })
    }

    /// Pending-entry counts keyed by project (for `salvage_hint`).
    pub fn count_pending_by_project(&self) -> Result<Vec<(String, i64)>, StorageError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT project, COUNT(*) FROM resurrection_entries
                 WHERE state = 'pending' AND project IS NOT NULL
                 GROUP BY project",
            )?;
            let rows = stmt
                .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// True when this death already produced an entry: one created at or
    /// after the agent's final heartbeat.
    pub fn resurrection_exists_since(
        &self,
        dead_agent_id: &str,
        since: i64,
    ) -> Result<bool, StorageError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT EXISTS(
                     SELECT 1 FROM resurrection_entries
                     WHERE dead_agent_id = ?1 AND created_at >= ?2
                 )",
                params![dead_agent_id, since],
                |row| row.get(0),
            )
            .map_err(Into::into)
        })
    }
}

#[cfg(test)]
#[path = "salvage_tests.rs"]
mod tests;
