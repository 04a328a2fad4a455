// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Activity audit-log accessors.

use std::collections::BTreeMap;

use harbor_core::ActivityEntry;
use rusqlite::{params, Row};
use serde::Serialize;

use crate::error::StorageError;
use crate::store::Store;

fn row_to_entry(row: &Row<'_>) -> Result<ActivityEntry, rusqlite::Error> {
    let details: Option<String> = row.get("details")?;
    Ok(ActivityEntry {
        id: row.get("id")?,
        entry_type: row.get("entry_type")?,
        action: row.get("action")?,
        target: row.get("target")?,
        details: details.and_then(|d| serde_json::from_str(&d).ok()),
        agent_id: row.get("agent_id")?,
        created_at: row.get("created_at")?,
    })
}

/// Filters for activity reads.
#[derive(Debug, Clone, Default)]
pub struct ActivityQuery<'a> {
    pub entry_type: Option<&'a str>,
    pub agent_id: Option<&'a str>,
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub limit: u32,
    pub offset: u32,
}

/// Aggregate figures computed on demand.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityStats {
    pub total: i64,
    pub first_at: Option<i64>,
    pub last_at: Option<i64>,
    pub by_action: BTreeMap<String, i64>,
}

const SELECT: &str =
    "SELECT id, entry_type, action, target, details, agent_id, created_at FROM activity";

impl Store {
    /// Append one audit row; returns the id.
    pub fn append_activity(
        &self,
        entry_type: &str,
        action: &str,
        target: &str,
        details: Option<&serde_json::Value>,
        agent_id: Option<&str>,
        now: i64,
    ) -> Result<i64, StorageError> {
        let details_json = details.map(|d| d.to_string());
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO activity (entry_type, action, target, details, agent_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![entry_type, action, target, details_json, agent_id, now],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Read entries newest-first under the given filters.
    pub fn list_activity(&self, query: &ActivityQuery<'_>) -> Result<Vec<ActivityEntry>, StorageError> {
        self.with_conn(|conn| {
            let mut sql = format!("{SELECT} WHERE 1=1");
            let mut args: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
            if let Some(t) = query.entry_type {
                args.push(Box::new(t.to_string()));
                sql.push_str(&format!(" AND entry_type = ?{}", args.len()));
            }
            if let Some(a) = query.agent_id {
                args.push(Box::new(a.to_string()));
                sql.push_str(&format!(" AND agent_id = ?{}", args.len()));
            }
            if let Some(from) = query.from {
                args.push(Box::new(from));
                sql.push_str(&format!(" AND created_at >= ?{}", args.len()));
            }
            if let Some(to) = query.to {
                args.push(Box::new(to));
                sql.push_str(&format!(" AND created_at <= ?{}", args.len()));
            }
            args.push(Box::new(query.limit));
            sql.push_str(&format!(" ORDER BY id DESC LIMIT ?{}", args.len()));
            args.push(Box::new(query.offset));
            sql.push_str(&format!(" OFFSET ?{}", args.len()));

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params_from_iter(args.iter()), row_to_entry)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Entry counts by type since `from`.
    pub fn activity_summary(&self, from: i64) -> Result<BTreeMap<String, i64>, StorageError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT entry_type, COUNT(*) FROM activity
                 WHERE created_at >= ?1 GROUP BY entry_type",
            )?;
            let rows = stmt
                .query_map([from], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
                })?
                .collect::<Result<BTreeMap<_, _>, _>>()?;
            Ok(rows)
        })
    }

    pub fn activity_stats(&self) -> Result<ActivityStats, StorageError> {
        self.with_conn(|conn| {
            let (total, first_at, last_at) = conn.query_row(
                "SELECT COUNT(*), MIN(created_at), MAX(created_at) FROM activity",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )?;
            let mut stmt =
                conn.prepare("SELECT action, COUNT(*) FROM activity GROUP BY action")?;
            let by_action = stmt
                .query_map([], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
                })?
                .collect::<Result<BTreeMap<_, _>, _>>()?;
            Ok(ActivityStats {
                total,
                first_at,
                last_at,
                by_action,
            })
        })
    }

    /// Apply retention: drop rows older than `age_cutoff`, then trim to the
    /// newest `max_rows`. Returns rows reclaimed.
    pub fn prune_activity(&self, age_cutoff: i64, max_rows: u32) -> Result<u64, StorageError> {
        self.with_tx(|tx| {
            let mut reclaimed =
                tx.execute("DELETE FROM activity WHERE created_at < ?1", [age_cutoff])? as u64;
            reclaimed += tx.execute(
                "DELETE FROM activity WHERE id NOT IN (
                     SELECT id FROM activity ORDER BY id DESC LIMIT ?1
                 )",
                [max_rows],
            )? as u64;
            Ok(reclaimed)
        })
    }
}

#[cfg(test)]
#[path = "activity_tests.rs"]
mod tests;
