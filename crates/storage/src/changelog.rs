// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Changelog accessors.
//!
//! The rollup is query-time: rows are indexed by project, fetched by the
//! query identity's project, then filtered by ancestry in Rust.

use harbor_core::{ChangeType, ChangelogEntry, Identity};
use rusqlite::{params, Row};

use crate::error::StorageError;
use crate::store::Store;

fn row_to_entry(row: &Row<'_>) -> Result<ChangelogEntry, rusqlite::Error> {
    let identity: String = row.get("identity")?;
    let change_type: String = row.get("change_type")?;
    let convert = |e: harbor_core::KernelError| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(std::io::Error::other(e.to_string())),
        )
    };
    Ok(ChangelogEntry {
        id: row.get("id")?,
        identity: Identity::parse(&identity).map_err(convert)?,
        change_type: ChangeType::parse(&change_type).map_err(convert)?,
        summary: row.get("summary")?,
        description: row.get("description")?,
        session_id: row.get("session_id")?,
        agent_id: row.get("agent_id")?,
        created_at: row.get("created_at")?,
    })
}

const SELECT: &str = "SELECT id, identity, change_type, summary, description, session_id, \
                      agent_id, created_at FROM changelog";

impl Store {
    /// Append an immutable changelog row; returns the id.
    pub fn append_changelog(
        &self,
        identity: &Identity,
        change_type: ChangeType,
        summary: &str,
        description: Option<&str>,
        session_id: Option<&str>,
        agent_id: Option<&str>,
        now: i64,
    ) -> Result<i64, StorageError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO changelog
                     (identity, project, change_type, summary, description,
                      session_id, agent_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    identity.to_string(),
                    identity.project(),
                    change_type.as_str(),
                    summary,
                    description,
                    session_id,
                    agent_id,
                    now,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Entries visible to `identity` (itself plus descendants), newest-first.
    /// With no identity, the newest entries across all projects.
    pub fn list_changelog(
        &self,
        identity: Option<&Identity>,
        change_type: Option<ChangeType>,
        limit: u32,
    ) -> Result<Vec<ChangelogEntry>, StorageError> {
        self.with_conn(|conn| {
            let rows = match identity {
                Some(id) => {
                    let mut stmt = conn.prepare(&format!(
                        "{SELECT} WHERE project = ?1 ORDER BY id DESC"
                    ))?;
                    let rows = stmt
                        .query_map([id.project()], row_to_entry)?
                        .collect::<Result<Vec<_>, _>>()?;
                    rows.into_iter()
                        .filter(|e| e.visible_to(id))
                        .collect::<Vec<_>>()
                }
                None => {
                    let mut stmt = conn.prepare(&format!("{SELECT} ORDER BY id DESC"))?;
                    let rows = stmt
                        .query_map([], row_to_entry)?
                        .collect::<Result<Vec<_>, _>>()?;
                    rows
                }
            };
            Ok(rows
                .into_iter()
                .filter(|e| change_type.is_none_or(|t| e.change_type == t))
                .take(limit as usize)
                .collect())
        })
    }
}

#[cfg(test)]
#[path = "changelog_tests.rs"]
mod tests;
