// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session, note, and file-claim accessors.
//!
//! Notes are insert-only at the SQL level as well: no UPDATE statement for
//! the notes table exists anywhere in this crate. Deleting a session
//! cascades to its notes and claims via foreign keys.

use harbor_core::{FileClaim, Identity, NoteRecord, SessionRecord, SessionStatus};
use rusqlite::{params, OptionalExtension, Row};

use crate::error::StorageError;
use crate::store::Store;

fn row_to_session(row: &Row<'_>) -> Result<SessionRecord, rusqlite::Error> {
    let status: String = row.get("status")?;
    let identity: Option<String> = row.get("identity")?;
    Ok(SessionRecord {
        id: row.get("id")?,
        purpose: row.get("purpose")?,
        created_by: row.get("created_by")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        status: SessionStatus::parse(&status).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(std::io::Error::other(e.to_string())),
            )
        })?,
        identity: identity.and_then(|s| Identity::parse(&s).ok()),
    })
}

fn row_to_note(row: &Row<'_>) -> Result<NoteRecord, rusqlite::Error> {
    Ok(NoteRecord {
        id: row.get("id")?,
        session_id: row.get("session_id")?,
        note_type: row.get("note_type")?,
        content: row.get("content")?,
        created_by: row.get("created_by")?,
        created_at: row.get("created_at")?,
    })
}

fn row_to_claim(row: &Row<'_>) -> Result<FileClaim, rusqlite::Error> {
    Ok(FileClaim {
        session_id: row.get("session_id")?,
        path: row.get("path")?,
        claimed_at: row.get("claimed_at")?,
    })
}

const SELECT_SESSION: &str =
    "SELECT id, purpose, created_by, created_at, updated_at, status, identity FROM sessions";
const SELECT_NOTE: &str =
    "SELECT id, session_id, note_type, content, created_by, created_at FROM notes";

impl Store {
    pub fn insert_session(&self, record: &SessionRecord) -> Result<(), StorageError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO sessions
                     (id, purpose, created_by, created_at, updated_at, status, identity)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    record.id,
                    record.purpose,
                    record.created_by,
                    record.created_at,
                    record.updated_at,
                    record.status.as_str(),
                    record.identity.as_ref().map(|i| i.to_string()),
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_session(&self, id: &str) -> Result<Option<SessionRecord>, StorageError> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("{SELECT_SESSION} WHERE id = ?1"),
                [id],
                row_to_session,
            )
            .optional()
            .map_err(Into::into)
        })
    }

    pub fn list_sessions(
        &self,
        status: Option<SessionStatus>,
        limit: u32,
    ) -> Result<Vec<SessionRecord>, StorageError> {
        self.with_conn(|conn| {
            let rows = match status {
                Some(s) => {
                    let mut stmt = conn.prepare(&format!(
                        "{SELECT_SESSION} WHERE status = ?1 ORDER BY created_at DESC LIMIT ?2"
                    ))?;
                    let rows = stmt
                        .query_map(params![s.as_str(), limit], row_to_session)?
                        .collect::<Result<Vec<_>, _>>()?;
                    rows
                }
                None => {
                    let mut stmt = conn.prepare(&format!(
                        "{SELECT_SESSION} ORDER BY created_at DESC LIMIT ?1"
                    ))?;
                    let rows = stmt
                        .query_map([limit], row_to_session)?
                        .collect::<Result<Vec<_>, _>>()?;
                    rows
                }
            };
            Ok(rows)
        })
    }

    /// Set a session's status; returns false when the session is unknown.
    pub fn update_session_status(
        &self,
        id: &str,
        status: SessionStatus,
        now: i64,
    ) -> Result<bool, StorageError> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE sessions SET status = ?2, updated_at = ?3 WHERE id = ?1",
                params![id, status.as_str(), now],
            )?;
            Ok(n > 0)
        })
    }

    /// Delete a session; notes and claims cascade. Returns false if unknown.
    pub fn delete_session(&self, id: &str) -> Result<bool, StorageError> {
        self.with_conn(|conn| {
            let n = conn.execute("DELETE FROM sessions WHERE id = ?1", [id])?;
            Ok(n > 0)
        })
    }

    /// The most recent active session created by `created_by`.
    pub fn latest_active_session_for(
        &self,
        created_by: &str,
    ) -> Result<Option<SessionRecord>, StorageError> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!(
                    "{SELECT_SESSION} WHERE created_by = ?1 AND status = 'active'
                     ORDER BY created_at DESC LIMIT 1"
                ),
                [created_by],
                row_to_session,
            )
            .optional()
            .map_err(Into::into)
        })
    }

    /// All active sessions created by an agent (salvage snapshot input).
    pub fn active_sessions_created_by(
        &self,
        created_by: &str,
    ) -> Result<Vec<SessionRecord>, StorageError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_SESSION} WHERE created_by = ?1 AND status = 'active'
                 ORDER BY created_at"
            ))?;
            let rows = stmt
                .query_map([created_by], row_to_session)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // --- notes ---

    /// Append a note; returns the assigned id. Notes never change after this.
    pub fn insert_note(
        &self,
        session_id: &str,
        note_type: &str,
        content: &str,
        created_by: &str,
        now: i64,
    ) -> Result<i64, StorageError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO notes (session_id, note_type, content, created_by, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![session_id, note_type, content, created_by, now],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Notes, newest-first, optionally scoped to a session and/or type.
    pub fn list_notes(
        &self,
        session_id: Option<&str>,
        note_type: Option<&str>,
        limit: u32,
    ) -> Result<Vec<NoteRecord>, StorageError> {
        self.with_conn(|conn| {
            let mut sql = format!("{SELECT_NOTE} WHERE 1=1");
            let mut args: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
            if let Some(sid) = session_id {
                args.push(Box::new(sid.to_string()));
                sql.push_str(&format!(" AND session_id = ?{}", args.len()));
            }
            if let Some(t) = note_type {
                args.push(Box::new(t.to_string()));
                sql.push_str(&format!(" AND note_type = ?{}", args.len()));
            }
            args.push(Box::new(limit));
            sql.push_str(&format!(" ORDER BY id DESC LIMIT ?{}", args.len()));

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params_from_iter(args.iter()), row_to_note)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// The last `limit` notes of a session, oldest-first (salvage snapshot).
    pub fn recent_notes_for_session(
        &self,
        session_id: &str,
        limit: u32,
    ) -> Result<Vec<NoteRecord>, StorageError> {
        let mut notes = self.list_notes(Some(session_id), None, limit)?;
        notes.reverse();
        Ok(notes)
    }

    // --- file claims ---

    /// Record a claim; idempotent per (session, path).
    pub fn insert_file_claim(
        &self,
        session_id: &str,
        path: &str,
        now: i64,
    ) -> Result<(), StorageError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO file_claims (session_id, path, claimed_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(session_id, path) DO NOTHING",
                params![session_id, path, now],
            )?;
            Ok(())
        })
    }

    pub fn delete_file_claim(&self, session_id: &str, path: &str) -> Result<bool, StorageError> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "DELETE FROM file_claims WHERE session_id = ?1 AND path = ?2",
                params![session_id, path],
            )?;
            Ok(n > 0)
        })
    }

    pub fn list_file_claims(&self, session_id: &str) -> Result<Vec<FileClaim>, StorageError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT session_id, path, claimed_at FROM file_claims
                 WHERE session_id = ?1 ORDER BY path",
            )?;
            let rows = stmt
                .query_map([session_id], row_to_claim)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Claims on `path` held by *active* sessions other than `excluding`.
    pub fn active_claims_on_path(
        &self,
        path: &str,
        excluding_session: &str,
    ) -> Result<Vec<(FileClaim, SessionRecord)>, StorageError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT c.session_id, c.path, c.claimed_at,
                        s.id, s.purpose, s.created_by, s.created_at, s.updated_at,
                        s.status, s.identity
                 FROM file_claims c JOIN sessions s ON s.id = c.session_id
                 WHERE c.path = ?1 AND s.status = 'active' AND s.id != ?2",
            )?;
            let rows = stmt
                .query_map(params![path, excluding_session], |row| {
                    let claim = FileClaim {
                        session_id: row.get(0)?,
                        path: row.get(1)?,
                        claimed_at: row.get(2)?,
                    };
                    let status: String = row.get(8)?;
                    let identity: Option<String> = row.get(9)?;
                    let session = SessionRecord {
                        id: row.get(3)?,
                        purpose: row.get(4)?,
                        created_by: row.get(5)?,
                        created_at: row.get(6)?,
                        updated_at: row.get(7)?,
                        status: SessionStatus::parse(&status).map_err(|e| {
                            rusqlite::Error::FromSqlConversionFailure(
                                0,
                                rusqlite::types::Type::Text,
                                Box::new(std::io::Error::other(e.to_string())),
                            )
                        })?,
                        identity: identity.and_then(|s| Identity::parse(&s).ok()),
                    };
                    Ok((claim, session))
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn count_notes(&self, session_id: &str) -> Result<i64, StorageError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM notes WHERE session_id = ?1",
                [session_id],
                |row| row.get(0),
            )
            .map_err(Into::into)
        })
    }
}

#[cfg(test)]
#[path = "sessions_tests.rs"]
mod tests;
