// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sessions, notes, and advisory file claims.
//!
//! File claims are a communication layer, not a mutex: conflicting paths
//! are reported back with the holding session, and `force` records the
//! claim anyway. Notes only ever append; terminal sessions refuse writes.

use harbor_core::{
    ClaimConflict, Clock, IdGen, Identity, KernelError, NoteRecord, SessionRecord, SessionStatus,
};
use harbor_core::FileClaim;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::kernel::Kernel;

/// Purpose recorded on sessions created implicitly by a bare note.
pub const IMPLICIT_SESSION_PURPOSE: &str = "quick note";

/// Default note type when the caller supplies none.
pub const DEFAULT_NOTE_TYPE: &str = "note";

/// Payload for starting a session.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StartSession {
    pub purpose: String,
    /// Paths to claim alongside the session.
    #[serde(default)]
    pub files: Vec<String>,
    pub identity: Option<Identity>,
    /// Creator; defaults to the configured agent id.
    pub agent_id: Option<String>,
    /// Claim conflicting paths anyway.
    #[serde(default)]
    pub force: bool,
}

/// Result of starting a session.
#[derive(Debug, Clone, Serialize)]
pub struct StartSessionResult {
    pub session: SessionRecord,
    /// Paths actually claimed.
    pub claimed: Vec<String>,
    /// Paths other active sessions already hold (not claimed unless forced).
    pub conflicts: Vec<ClaimConflict>,
}

/// A session with its notes and claims.
#[derive(Debug, Clone, Serialize)]
pub struct SessionDetail {
    pub session: SessionRecord,
    pub notes: Vec<NoteRecord>,
    pub files: Vec<FileClaim>,
}

impl<C: Clock, I: IdGen> Kernel<C, I> {
    /// Create a session, claiming any supplied paths.
    ///
    /// The session is created even when every path conflicts; the caller
    /// decides what to do with the warning.
    pub fn start_session(
        &self,
        start: &StartSession,
    ) -> Result<StartSessionResult, KernelError> {
        if start.purpose.is_empty() {
            return Err(KernelError::validation("session purpose must not be empty"));
        }
        for path in &start.files {
            validate_path(path)?;
        }

        let now = self.now();
        let created_by = start
            .agent_id
            .clone()
            .unwrap_or_else(|| self.config().default_agent_id.clone());

        let session = SessionRecord {
            id: self.next_id(),
            purpose: start.purpose.clone(),
            created_by: created_by.clone(),
            created_at: now,
            updated_at: now,
            status: SessionStatus::Active,
            identity: start.identity.clone(),
        };
        self.store().insert_session(&session)?;

        let (claimed, conflicts) = self.claim_paths(&session.id, &start.files, start.force)?;

        info!(
            id = %session.id,
            purpose = %session.purpose,
            claimed = claimed.len(),
            conflicts = conflicts.len(),
            "session started"
        );
        self.record_activity(
            "session",
            "start",
            &session.id,
            Some(serde_json::json!({
                "purpose": session.purpose,
                "conflicts": conflicts.len(),
            })),
            Some(&created_by),
        );

        Ok(StartSessionResult {
            session,
            claimed,
            conflicts,
        })
    }

    /// Move a session to a terminal status, optionally appending a final
    /// note first. Idempotent when the session already has that status.
    pub fn end_session(
        &self,
        id: &str,
        status: SessionStatus,
        note: Option<&str>,
    ) -> Result<SessionRecord, KernelError> {
        if !status.is_terminal() {
            return Err(KernelError::validation(
                "end status must be completed or abandoned",
            ));
        }

        let session = self.require_session(id)?;
        if session.status == status {
            return Ok(session);
        }
        if session.status.is_terminal() {
            return Err(KernelError::conflict(format!(
                "session '{}' is already {}",
                id, session.status
            )));
        }

        let now = self.now();
        if let Some(content) = note {
            self.store()
                .insert_note(id, DEFAULT_NOTE_TYPE, content, &session.created_by, now)?;
        }
        self.store().update_session_status(id, status, now)?;

        info!(id, status = %status, "session ended");
        self.record_activity(
            "session",
            "end",
            id,
            Some(serde_json::json!({ "status": status.as_str() })),
            Some(&session.created_by),
        );

        Ok(SessionRecord {
            status,
            updated_at: now,
            ..session
        })
    }

    /// Delete a session; its notes and claims cascade away.
    pub fn delete_session(&self, id: &str) -> Result<(), KernelError> {
        if !self.store().delete_session(id)? {
            return Err(KernelError::not_found("session", id));
        }
        info!(id, "session deleted");
        self.record_activity("session", "delete", id, None, None);
        Ok(())
    }

    /// One session with notes (oldest-first) and file claims.
    pub fn session_detail(&self, id: &str) -> Result<SessionDetail, KernelError> {
        let session = self.require_session(id)?;
        let notes = self.store().recent_notes_for_session(id, u32::MAX)?;
        let files = self.store().list_file_claims(id)?;
        Ok(SessionDetail {
            session,
            notes,
            files,
        })
    }

    pub fn sessions(
        &self,
        status: Option<SessionStatus>,
        limit: u32,
    ) -> Result<Vec<SessionRecord>, KernelError> {
        Ok(self.store().list_sessions(status, limit)?)
    }

    /// Append a note.
    ///
    /// Without a session id, the caller's most recent active session is
    /// used; with no such session, an implicit one is created.
    pub fn add_note(
        &self,
        session_id: Option<&str>,
        content: &str,
        note_type: Option<&str>,
        created_by: Option<&str>,
    ) -> Result<NoteRecord, KernelError> {
        if content.is_empty() {
            return Err(KernelError::validation("note content must not be empty"));
        }
        let note_type = note_type.unwrap_or(DEFAULT_NOTE_TYPE);
        let author = created_by
            .map(String::from)
            .unwrap_or_else(|| self.config().default_agent_id.clone());

        let session = match session_id {
            Some(id) => {
                let session = self.require_session(id)?;
                if session.status.is_terminal() {
                    return Err(KernelError::conflict(format!(
                        "session '{}' is {} and read-only",
                        id, session.status
                    )));
                }
                session
            }
            None => match self.store().latest_active_session_for(&author)? {
                Some(session) => session,
                None => {
                    self.start_session(&StartSession {
                        purpose: IMPLICIT_SESSION_PURPOSE.to_string(),
                        agent_id: Some(author.clone()),
                        ..Default::default()
                    })?
                    .session
                }
            },
        };

        let now = self.now();
        let id = self
            .store()
            .insert_note(&session.id, note_type, content, &author, now)?;
        self.record_activity("note", "add", &session.id, None, Some(&author));

        Ok(NoteRecord {
            id,
            session_id: session.id,
            note_type: note_type.to_string(),
            content: content.to_string(),
            created_by: author,
            created_at: now,
        })
    }

    /// Notes across sessions, newest-first.
    pub fn notes(
        &self,
        session_id: Option<&str>,
        note_type: Option<&str>,
        limit: u32,
    ) -> Result<Vec<NoteRecord>, KernelError> {
        Ok(self.store().list_notes(session_id, note_type, limit)?)
    }

    /// Claim more paths for an active session; advisory, like start.
    pub fn add_files(
        &self,
        session_id: &str,
        paths: &[String],
        force: bool,
    ) -> Result<(Vec<String>, Vec<ClaimConflict>), KernelError> {
        for path in paths {
            validate_path(path)?;
        }
        let session = self.require_session(session_id)?;
        if session.status.is_terminal() {
            return Err(KernelError::conflict(format!(
                "session '{}' is {} and read-only",
                session_id, session.status
            )));
        }
        let result = self.claim_paths(session_id, paths, force)?;
        self.record_activity(
            "session",
            "add_files",
            session_id,
            Some(serde_json::json!({ "claimed": result.0.len() })),
            Some(&session.created_by),
        );
        Ok(result)
    }

    /// Drop claims from a session; returns how many were removed.
    pub fn remove_files(&self, session_id: &str, paths: &[String]) -> Result<u64, KernelError> {
        self.require_session(session_id)?;
        let mut removed = 0;
        for path in paths {
            removed += u64::from(self.store().delete_file_claim(session_id, path)?);
        }
        if removed > 0 {
            self.record_activity(
                "session",
                "remove_files",
                session_id,
                Some(serde_json::json!({ "removed": removed })),
                None,
            );
        }
        Ok(removed)
    }

    fn require_session(&self, id: &str) -> Result<SessionRecord, KernelError> {
        self.store()
            .get_session(id)?
            .ok_or_else(|| KernelError::not_found("session", id))
    }

    fn claim_paths(
        &self,
        session_id: &str,
        paths: &[String],
        force: bool,
    ) -> Result<(Vec<String>, Vec<ClaimConflict>), KernelError> {
        let now = self.now();
        let mut claimed = Vec::new();
        let mut conflicts = Vec::new();

        for path in paths {
            let holders = self.store().active_claims_on_path(path, session_id)?;
            if let Some((_, holder)) = holders.first() {
                conflicts.push(ClaimConflict {
                    path: path.clone(),
                    held_by: holder.id.clone(),
                    held_by_identity: holder.identity.clone(),
                });
                if !force {
                    continue;
                }
            }
            self.store().insert_file_claim(session_id, path, now)?;
            claimed.push(path.clone());
        }

        Ok((claimed, conflicts))
    }
}

fn validate_path(path: &str) -> Result<(), KernelError> {
    if path.is_empty() || path.len() > 512 {
        return Err(KernelError::validation("path must be 1-512 characters"));
    }
    if path.contains('\0') || path.contains('\n') {
        return Err(KernelError::validation("path contains control characters"));
    }
    Ok(())
}

#[cfg(test)]
#[path = "sessions_tests.rs"]
mod tests;
