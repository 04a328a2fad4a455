// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session, note, and file-claim endpoints.

use axum::extract::{Path, Query, State};
use harbor_core::{Identity, KernelError, SessionStatus};
use harbor_engine::StartSession;
use serde::Deserialize;

use super::error::{ok, ApiResult};
use super::extract::Body;
use super::AppState;

/// Default page size for session and note listings.
const DEFAULT_LIST_LIMIT: u32 = 100;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StartBody {
    pub purpose: String,
    #[serde(default)]
    pub files: Vec<String>,
    pub identity: Option<Identity>,
    pub agent_id: Option<String>,
    #[serde(default)]
    pub force: bool,
}

/// `POST /sessions`.
pub async fn start(State(state): State<AppState>, Body(body): Body<StartBody>) -> ApiResult {
    let result = state.kernel.start_session(&StartSession {
        purpose: body.purpose,
        files: body.files,
        identity: body.identity,
        agent_id: body.agent_id,
        force: body.force,
    })?;

    let mut response = serde_json::json!({
        "session": result.session,
        "claimed": result.claimed,
        "conflicts": result.conflicts,
    });
    if !result.conflicts.is_empty() {
        response["warning"] = serde_json::json!(format!(
            "{} path(s) already claimed by another active session",
            result.conflicts.len()
        ));
    }
    Ok(ok(response))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub limit: Option<u32>,
}

/// `GET /sessions[?status=&limit=]`.
pub async fn list(State(state): State<AppState>, Query(query): Query<ListQuery>) -> ApiResult {
    let status = query
        .status
        .as_deref()
        .map(SessionStatus::parse)
        .transpose()?;
    let sessions = state
        .kernel
        .sessions(status, query.limit.unwrap_or(DEFAULT_LIST_LIMIT))?;
    Ok(ok(serde_json::json!({ "sessions": sessions })))
}

/// `GET /sessions/{id}` — detail including notes and files.
pub async fn detail(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let detail = state.kernel.session_detail(&id)?;
    Ok(ok(serde_json::json!({
        "session": detail.session,
        "notes": detail.notes,
        "files": detail.files,
    })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndBody {
    pub status: String,
    pub note: Option<String>,
}

/// `PUT /sessions/{id}` — end with a terminal status.
pub async fn end(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Body(body): Body<EndBody>,
) -> ApiResult {
    let status = SessionStatus::parse(&body.status)?;
    let session = state.kernel.end_session(&id, status, body.note.as_deref())?;
    Ok(ok(serde_json::json!({ "session": session })))
}

/// `DELETE /sessions/{id}` — cascade delete.
pub async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    state.kernel.delete_session(&id)?;
    Ok(ok(serde_json::json!({})))
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoteBody {
    pub content: String,
    #[serde(rename = "type")]
    pub note_type: Option<String>,
    pub created_by: Option<String>,
    /// Only meaningful on `POST /notes`.
    pub session_id: Option<String>,
}

/// `POST /sessions/{id}/notes`.
pub async fn add_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Body(body): Body<NoteBody>,
) -> ApiResult {
    if body.session_id.is_some() {
        return Err(KernelError::validation("session_id belongs in the path").into());
    }
    let note = state.kernel.add_note(
        Some(&id),
        &body.content,
        body.note_type.as_deref(),
        body.created_by.as_deref(),
    )?;
    Ok(ok(serde_json::json!({ "note": note })))
}

/// `POST /notes` — quick note; finds or creates the session.
pub async fn quick_note(State(state): State<AppState>, Body(body): Body<NoteBody>) -> ApiResult {
    let note = state.kernel.add_note(
        body.session_id.as_deref(),
        &body.content,
        body.note_type.as_deref(),
        body.created_by.as_deref(),
    )?;
    Ok(ok(serde_json::json!({ "note": note })))
}

#[derive(Debug, Default, Deserialize)]
pub struct NotesQuery {
    pub session_id: Option<String>,
    #[serde(rename = "type")]
    pub note_type: Option<String>,
    pub limit: Option<u32>,
}

/// `GET /notes` — recent notes across sessions.
pub async fn recent_notes(
    State(state): State<AppState>,
    Query(query): Query<NotesQuery>,
) -> ApiResult {
    let notes = state.kernel.notes(
        query.session_id.as_deref(),
        query.note_type.as_deref(),
        query.limit.unwrap_or(DEFAULT_LIST_LIMIT),
    )?;
    Ok(ok(serde_json::json!({ "notes": notes })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilesBody {
    pub paths: Vec<String>,
    #[serde(default)]
    pub force: bool,
}

/// `POST /sessions/{id}/files`.
pub async fn add_files(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Body(body): Body<FilesBody>,
) -> ApiResult {
    if body.paths.is_empty() {
        return Err(KernelError::validation("paths must not be empty").into());
    }
    let (claimed, conflicts) = state.kernel.add_files(&id, &body.paths, body.force)?;
    Ok(ok(serde_json::json!({
        "claimed": claimed,
        "conflicts": conflicts,
    })))
}

/// `DELETE /sessions/{id}/files`.
pub async fn remove_files(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Body(body): Body<FilesBody>,
) -> ApiResult {
    if body.paths.is_empty() {
        return Err(KernelError::validation("paths must not be empty").into());
    }
    let removed = state.kernel.remove_files(&id, &body.paths)?;
    Ok(ok(serde_json::json!({ "removed": removed })))
}

#[cfg(test)]
#[path = "sessions_tests.rs"]
mod tests;
