// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Salvage queue endpoints and the debug reaper trigger.

use axum::extract::{Query, State};
use harbor_core::{KernelError, SalvageState};
use serde::Deserialize;

use super::error::{ok, ApiResult};
use super::extract::Body;
use super::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub project: Option<String>,
    pub state: Option<String>,
}

/// `GET /salvage[?project=&state=]` — pending entries by default.
pub async fn list(State(state): State<AppState>, Query(query): Query<ListQuery>) -> ApiResult {
    let state_filter = match query.state.as_deref() {
        Some(s) => Some(SalvageState::parse(s)?),
        None => Some(SalvageState::Pending),
    };
    let entries = state
        .kernel
        .salvage_list(state_filter, query.project.as_deref())?;
    Ok(ok(serde_json::json!({ "entries": entries })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClaimBody {
    pub entry_id: i64,
    pub agent_id: Option<String>,
    /// "claim" (default), "done", "abandon", or "dismiss".
    pub action: Option<String>,
}

/// `POST /salvage` — claim an entry or advance its state.
pub async fn claim(State(state): State<AppState>, Body(body): Body<ClaimBody>) -> ApiResult {
    let entry = match body.action.as_deref().unwrap_or("claim") {
        "claim" => {
            let agent = body
                .agent_id
                .as_deref()
                .ok_or_else(|| KernelError::validation("agent_id is required to claim"))?;
            state.kernel.salvage_claim(body.entry_id, agent)?
        }
        "done" => state
            .kernel
            .salvage_transition(body.entry_id, SalvageState::Done, body.agent_id.as_deref())?,
        "abandon" => state.kernel.salvage_transition(
            body.entry_id,
            SalvageState::Abandoned,
            body.agent_id.as_deref(),
        )?,
        "dismiss" => state.kernel.salvage_transition(
            body.entry_id,
            SalvageState::Dismissed,
            body.agent_id.as_deref(),
        )?,
        other => {
            return Err(KernelError::validation(format!("unknown action '{}'", other)).into())
        }
    };
    Ok(ok(serde_json::json!({ "entry": entry })))
}

/// `POST /resurrection/reap` — force a sweep now (debug).
pub async fn reap(State(state): State<AppState>) -> ApiResult {
    let report = state.reaper.sweep();
    Ok(ok(serde_json::json!({ "report": report })))
}

#[cfg(test)]
#[path = "salvage_tests.rs"]
mod tests;
