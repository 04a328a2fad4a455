// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent registry endpoints.

use axum::extract::{Path, Query, State};
use harbor_core::{AgentState, Identity};
use harbor_engine::RegisterAgent;
use serde::Deserialize;

use super::error::{ok, ApiResult};
use super::extract::Body;
use super::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterBody {
    #[serde(rename = "type")]
    pub agent_type: String,
    pub purpose: Option<String>,
    pub identity: Option<Identity>,
    pub worktree_id: Option<String>,
}

/// `POST /agents/{id}`.
pub async fn register(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Body(body): Body<RegisterBody>,
) -> ApiResult {
    let result = state.kernel.register_agent(
        &id,
        &RegisterAgent {
            agent_type: body.agent_type,
            purpose: body.purpose,
            identity: body.identity,
            worktree_id: body.worktree_id,
        },
    )?;
    Ok(ok(serde_json::json!({
        "agent": result.agent,
        "salvage_hint": result.salvage_hint,
    })))
}

/// `PUT /agents/{id}/heartbeat`.
pub async fn heartbeat(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    state.kernel.heartbeat(&id)?;
    Ok(ok(serde_json::json!({})))
}

/// `DELETE /agents/{id}`.
pub async fn unregister(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    state.kernel.unregister_agent(&id)?;
    Ok(ok(serde_json::json!({})))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub project: Option<String>,
    pub state: Option<String>,
}

/// `GET /agents[?project=&state=]`.
pub async fn list(State(state): State<AppState>, Query(query): Query<ListQuery>) -> ApiResult {
    let state_filter = query.state.as_deref().map(AgentState::parse).transpose()?;
    let agents = state
        .kernel
        .agents(query.project.as_deref(), state_filter)?;
    Ok(ok(serde_json::json!({ "agents": agents })))
}

#[cfg(test)]
#[path = "agents_tests.rs"]
mod tests;
