// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Changelog endpoints.

use axum::extract::{Query, State};
use harbor_core::{ChangeType, Identity, KernelError};
use harbor_engine::RecordChange;
use serde::Deserialize;

use super::error::{ok, ApiResult};
use super::extract::Body;
use super::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordBody {
    pub identity: Option<Identity>,
    #[serde(rename = "type")]
    pub change_type: Option<String>,
    pub summary: String,
    pub description: Option<String>,
    pub session_id: Option<String>,
    pub agent_id: Option<String>,
}

/// `POST /changelog`.
pub async fn record(State(state): State<AppState>, Body(body): Body<RecordBody>) -> ApiResult {
    let identity = body
        .identity
        .ok_or_else(|| KernelError::validation("identity is required"))?;
    let change_type = ChangeType::parse(
        body.change_type
            .as_deref()
            .ok_or_else(|| KernelError::validation("type is required"))?,
    )?;
    let id = state.kernel.record_change(&RecordChange {
        identity,
        change_type,
        summary: body.summary,
        description: body.description,
        session_id: body.session_id,
        agent_id: body.agent_id,
    })?;
    Ok(ok(serde_json::json!({ "id": id })))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub identity: Option<String>,
    #[serde(rename = "type")]
    pub change_type: Option<String>,
    pub limit: Option<u32>,
}

/// `GET /changelog[?identity=&type=&limit=]` — rollup included.
pub async fn list(State(state): State<AppState>, Query(query): Query<ListQuery>) -> ApiResult {
    let identity = query
        .identity
        .as_deref()
        .map(Identity::parse)
        .transpose()?;
    let change_type = query
        .change_type
        .as_deref()
        .map(ChangeType::parse)
        .transpose()?;
    let entries = state
        .kernel
        .changelog(identity.as_ref(), change_type, query.limit)?;
    Ok(ok(serde_json::json!({ "changelog": entries })))
}

#[cfg(test)]
#[path = "changelog_tests.rs"]
mod tests;
