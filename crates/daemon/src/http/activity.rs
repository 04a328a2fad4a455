// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Audit-log endpoints.

use axum::extract::{Query, State};
use harbor_storage::ActivityQuery;
use serde::Deserialize;

use super::error::{ok, ApiResult};
use super::AppState;

const DEFAULT_LIMIT: u32 = 100;
const DEFAULT_SUMMARY_WINDOW_MS: i64 = 60 * 60 * 1000;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "type")]
    pub entry_type: Option<String>,
    pub agent: Option<String>,
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// `GET /activity[?type=&agent=&from=&to=&limit=&offset=]`.
pub async fn list(State(state): State<AppState>, Query(query): Query<ListQuery>) -> ApiResult {
    let entries = state.kernel.activity(&ActivityQuery {
        entry_type: query.entry_type.as_deref(),
        agent_id: query.agent.as_deref(),
        from: query.from,
        to: query.to,
        limit: query.limit.unwrap_or(DEFAULT_LIMIT),
        offset: query.offset.unwrap_or(0),
    })?;
    Ok(ok(serde_json::json!({ "activity": entries })))
}

#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    pub window_ms: Option<i64>,
}

/// `GET /activity/summary[?window_ms=]` — counts by type.
pub async fn summary(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> ApiResult {
    let window = query.window_ms.unwrap_or(DEFAULT_SUMMARY_WINDOW_MS);
    let summary = state.kernel.activity_summary(window)?;
    Ok(ok(serde_json::json!({ "summary": summary, "window_ms": window })))
}

/// `GET /activity/stats` — whole-log aggregates.
pub async fn stats(State(state): State<AppState>) -> ApiResult {
    let stats = state.kernel.activity_stats()?;
    Ok(ok(serde_json::json!({ "stats": stats })))
}

#[cfg(test)]
#[path = "activity_tests.rs"]
mod tests;
