// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock endpoints.

use axum::extract::{Path, Query, State};
use harbor_engine::LockOptions;
use serde::Deserialize;

use super::error::{ok, ApiResult};
use super::extract::Body;
use super::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LockBody {
    pub owner: Option<String>,
    pub ttl_ms: Option<i64>,
    pub pid: Option<u32>,
    #[serde(default)]
    pub force: bool,
}

impl LockBody {
    fn options(&self) -> LockOptions {
        LockOptions {
            owner: self.owner.clone(),
            ttl_ms: self.ttl_ms,
            pid: self.pid,
        }
    }
}

/// `POST /locks/{name}`.
pub async fn acquire(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Body(body): Body<LockBody>,
) -> ApiResult {
    let lock = state.kernel.acquire_lock(&name, &body.options())?;
    Ok(ok(serde_json::json!({ "lock": lock })))
}

/// `PUT /locks/{name}`.
pub async fn extend(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Body(body): Body<LockBody>,
) -> ApiResult {
    let lock = state.kernel.extend_lock(&name, &body.options(), body.force)?;
    Ok(ok(serde_json::json!({ "lock": lock })))
}

#[derive(Debug, Default, Deserialize)]
pub struct ReleaseQuery {
    pub owner: Option<String>,
    #[serde(default)]
    pub force: bool,
}

/// `DELETE /locks/{name}[?owner=&force=]`.
pub async fn release(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<ReleaseQuery>,
) -> ApiResult {
    let released = state
        .kernel
        .release_lock(&name, query.owner.as_deref(), query.force)?;
    Ok(ok(serde_json::json!({ "released": released })))
}

/// `GET /locks/{name}/check`.
pub async fn check(State(state): State<AppState>, Path(name): Path<String>) -> ApiResult {
    let lock = state.kernel.check_lock(&name)?;
    Ok(ok(serde_json::json!({ "held": lock.is_some(), "lock": lock })))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub owner: Option<String>,
}

/// `GET /locks[?owner=…]`.
pub async fn list(State(state): State<AppState>, Query(query): Query<ListQuery>) -> ApiResult {
    let locks = state.kernel.locks(query.owner.as_deref())?;
    Ok(ok(serde_json::json!({ "locks": locks })))
}

#[cfg(test)]
#[path = "locks_tests.rs"]
mod tests;
