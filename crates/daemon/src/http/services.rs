// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Port assignment endpoints.

use axum::extract::{Path, Query, State};
use harbor_core::{Identity, IdentityPattern, KernelError};
use harbor_engine::ClaimOptions;
use serde::Deserialize;

use super::error::{ok, ApiResult};
use super::extract::Body;
use super::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClaimBody {
    pub identity: Option<String>,
    pub preferred_port: Option<u16>,
    pub range: Option<(u16, u16)>,
    pub expires_ms: Option<i64>,
    pub pid: Option<u32>,
    pub health_path: Option<String>,
}

fn validate_claim(body: &ClaimBody) -> Result<(), KernelError> {
    if let Some(port) = body.preferred_port {
        if port < 1024 {
            return Err(KernelError::validation(format!(
                "preferred port {} below 1024",
                port
            )));
        }
    }
    if let Some(pid) = body.pid {
        if !(1..=99_999).contains(&pid) {
            return Err(KernelError::validation(format!("pid {} outside 1..=99999", pid)));
        }
    }
    if let Some(ms) = body.expires_ms {
        if !(1..=24 * 60 * 60 * 1000).contains(&ms) {
            return Err(KernelError::validation(format!(
                "expires_ms {} outside 1..=86400000",
                ms
            )));
        }
    }
    Ok(())
}

fn do_claim(state: &AppState, identity: &str, body: ClaimBody) -> ApiResult {
    let identity = Identity::parse(identity)?;
    validate_claim(&body)?;
    let opts = ClaimOptions {
        preferred_port: body.preferred_port,
        range: body.range,
        expires_ms: body.expires_ms,
        pid: body.pid,
        health_path: body.health_path,
    };
    let result = state.kernel.claim(&identity, &opts)?;
    Ok(ok(serde_json::json!({
        "port": result.service.port,
        "existing": result.existing,
        "service": result.service,
    })))
}

/// `POST /claim` — identity in the body.
pub async fn claim(State(state): State<AppState>, Body(body): Body<ClaimBody>) -> ApiResult {
    let identity = body
        .identity
        .clone()
        .ok_or_else(|| KernelError::validation("identity is required"))?;
    do_claim(&state, &identity, body)
}

/// `POST /claim/{identity}`.
pub async fn claim_by_path(
    State(state): State<AppState>,
    Path(identity): Path<String>,
    Body(body): Body<ClaimBody>,
) -> ApiResult {
    if body.identity.is_some() {
        return Err(KernelError::validation("identity given twice").into());
    }
    do_claim(&state, &identity, body)
}

#[derive(Debug, Default, Deserialize)]
pub struct ReleaseQuery {
    pub pattern: Option<String>,
    /// `true` sweeps expired and dead-pid rows instead.
    pub expired: Option<bool>,
}

/// `DELETE /release[?pattern=…|?expired=true]`.
pub async fn release(
    State(state): State<AppState>,
    Query(query): Query<ReleaseQuery>,
) -> ApiResult {
    if query.expired.unwrap_or(false) {
        let released = state.kernel.release_expired()?;
        return Ok(ok(serde_json::json!({ "released": released, "expired": true })));
    }
    let pattern = query
        .pattern
        .ok_or_else(|| KernelError::validation("pattern or expired=true is required"))?;
    let released = state.kernel.release(&pattern)?;
    Ok(ok(serde_json::json!({ "released": released })))
}

/// `DELETE /release/{identity}` — identity or pattern in the path.
pub async fn release_by_path(
    State(state): State<AppState>,
    Path(pattern): Path<String>,
) -> ApiResult {
    let released = state.kernel.release(&pattern)?;
    Ok(ok(serde_json::json!({ "released": released })))
}

#[derive(Debug, Default, Deserialize)]
pub struct ServicesQuery {
    pub pattern: Option<String>,
}

/// `GET /services[?pattern=…]`.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ServicesQuery>,
) -> ApiResult {
    let pattern = query
        .pattern
        .as_deref()
        .map(IdentityPattern::parse)
        .transpose()?;
    let services = state.kernel.services(pattern.as_ref())?;
    Ok(ok(serde_json::json!({ "services": services })))
}

/// `GET /services/{identity}`.
pub async fn detail(State(state): State<AppState>, Path(identity): Path<String>) -> ApiResult {
    let identity = Identity::parse(&identity)?;
    let service = state.kernel.service(&identity)?;
    Ok(ok(serde_json::json!({ "service": service })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointBody {
    pub env: String,
    pub url: String,
}

/// `PUT /services/{identity}/endpoint`.
pub async fn set_endpoint(
    State(state): State<AppState>,
    Path(identity): Path<String>,
    Body(body): Body<EndpointBody>,
) -> ApiResult {
    let identity = Identity::parse(&identity)?;
    let service = state.kernel.set_endpoint(&identity, &body.env, &body.url)?;
    Ok(ok(serde_json::json!({ "service": service })))
}

#[cfg(test)]
#[path = "services_tests.rs"]
mod tests;
