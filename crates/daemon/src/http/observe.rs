// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Observability endpoints: health, version, metrics, config.

use axum::extract::State;

use super::error::{ok, ApiResult};
use super::AppState;

/// `GET /health`.
pub async fn health(State(state): State<AppState>) -> ApiResult {
    // A trivial query proves the store still answers.
    let db = match state.kernel.store().count_services() {
        Ok(_) => "ok",
        Err(_) => "error",
    };
    Ok(ok(serde_json::json!({
        "status": if db == "ok" { "ok" } else { "degraded" },
        "db": db,
        "uptime_ms": state.started_at.elapsed().as_millis() as u64,
    })))
}

/// `GET /version`.
pub async fn version() -> ApiResult {
    Ok(ok(serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
    })))
}

/// `GET /metrics`.
pub async fn metrics(State(state): State<AppState>) -> ApiResult {
    let snapshot = state.kernel.metrics().snapshot();
    Ok(ok(serde_json::json!({ "metrics": snapshot })))
}

/// `GET /config` — the running configuration.
pub async fn config(State(state): State<AppState>) -> ApiResult {
    Ok(ok(serde_json::json!({
        "bind_port": state.bind_port,
        "kernel": state.kernel.config(),
    })))
}

#[cfg(test)]
#[path = "observe_tests.rs"]
mod tests;
