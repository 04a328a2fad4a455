// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The REST surface over the kernel.
//!
//! Every handler validates, dispatches to the kernel, and answers with the
//! stable `{success, ...}` / `{error, code}` envelopes. Rate limiting and
//! error accounting run as middleware so handlers stay thin.

mod activity;
mod agents;
mod changelog;
mod error;
mod extract;
mod locks;
mod messages;
mod observe;
mod salvage;
mod services;
mod sessions;

pub use error::{ApiError, ApiResult};

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{ConnectInfo, DefaultBodyLimit, Request, State};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::Router;
use harbor_engine::{Reaper, SystemKernel};
use tower_http::trace::TraceLayer;

use crate::ratelimit::RateLimiter;

/// Transport-level body cap; the kernel separately enforces the 10 KiB
/// payload limit with a structured error.
const BODY_LIMIT_BYTES: usize = 64 * 1024;

/// Shared state for every handler.
#[derive(Clone)]
pub struct AppState {
    pub kernel: Arc<SystemKernel>,
    pub reaper: Arc<Reaper>,
    pub limiter: Arc<RateLimiter>,
    pub started_at: Instant,
    pub bind_port: u16,
}

impl AppState {
    pub fn new(kernel: Arc<SystemKernel>, reaper: Arc<Reaper>, bind_port: u16) -> Self {
        Self {
            kernel,
            reaper,
            limiter: Arc::new(RateLimiter::default()),
            started_at: Instant::now(),
            bind_port,
        }
    }
}

/// Build the full router.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Ports / services
        .route("/claim", post(services::claim))
        .route("/claim/{identity}", post(services::claim_by_path))
        .route("/release", delete(services::release))
        .route("/release/{identity}", delete(services::release_by_path))
        .route("/services", get(services::list))
        .route("/services/{identity}", get(services::detail))
        .route("/services/{identity}/endpoint", put(services::set_endpoint))
        // Locks
        .route(
            "/locks/{name}",
            post(locks::acquire).put(locks::extend).delete(locks::release),
        )
        .route("/locks/{name}/check", get(locks::check))
        .route("/locks", get(locks::list))
        // Messaging
        .route(
            "/msg/{channel}",
            post(messages::publish)
                .get(messages::history)
                .delete(messages::clear),
        )
        .route("/subscribe/{channel}", get(messages::subscribe))
        .route("/channels", get(messages::channels))
        // Agents
        .route("/agents/{id}", post(agents::register).delete(agents::unregister))
        .route("/agents/{id}/heartbeat", put(agents::heartbeat))
        .route("/agents", get(agents::list))
        // Sessions & notes
        .route("/sessions", post(sessions::start).get(sessions::list))
        .route(
            "/sessions/{id}",
            get(sessions::detail)
                .put(sessions::end)
                .delete(sessions::remove),
        )
        .route("/sessions/{id}/notes", post(sessions::add_note))
        .route(
            "/sessions/{id}/files",
            post(sessions::add_files).delete(sessions::remove_files),
        )
        .route("/notes", post(sessions::quick_note).get(sessions::recent_notes))
        // Salvage
        .route("/salvage", get(salvage::list).post(salvage::claim))
        .route("/resurrection/reap", post(salvage::reap))
        // Activity & changelog
        .route("/activity", get(activity::list))
        .route("/activity/summary", get(activity::summary))
        .route("/activity/stats", get(activity::stats))
        .route("/changelog", post(changelog::record).get(changelog::list))
        // Observability
        .route("/health", get(observe::health))
        .route("/version", get(observe::version))
        .route("/metrics", get(observe::metrics))
        .route("/config", get(observe::config))
        .fallback(not_found)
        // Layer order: the outcome tracker is outermost so rate-limit
        // refusals are audited like any other surfaced error.
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit))
        .layer(middleware::from_fn_with_state(state.clone(), track_outcome))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The client address, or "local" when the transport supplies none
/// (in-process tests).
fn source_of(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip().to_string())
        .unwrap_or_else(|| "local".to_string())
}

/// Refuse requests beyond the per-source budget. SSE streams pass through:
/// their cap lives in the subscriber registry.
async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let is_subscribe = request.uri().path().starts_with("/subscribe/");
    if !is_subscribe {
        let source = source_of(&request);
        if !state.limiter.allow(&source, Instant::now()) {
            state.kernel.metrics().incr_rate_limited();
            return error::rate_limited_response();
        }
    }
    next.run(request).await
}

/// Count request outcomes and give every surfaced error its activity row.
async fn track_outcome(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let response = next.run(request).await;

    if let Some(code) = response.extensions().get::<error::ErrorCode>() {
        state.kernel.metrics().incr_requests_error();
        state.kernel.metrics().incr_error_kind(code.0);
        state.kernel.record_activity(
            "http",
            "error",
            &path,
            Some(serde_json::json!({ "code": code.0 })),
            None,
        );
    } else if response.status().is_success() {
        state.kernel.metrics().incr_requests_ok();
    }
    response
}

/// 404 for unknown paths, in the standard envelope.
pub async fn not_found(uri: axum::http::Uri) -> Response {
    ApiError::from(harbor_core::KernelError::not_found("route", uri.path())).into_response()
}

#[cfg(test)]
pub(crate) mod test_helpers;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
