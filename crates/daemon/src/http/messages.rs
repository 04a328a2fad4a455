// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Messaging endpoints: publish, history (with long-poll), clear, SSE.

use std::convert::Infallible;

use axum::body::Bytes;
use axum::extract::{Path, Query, Request, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use harbor_core::KernelError;
use serde::Deserialize;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;

use super::error::{ok, ApiResult};
use super::AppState;

/// Seconds between SSE keep-alive comments.
const KEEP_ALIVE_SECS: u64 = 15;

#[derive(Debug, Default, Deserialize)]
pub struct PublishQuery {
    pub sender: Option<String>,
}

/// `POST /msg/{channel}` — the body is the opaque payload.
pub async fn publish(
    State(state): State<AppState>,
    Path(channel): Path<String>,
    Query(query): Query<PublishQuery>,
    body: Bytes,
) -> ApiResult {
    let payload = std::str::from_utf8(&body)
        .map_err(|_| KernelError::validation("payload must be UTF-8"))?;
    if payload.is_empty() {
        return Err(KernelError::validation("payload must not be empty").into());
    }
    let receipt = state
        .kernel
        .publish(&channel, payload, query.sender.as_deref())?;
    Ok(ok(serde_json::json!({
        "id": receipt.id,
        "delivered": receipt.delivered,
    })))
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<u32>,
    pub since: Option<i64>,
    /// Wait up to this many ms for a message newer than `since`.
    pub poll: Option<u64>,
}

/// `GET /msg/{channel}[?limit=&since=&poll=]`.
pub async fn history(
    State(state): State<AppState>,
    Path(channel): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult {
    let messages = match query.poll {
        Some(wait_ms) => {
            state
                .kernel
                .poll_history(&channel, query.limit, query.since.unwrap_or(0), wait_ms)
                .await?
        }
        None => state.kernel.history(&channel, query.limit, query.since)?,
    };
    Ok(ok(serde_json::json!({ "messages": messages })))
}

/// `DELETE /msg/{channel}`.
pub async fn clear(State(state): State<AppState>, Path(channel): Path<String>) -> ApiResult {
    let cleared = state.kernel.clear_channel(&channel)?;
    Ok(ok(serde_json::json!({ "cleared": cleared })))
}

/// `GET /channels`.
pub async fn channels(State(state): State<AppState>) -> ApiResult {
    let channels = state.kernel.channels()?;
    Ok(ok(serde_json::json!({ "channels": channels })))
}

/// `GET /subscribe/{channel}` — the SSE stream.
///
/// Emits a heartbeat frame immediately, then one `data:` frame per
/// publication, with keep-alive comments in between. Client disconnect
/// drops the subscriber via the registration guard.
pub async fn subscribe(
    State(state): State<AppState>,
    Path(channel): Path<String>,
    request: Request,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>>, super::ApiError> {
    let source = super::source_of(&request);
    let handle = state.kernel.subscribe(&channel, &source)?;
    let (guard, rx) = handle.into_parts();

    let heartbeat = tokio_stream::once(Ok::<Event, Infallible>(
        Event::default()
            .event("heartbeat")
            .data("{\"connected\":true}"),
    ));

    let messages = ReceiverStream::new(rx).map(move |message| {
        // The guard rides along with the stream; dropping the stream
        // (client disconnect, shutdown) detaches the subscriber.
        let _ = &guard;
        let data = serde_json::to_string(&message)
            .unwrap_or_else(|_| "{\"error\":\"encode\"}".to_string());
        Ok::<Event, Infallible>(Event::default().data(data))
    });

    Ok(Sse::new(heartbeat.chain(messages)).keep_alive(
        KeepAlive::new()
            .interval(std::time::Duration::from_secs(KEEP_ALIVE_SECS))
            .text("keep-alive"),
    ))
}

#[cfg(test)]
#[path = "messages_tests.rs"]
mod tests;
