// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Kernel errors → HTTP envelopes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use harbor_core::KernelError;

/// Handler result: a JSON success envelope or a mapped kernel error.
pub type ApiResult = Result<Json<serde_json::Value>, ApiError>;

/// Stable error code attached to error responses, read by the outcome
/// middleware for metrics and the audit row.
#[derive(Debug, Clone, Copy)]
pub struct ErrorCode(pub &'static str);

/// A kernel error on its way out.
#[derive(Debug)]
pub struct ApiError(pub KernelError);

impl From<KernelError> for ApiError {
    fn from(err: KernelError) -> Self {
        Self(err)
    }
}

impl From<harbor_storage::StorageError> for ApiError {
    fn from(err: harbor_storage::StorageError) -> Self {
        Self(err.into())
    }
}

fn status_of(err: &KernelError) -> StatusCode {
    match err {
        KernelError::Validation(_) => StatusCode::BAD_REQUEST,
        KernelError::LockHeld { .. } | KernelError::Conflict(_) => StatusCode::CONFLICT,
        KernelError::NotFound { .. } => StatusCode::NOT_FOUND,
        KernelError::Capacity(_) => StatusCode::TOO_MANY_REQUESTS,
        KernelError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        KernelError::Transient(_) | KernelError::Fatal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.code();
        let mut body = serde_json::json!({
            "error": self.0.to_string(),
            "code": code,
        });

        // Structured conflict detail: who holds it, since when.
        if let KernelError::LockHeld {
            owner,
            held_since,
            expires_at,
            ..
        } = &self.0
        {
            body["holder"] = serde_json::json!(owner);
            body["held_since"] = serde_json::json!(held_since);
            if let Some(at) = expires_at {
                body["expires_at"] = serde_json::json!(at);
            }
        }
        if self.0.retryable() {
            body["retryable"] = serde_json::json!(true);
        }

        let mut response = (status_of(&self.0), Json(body)).into_response();
        response.extensions_mut().insert(ErrorCode(code));
        response
    }
}

/// The 429 produced by the rate-limit middleware.
pub fn rate_limited_response() -> Response {
    ApiError(KernelError::capacity("rate limit exceeded")).into_response()
}

/// Shorthand for the `{"success": true, ...}` envelope.
pub fn ok(mut body: serde_json::Value) -> Json<serde_json::Value> {
    if let Some(map) = body.as_object_mut() {
        map.insert("success".to_string(), serde_json::Value::Bool(true));
    }
    Json(body)
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
