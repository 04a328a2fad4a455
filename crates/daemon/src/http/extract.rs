// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request-body extraction with envelope-shaped rejections.
//!
//! axum's stock `Json` rejection answers with plain text; this wrapper
//! keeps every failure in the `{error, code}` envelope. An empty body
//! deserializes as the type's default so bare `POST /claim/:id` style
//! calls work without a `{}` payload. Unknown fields are refused by the
//! body types themselves (`deny_unknown_fields`).

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use harbor_core::KernelError;
use serde::de::DeserializeOwned;

use super::error::ApiError;

/// Strict JSON body: default on empty, validation envelope on garbage.
pub struct Body<T>(pub T);

impl<S, T> FromRequest<S> for Body<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            if rejection.status() == axum::http::StatusCode::PAYLOAD_TOO_LARGE {
                ApiError(KernelError::PayloadTooLarge {
                    limit: super::BODY_LIMIT_BYTES,
                })
            } else {
                ApiError(KernelError::validation(rejection.to_string()))
            }
        })?;

        if bytes.is_empty() {
            return Ok(Self(T::default()));
        }
        let value = serde_json::from_slice(&bytes)
            .map_err(|e| ApiError(KernelError::validation(format!("invalid body: {e}"))))?;
        Ok(Self(value))
    }
}
