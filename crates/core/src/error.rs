// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Kernel error kinds.
//!
//! Components return these as structured values; the HTTP layer maps them to
//! status codes and the `{error, code}` envelope. Only truly unexpected
//! failures unwind further than this type.

use thiserror::Error;

/// Errors the kernel recognizes.
#[derive(Debug, Clone, Error)]
pub enum KernelError {
    /// Malformed input: bad identity, out-of-range port, unknown enum.
    #[error("{0}")]
    Validation(String),

    /// A named lock is held by someone else.
    #[error("lock '{name}' is held by '{owner}'")]
    LockHeld {
        name: String,
        owner: String,
        held_since: i64,
        expires_at: Option<i64>,
    },

    /// Resource conflict other than a held lock (port in use, claim lost).
    #[error("{0}")]
    Conflict(String),

    /// Unknown service/session/agent/lock on read or update.
    #[error("{what} '{key}' not found")]
    NotFound { what: &'static str, key: String },

    /// Rate limit, SSE stream cap, or subscriber queue exhausted.
    #[error("{0}")]
    Capacity(String),

    /// Request body exceeds the configured limit.
    #[error("payload exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    /// Retryable failure: store busy after retries, free-port search failed.
    #[error("{0}")]
    Transient(String),

    /// Unrecoverable failure; aborts startup when raised there.
    #[error("{0}")]
    Fatal(String),
}

impl KernelError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found(what: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            what,
            key: key.into(),
        }
    }

    pub fn capacity(msg: impl Into<String>) -> Self {
        Self::Capacity(msg.into())
    }

    pub fn transient(msg: impl Into<String>) -> Self {
        Self::Transient(msg.into())
    }

    pub fn fatal(msg: impl Into<String>) -> Self {
        Self::Fatal(msg.into())
    }

    /// Stable machine-readable code for the wire envelope.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION",
            Self::LockHeld { .. } => "LOCK_HELD",
            Self::Conflict(_) => "CONFLICT",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Capacity(_) => "CAPACITY",
            Self::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            Self::Transient(_) => "TRANSIENT",
            Self::Fatal(_) => "FATAL",
        }
    }

    /// True for failures a client may retry unchanged.
    pub fn retryable(&self) -> bool {
        matches!(self, Self::Transient(_) | Self::Capacity(_))
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
