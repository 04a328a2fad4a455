// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Storage error type and its mapping onto kernel error kinds.

use harbor_core::KernelError;
use thiserror::Error;

/// Errors from the store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to open database: {0}")]
    Open(String),

    #[error("schema migration failed: {0}")]
    Migrate(String),

    /// `SQLITE_BUSY` persisted through all retries.
    #[error("database busy")]
    Busy,

    /// A uniqueness or foreign-key constraint fired.
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// A stored column failed to decode (bad JSON, unknown enum string).
    #[error("corrupt row: {0}")]
    Corrupt(String),

    #[error("database error: {0}")]
    Sqlite(rusqlite::Error),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, msg) => match e.code {
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked => {
                    StorageError::Busy
                }
                rusqlite::ErrorCode::ConstraintViolation => {
                    StorageError::Constraint(msg.clone().unwrap_or_else(|| e.to_string()))
                }
                _ => StorageError::Sqlite(err),
            },
            _ => StorageError::Sqlite(err),
        }
    }
}

impl From<StorageError> for KernelError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Open(msg) | StorageError::Migrate(msg) => KernelError::fatal(msg),
            StorageError::Busy => KernelError::transient("database busy, retry"),
            other => KernelError::transient(other.to_string()),
        }
    }
}

impl StorageError {
    /// True when the error is a uniqueness/foreign-key constraint.
    pub fn is_constraint(&self) -> bool {
        matches!(self, StorageError::Constraint(_))
    }
}
