// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The store handle: one SQLite connection behind a mutex.
//!
//! SQLite serializes writers anyway; a single connection with WAL and a
//! busy timeout keeps the concurrency story simple — handlers contend on
//! the mutex, not on `SQLITE_BUSY`. Busy errors that still slip through
//! (e.g. an external reader holding the file) are retried a few times
//! before surfacing as Transient.

use std::path::Path;
use std::time::Duration;

use parking_lot::Mutex;
use rusqlite::{Connection, Transaction};
use tracing::debug;

use crate::error::StorageError;
use crate::schema;

/// Attempts for operations that hit `SQLITE_BUSY`.
const BUSY_RETRIES: u32 = 3;

/// Backoff between busy retries.
const BUSY_BACKOFF: Duration = Duration::from_millis(25);

/// SQLite busy handler timeout.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to the embedded database.
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open (or create) the database file and apply the schema.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::Open(e.to_string()))?;
        }
        let conn = Connection::open(path).map_err(|e| StorageError::Open(e.to_string()))?;
        Self::init(conn)
    }

    /// Open an in-memory database (tests).
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn =
            Connection::open_in_memory().map_err(|e| StorageError::Open(e.to_string()))?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, StorageError> {
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| StorageError::Open(e.to_string()))?;
        conn.pragma_update(None, "synchronous", "NORMAL")
            .map_err(|e| StorageError::Open(e.to_string()))?;
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(|e| StorageError::Open(e.to_string()))?;
        conn.busy_timeout(BUSY_TIMEOUT)
            .map_err(|e| StorageError::Open(e.to_string()))?;

        schema::migrate(&conn)?;
        debug!(version = schema::current_version(&conn)?, "store opened");

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run a read or single-statement write against the connection.
    ///
    /// Retries on `SQLITE_BUSY` up to [`BUSY_RETRIES`] times.
    pub(crate) fn with_conn<R>(
        &self,
        f: impl Fn(&Connection) -> Result<R, StorageError>,
    ) -> Result<R, StorageError> {
        let conn = self.conn.lock();
        retry_busy(|| f(&conn))
    }

    /// Run a closure inside a transaction; commit on success.
    ///
    /// The whole transaction is retried on `SQLITE_BUSY`.
    pub(crate) fn with_tx<R>(
        &self,
        f: impl Fn(&Transaction) -> Result<R, StorageError>,
    ) -> Result<R, StorageError> {
        let mut conn = self.conn.lock();
        retry_busy(|| {
            let tx = conn.transaction()?;
            let result = f(&tx)?;
            tx.commit()?;
            Ok(result)
        })
    }
}

fn retry_busy<R>(mut f: impl FnMut() -> Result<R, StorageError>) -> Result<R, StorageError> {
    let mut attempt = 0;
    loop {
        match f() {
            Err(StorageError::Busy) if attempt < BUSY_RETRIES => {
                attempt += 1;
                debug!(attempt, "database busy, retrying");
                std::thread::sleep(BUSY_BACKOFF);
            }
            other => return other,
        }
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
