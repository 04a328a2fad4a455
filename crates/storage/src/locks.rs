// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock accessors.
//!
//! Acquisition is one transaction: look at the current row, replace it when
//! expired, refuse when live. Expired rows are otherwise harmless and are
//! swept lazily by list/check and the reaper.

use harbor_core::LockRecord;
use rusqlite::{params, OptionalExtension, Row};

use crate::error::StorageError;
use crate::store::Store;

/// Result of an acquisition attempt.
#[derive(Debug, Clone)]
pub enum AcquireOutcome {
    Acquired,
    /// Someone else holds an unexpired lease.
    Held(LockRecord),
}

fn row_to_lock(row: &Row<'_>) -> Result<LockRecord, rusqlite::Error> {
    Ok(LockRecord {
        name: row.get("name")?,
        owner: row.get("owner")?,
        acquired_at: row.get("acquired_at")?,
        expires_at: row.get("expires_at")?,
        pid: row.get::<_, Option<i64>>("pid")?.map(|p| p as u32),
    })
}

const SELECT: &str = "SELECT name, owner, acquired_at, expires_at, pid FROM locks";

impl Store {
    /// Insert the lock iff no unexpired row exists for `record.name`.
    pub fn acquire_lock(
        &self,
        record: &LockRecord,
        now: i64,
    ) -> Result<AcquireOutcome, StorageError> {
        self.with_tx(|tx| {
            let existing: Option<LockRecord> = tx
                .query_row(
                    &format!("{SELECT} WHERE name = ?1"),
                    [&record.name],
                    row_to_lock,
                )
                .optional()?;

            if let Some(current) = existing {
                if !current.is_expired(now) {
                    return Ok(AcquireOutcome::Held(current));
                }
                tx.execute("DELETE FROM locks WHERE name = ?1", [&record.name])?;
            }

            tx.execute(
                "INSERT INTO locks (name, owner, acquired_at, expires_at, pid)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.name,
                    record.owner,
                    record.acquired_at,
                    record.expires_at,
                    record.pid.map(|p| p as i64),
                ],
            )?;
            Ok(AcquireOutcome::Acquired)
        })
    }

    pub fn get_lock(&self, name: &str) -> Result<Option<LockRecord>, StorageError> {
        self.with_conn(|conn| {
            conn.query_row(&format!("{SELECT} WHERE name = ?1"), [name], row_to_lock)
                .optional()
                .map_err(Into::into)
        })
    }

    /// Update the lease expiry; returns false when the lock is gone.
    pub fn update_lock_expiry(
        &self,
        name: &str,
        expires_at: Option<i64>,
    ) -> Result<bool, StorageError> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE locks SET expires_at = ?2 WHERE name = ?1",
                params![name, expires_at],
            )?;
            Ok(n > 0)
        })
    }

    pub fn delete_lock(&self, name: &str) -> Result<bool, StorageError> {
        self.with_conn(|conn| {
            let n = conn.execute("DELETE FROM locks WHERE name = ?1", [name])?;
            Ok(n > 0)
        })
    }

    /// List unexpired locks, optionally by owner, sweeping expired rows.
    pub fn list_locks(
        &self,
        owner: Option<&str>,
        now: i64,
    ) -> Result<Vec<LockRecord>, StorageError> {
        self.with_tx(|tx| {
            tx.execute(
                "DELETE FROM locks WHERE expires_at IS NOT NULL AND expires_at <= ?1",
                [now],
            )?;
            let mut stmt = tx.prepare(&format!("{SELECT} ORDER BY name"))?;
            let rows = stmt
                .query_map([], row_to_lock)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(match owner {
                Some(o) => rows.into_iter().filter(|l| l.owner == o).collect(),
                None => rows,
            })
        })
    }

    /// Delete expired lock rows; returns the count (reaper pass).
    pub fn delete_expired_locks(&self, now: i64) -> Result<u64, StorageError> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "DELETE FROM locks WHERE expires_at IS NOT NULL AND expires_at <= ?1",
                [now],
            )?;
            Ok(n as u64)
        })
    }
}

#[cfg(test)]
#[path = "locks_tests.rs"]
mod tests;
