// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Message log accessors.
//!
//! Publication order is the rowid: SQLite hands out monotonically
//! increasing ids under AUTOINCREMENT, which is the per-channel ordering
//! contract subscribers rely on.

use harbor_core::{ChannelInfo, MessageRecord};
use rusqlite::{params, Row};

use crate::error::StorageError;
use crate::store::Store;

fn row_to_message(row: &Row<'_>) -> Result<MessageRecord, rusqlite::Error> {
    Ok(MessageRecord {
        id: row.get("id")?,
        channel: row.get("channel")?,
        payload: row.get("payload")?,
        sender: row.get("sender")?,
        created_at: row.get("created_at")?,
    })
}

impl Store {
    /// Append one message; returns the assigned id.
    pub fn append_message(
        &self,
        channel: &str,
        payload: &str,
        sender: Option<&str>,
        now: i64,
    ) -> Result<i64, StorageError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (channel, payload, sender, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![channel, payload, sender, now],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Stored messages in id order, newest-last. `since` is an exclusive
    /// lower bound on the id; `limit` caps the result from the tail.
    pub fn get_messages(
        &self,
        channel: &str,
        limit: u32,
        since: i64,
    ) -> Result<Vec<MessageRecord>, StorageError> {
        self.with_conn(|conn| {
            // Take the newest `limit` rows above `since`, then restore id order.
            let mut stmt = conn.prepare(
                "SELECT id, channel, payload, sender, created_at FROM (
                     SELECT * FROM messages WHERE channel = ?1 AND id > ?2
                     ORDER BY id DESC LIMIT ?3
                 ) ORDER BY id ASC",
            )?;
            let rows = stmt
                .query_map(params![channel, since, limit], row_to_message)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Distinct channels with message count and last-message time.
    pub fn list_channels(&self) -> Result<Vec<ChannelInfo>, StorageError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT channel, COUNT(*), MAX(created_at) FROM messages
                 GROUP BY channel ORDER BY channel",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(ChannelInfo {
                        channel: row.get(0)?,
                        message_count: row.get(1)?,
                        last_message: row.get(2)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Delete a channel's stored history; returns the count.
    pub fn clear_channel(&self, channel: &str) -> Result<u64, StorageError> {
        self.with_conn(|conn| {
            let n = conn.execute("DELETE FROM messages WHERE channel = ?1", [channel])?;
            Ok(n as u64)
        })
    }

    /// Apply retention: drop rows older than `age_cutoff`, then trim every
    /// channel to its newest `max_per_channel` rows. Returns rows reclaimed.
    pub fn prune_messages(
        &self,
        age_cutoff: i64,
        max_per_channel: u32,
    ) -> Result<u64, StorageError> {
        self.with_tx(|tx| {
            let mut reclaimed =
                tx.execute("DELETE FROM messages WHERE created_at < ?1", [age_cutoff])? as u64;

            let channels: Vec<String> = {
                let mut stmt = tx.prepare("SELECT DISTINCT channel FROM messages")?;
                let rows = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            };
            for channel in channels {
                reclaimed += tx.execute(
                    "DELETE FROM messages WHERE channel = ?1 AND id NOT IN (
                         SELECT id FROM messages WHERE channel = ?1
                         ORDER BY id DESC LIMIT ?2
                     )",
                    params![channel, max_per_channel],
                )? as u64;
            }
            Ok(reclaimed)
        })
    }

    /// Highest assigned message id for a channel (0 when empty).
    pub fn last_message_id(&self, channel: &str) -> Result<i64, StorageError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT COALESCE(MAX(id), 0) FROM messages WHERE channel = ?1",
                [channel],
                |row| row.get(0),
            )
            .map_err(Into::into)
        })
    }
}

#[cfg(test)]
#[path = "messages_tests.rs"]
mod tests;
