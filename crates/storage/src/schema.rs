// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Idempotent schema creation.
//!
//! Every table and index is `CREATE ... IF NOT EXISTS`, so opening an
//! existing file is a no-op. The version row in `schema_migrations` exists
//! for future additive migrations.

use rusqlite::Connection;

use crate::error::StorageError;

/// Current schema version.
pub const SCHEMA_VERSION: i64 = 1;

/// Apply the schema to a fresh or existing database.
pub fn migrate(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(SCHEMA)
        .map_err(|e| StorageError::Migrate(e.to_string()))?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_migrations (version, applied_at)
         VALUES (?1, strftime('%s','now') * 1000)",
        [SCHEMA_VERSION],
    )
    .map_err(|e| StorageError::Migrate(e.to_string()))?;

    Ok(())
}

/// Read the highest applied schema version.
pub fn current_version(conn: &Connection) -> Result<i64, StorageError> {
    let version = conn
        .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
            row.get::<_, Option<i64>>(0)
        })
        .map_err(StorageError::from)?;
    Ok(version.unwrap_or(0))
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    applied_at INTEGER NOT NULL
);

-- Port assignments: one row per identity, one per port.
CREATE TABLE IF NOT EXISTS services (
    identity TEXT PRIMARY KEY,
    port INTEGER NOT NULL UNIQUE,
    pid INTEGER,
    claimed_at INTEGER NOT NULL,
    last_seen INTEGER NOT NULL,
    expires_at INTEGER,
    health_path TEXT,
    endpoints TEXT NOT NULL DEFAULT '{}'
);

CREATE TABLE IF NOT EXISTS locks (
    name TEXT PRIMARY KEY,
    owner TEXT NOT NULL,
    acquired_at INTEGER NOT NULL,
    expires_at INTEGER,
    pid INTEGER
);

CREATE TABLE IF NOT EXISTS messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    channel TEXT NOT NULL,
    payload TEXT NOT NULL,
    sender TEXT,
    created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_messages_channel_id ON messages (channel, id);
CREATE INDEX IF NOT EXISTS idx_messages_created ON messages (created_at);

CREATE TABLE IF NOT EXISTS agents (
    id TEXT PRIMARY KEY,
    agent_type TEXT NOT NULL,
    purpose TEXT,
    project TEXT,
    stack TEXT,
    context TEXT,
    worktree_id TEXT,
    registered_at INTEGER NOT NULL,
    last_heartbeat INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_agents_project ON agents (project);

CREATE TABLE IF NOT EXISTS sessions (
    id TEXT PRIMARY KEY,
    purpose TEXT NOT NULL,
    created_by TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    status TEXT NOT NULL DEFAULT 'active',
    identity TEXT
);
CREATE INDEX IF NOT EXISTS idx_sessions_created_by ON sessions (created_by, status);

CREATE TABLE IF NOT EXISTS notes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id TEXT NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
    note_type TEXT NOT NULL,
    content TEXT NOT NULL,
    created_by TEXT NOT NULL,
    created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_notes_session ON notes (session_id, id);

CREATE TABLE IF NOT EXISTS file_claims (
    session_id TEXT NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
    path TEXT NOT NULL,
    claimed_at INTEGER NOT NULL,
    UNIQUE (session_id, path)
);
CREATE INDEX IF NOT EXISTS idx_file_claims_path ON file_claims (path);

CREATE TABLE IF NOT EXISTS resurrection_entries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    dead_agent_id TEXT NOT NULL,
    identity TEXT,
    project TEXT,
    sessions TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    state TEXT NOT NULL DEFAULT 'pending',
    claimed_by TEXT,
    claimed_at INTEGER
);
CREATE INDEX IF NOT EXISTS idx_resurrection_state ON resurrection_entries (state, project);
CREATE INDEX IF NOT EXISTS idx_resurrection_agent ON resurrection_entries (dead_agent_id, created_at);

CREATE TABLE IF NOT EXISTS changelog (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    identity TEXT NOT NULL,
    project TEXT NOT NULL,
    change_type TEXT NOT NULL,
    summary TEXT NOT NULL,
    description TEXT,
    session_id TEXT,
    agent_id TEXT,
    created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_changelog_project ON changelog (project, id);

CREATE TABLE IF NOT EXISTS activity (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    entry_type TEXT NOT NULL,
    action TEXT NOT NULL,
    target TEXT NOT NULL,
    details TEXT,
    agent_id TEXT,
    created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_activity_created ON activity (created_at);
CREATE INDEX IF NOT EXISTS idx_activity_type ON activity (entry_type, created_at);
"#;

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
