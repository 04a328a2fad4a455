// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Service (port assignment) accessors.

use std::collections::BTreeMap;

use harbor_core::{Identity, IdentityPattern, ServiceRecord};
use rusqlite::{params, OptionalExtension, Row};

use crate::error::StorageError;
use crate::store::Store;

fn row_to_service(row: &Row<'_>) -> Result<ServiceRecord, rusqlite::Error> {
    let identity_str: String = row.get("identity")?;
    let endpoints_json: String = row.get("endpoints")?;
    Ok(ServiceRecord {
        identity: Identity::parse(&identity_str).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(std::io::Error::other(e.to_string())),
            )
        })?,
        port: row.get::<_, i64>("port")? as u16,
        pid: row.get::<_, Option<i64>>("pid")?.map(|p| p as u32),
        claimed_at: row.get("claimed_at")?,
        last_seen: row.get("last_seen")?,
        expires_at: row.get("expires_at")?,
        health_path: row.get("health_path")?,
        endpoints: serde_json::from_str(&endpoints_json).unwrap_or_default(),
    })
}

const SELECT: &str = "SELECT identity, port, pid, claimed_at, last_seen, expires_at, \
                      health_path, endpoints FROM services";

impl Store {
    pub fn get_service(&self, identity: &Identity) -> Result<Option<ServiceRecord>, StorageError> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("{SELECT} WHERE identity = ?1"),
                [identity.to_string()],
                row_to_service,
            )
            .optional()
            .map_err(Into::into)
        })
    }

    pub fn get_service_by_port(&self, port: u16) -> Result<Option<ServiceRecord>, StorageError> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("{SELECT} WHERE port = ?1"),
                [port as i64],
                row_to_service,
            )
            .optional()
            .map_err(Into::into)
        })
    }

    /// Insert a fresh service row. Uniqueness violations (identity or port)
    /// surface as [`StorageError::Constraint`] for the caller to retry.
    pub fn insert_service(&self, record: &ServiceRecord) -> Result<(), StorageError> {
        let endpoints = serde_json::to_string(&record.endpoints)
            .map_err(|e| StorageError::Corrupt(e.to_string()))?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO services
                     (identity, port, pid, claimed_at, last_seen, expires_at, health_path, endpoints)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    record.identity.to_string(),
                    record.port as i64,
                    record.pid.map(|p| p as i64),
                    record.claimed_at,
                    record.last_seen,
                    record.expires_at,
                    record.health_path,
                    endpoints,
                ],
            )?;
            Ok(())
        })
    }

    /// Refresh `last_seen` for a live claim.
    pub fn touch_service(&self, identity: &Identity, now: i64) -> Result<bool, StorageError> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE services SET last_seen = ?2 WHERE identity = ?1",
                params![identity.to_string(), now],
            )?;
            Ok(n > 0)
        })
    }

    pub fn delete_service(&self, identity: &Identity) -> Result<bool, StorageError> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "DELETE FROM services WHERE identity = ?1",
                [identity.to_string()],
            )?;
            Ok(n > 0)
        })
    }

    /// Delete every service matching a wildcard pattern; returns the count.
    pub fn delete_services_matching(
        &self,
        pattern: &IdentityPattern,
    ) -> Result<u64, StorageError> {
        self.with_tx(|tx| {
            let mut stmt = tx.prepare(SELECT)?;
            let matching: Vec<String> = stmt
                .query_map([], row_to_service)?
                .filter_map(|r| r.ok())
                .filter(|svc| pattern.matches(&svc.identity))
                .map(|svc| svc.identity.to_string())
                .collect();
            let mut deleted = 0u64;
            for identity in &matching {
                deleted += tx.execute("DELETE FROM services WHERE identity = ?1", [identity])?
                    as u64;
            }
            Ok(deleted)
        })
    }

    /// Delete rows whose expiry has passed; returns the count.
    pub fn delete_expired_services(&self, now: i64) -> Result<u64, StorageError> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "DELETE FROM services WHERE expires_at IS NOT NULL AND expires_at <= ?1",
                [now],
            )?;
            Ok(n as u64)
        })
    }

    /// List services, optionally filtered by a pattern.
    pub fn list_services(
        &self,
        pattern: Option<&IdentityPattern>,
    ) -> Result<Vec<ServiceRecord>, StorageError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{SELECT} ORDER BY identity"))?;
            let rows = stmt
                .query_map([], row_to_service)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(match pattern {
                Some(p) => rows.into_iter().filter(|s| p.matches(&s.identity)).collect(),
                None => rows,
            })
        })
    }

    /// All (identity, pid) pairs with a recorded owning pid, for the reaper.
    pub fn list_service_pids(&self) -> Result<Vec<(Identity, u32)>, StorageError> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT identity, pid FROM services WHERE pid IS NOT NULL")?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u32))
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows
                .into_iter()
                .filter_map(|(s, pid)| Identity::parse(&s).ok().map(|id| (id, pid)))
                .collect())
        })
    }

    /// Merge one endpoint URL into the service's endpoint map.
    pub fn set_service_endpoint(
        &self,
        identity: &Identity,
        env: &str,
        url: &str,
    ) -> Result<bool, StorageError> {
        self.with_tx(|tx| {
            let existing: Option<String> = tx
                .query_row(
                    "SELECT endpoints FROM services WHERE identity = ?1",
                    [identity.to_string()],
                    |row| row.get(0),
                )
                .optional()?;
            let Some(json) = existing else {
                return Ok(false);
            };
            let mut map: BTreeMap<String, String> =
                serde_json::from_str(&json).unwrap_or_default();
            map.insert(env.to_string(), url.to_string());
            let updated = serde_json::to_string(&map)
                .map_err(|e| StorageError::Corrupt(e.to_string()))?;
            tx.execute(
                "UPDATE services SET endpoints = ?2 WHERE identity = ?1",
                params![identity.to_string(), updated],
            )?;
            Ok(true)
        })
    }

    pub fn count_services(&self) -> Result<i64, StorageError> {
        self.with_conn(|conn| {
            conn.query_row("SELECT COUNT(*) FROM services", [], |row| row.get(0))
                .map_err(Into::into)
        })
    }
}

#[cfg(test)]
#[path = "services_tests.rs"]
mod tests;
