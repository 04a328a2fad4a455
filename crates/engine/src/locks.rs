// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Leased locks: acquire, extend, release, check, list.
//!
//! Acquisition never blocks server-side; contention is reported to the
//! caller with the current holder's lease so clients can decide whether to
//! wait, retry, or force.

use harbor_core::{Clock, IdGen, KernelError, LockRecord};
use harbor_storage::AcquireOutcome;
use serde::Deserialize;
use tracing::info;

use crate::kernel::Kernel;

/// Options for acquire and extend.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LockOptions {
    /// Opaque holder identifier; defaults to the caller's pid string.
    pub owner: Option<String>,
    /// Lease length; absent means the lock never expires on its own.
    pub ttl_ms: Option<i64>,
    /// Owning pid, recorded for diagnostics.
    pub pid: Option<u32>,
}

impl<C: Clock, I: IdGen> Kernel<C, I> {
    /// Acquire `name` iff no unexpired holder exists.
    pub fn acquire_lock(
        &self,
        name: &str,
        opts: &LockOptions,
    ) -> Result<LockRecord, KernelError> {
        validate_lock_name(name)?;
        let ttl = self.validate_ttl(opts.ttl_ms)?;
        let now = self.now();
        let owner = opts
            .owner
            .clone()
            .unwrap_or_else(|| std::process::id().to_string());

        let record = LockRecord {
            name: name.to_string(),
            owner,
            acquired_at: now,
            expires_at: ttl.map(|t| now + t),
            pid: opts.pid,
        };

        match self.store().acquire_lock(&record, now)? {
            AcquireOutcome::Acquired => {
                info!(name, owner = %record.owner, "lock acquired");
                self.record_activity(
                    "lock",
                    "acquire",
                    name,
                    Some(serde_json::json!({ "owner": record.owner, "ttl_ms": ttl })),
                    None,
                );
                Ok(record)
            }
            AcquireOutcome::Held(current) => Err(KernelError::LockHeld {
                name: name.to_string(),
                owner: current.owner,
                held_since: current.acquired_at,
                expires_at: current.expires_at,
            }),
        }
    }

    /// Push a held lock's expiry out to `now + ttl`.
    ///
    /// Requires a matching owner unless `force`.
    pub fn extend_lock(
        &self,
        name: &str,
        opts: &LockOptions,
        force: bool,
    ) -> Result<LockRecord, KernelError> {
        let ttl = self
            .validate_ttl(opts.ttl_ms)?
            .ok_or_else(|| KernelError::validation("ttl_ms is required to extend a lock"))?;
        let now = self.now();

        let current = self
            .store()
            .get_lock(name)?
            .filter(|l| !l.is_expired(now))
            .ok_or_else(|| KernelError::not_found("lock", name))?;

        if !force {
            match &opts.owner {
                Some(owner) if *owner == current.owner => {}
                _ => {
                    return Err(KernelError::LockHeld {
                        name: name.to_string(),
                        owner: current.owner,
                        held_since: current.acquired_at,
                        expires_at: current.expires_at,
                    })
                }
            }
        }

        let expires_at = Some(now + ttl);
        self.store().update_lock_expiry(name, expires_at)?;
        self.record_activity(
            "lock",
            "extend",
            name,
            Some(serde_json::json!({ "ttl_ms": ttl })),
            None,
        );
        Ok(LockRecord {
            expires_at,
            ..current
        })
    }

    /// Release a lock. Returns false (not an error) when nothing was held;
    /// an expired lease counts as not held.
    pub fn release_lock(
        &self,
        name: &str,
        owner: Option<&str>,
        force: bool,
    ) -> Result<bool, KernelError> {
        let now = self.now();
        let Some(current) = self.store().get_lock(name)? else {
            return Ok(false);
        };

        if current.is_expired(now) {
            // Lapsed lease: clean it up, report released=false.
            self.store().delete_lock(name)?;
            return Ok(false);
        }

        if !force && owner != Some(current.owner.as_str()) {
            return Err(KernelError::LockHeld {
                name: name.to_string(),
                owner: current.owner,
                held_since: current.acquired_at,
                expires_at: current.expires_at,
            });
        }

        self.store().delete_lock(name)?;
        info!(name, "lock released");
        self.record_activity(
            "lock",
            "release",
            name,
            Some(serde_json::json!({ "forced": force })),
            None,
        );
        Ok(true)
    }

    /// Non-mutating read; expired leases read as absent.
    pub fn check_lock(&self, name: &str) -> Result<Option<LockRecord>, KernelError> {
        let now = self.now();
        Ok(self.store().get_lock(name)?.filter(|l| !l.is_expired(now)))
    }

    /// Unexpired locks, optionally by owner. Expired rows are swept here.
    pub fn locks(&self, owner: Option<&str>) -> Result<Vec<LockRecord>, KernelError> {
        Ok(self.store().list_locks(owner, self.now())?)
    }

    fn validate_ttl(&self, ttl_ms: Option<i64>) -> Result<Option<i64>, KernelError> {
        match ttl_ms {
            None => Ok(None),
            Some(t) if t >= 1 && t <= self.config().lock_ttl_max_ms => Ok(Some(t)),
            Some(t) => Err(KernelError::validation(format!(
                "ttl_ms {} outside 1..={}",
                t,
                self.config().lock_ttl_max_ms
            ))),
        }
    }
}

fn validate_lock_name(name: &str) -> Result<(), KernelError> {
    if name.is_empty() || name.len() > 128 {
        return Err(KernelError::validation("lock name must be 1-128 characters"));
    }
    let ok = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ':' | '/'));
    if !ok {
        return Err(KernelError::validation(format!(
            "lock name '{}' contains invalid characters",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "locks_tests.rs"]
mod tests;
