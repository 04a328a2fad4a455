// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Port assignment: claim, release, list, endpoints.
//!
//! A claim is serialized through the store's unique constraints: losing an
//! insert race surfaces as a constraint violation and the search retries
//! with a fresh scan. The OS listen probe is cached (~2 s) because one scan
//! may walk the whole range.

use std::collections::HashSet;

use harbor_core::{Clock, IdGen, Identity, IdentityPattern, KernelError, ServiceRecord};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::kernel::Kernel;

/// Caller-supplied knobs for a claim.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClaimOptions {
    /// Try this port first; fall back to scanning on any collision.
    pub preferred_port: Option<u16>,
    /// Override the configured search range.
    pub range: Option<(u16, u16)>,
    /// Claim lifetime; the row becomes reapable after this many ms.
    pub expires_ms: Option<i64>,
    /// Owning process for stale-claim reclamation.
    pub pid: Option<u32>,
    /// Health probe path stored with the service.
    pub health_path: Option<String>,
}

/// Outcome of a claim.
#[derive(Debug, Clone, Serialize)]
pub struct ClaimResult {
    pub service: ServiceRecord,
    /// True when an existing live claim was returned instead of a new one.
    pub existing: bool,
}

impl<C: Clock, I: IdGen> Kernel<C, I> {
    /// Claim a port for `identity`.
    ///
    /// Same name, same port: a repeat claim while the owning pid is alive
    /// returns the stored row untouched except for `last_seen`. A dead
    /// owner's row is reclaimed and the claim proceeds fresh.
    pub fn claim(
        &self,
        identity: &Identity,
        opts: &ClaimOptions,
    ) -> Result<ClaimResult, KernelError> {
        let now = self.now();

        if let Some(existing) = self.store().get_service(identity)? {
            let pid_live = existing.pid.map_or(true, |pid| self.pid_alive(pid));
            if pid_live && !existing.is_expired(now) {
                self.store().touch_service(identity, now)?;
                let mut service = existing;
                service.last_seen = now;
                return Ok(ClaimResult {
                    service,
                    existing: true,
                });
            }
            debug!(identity = %identity, port = existing.port, "reclaiming stale service row");
            self.store().delete_service(identity)?;
        }

        let range = self.claim_range(opts)?;

        for _attempt in 0..=self.config().claim_retries {
            let used: HashSet<u16> = self
                .store()
                .list_services(None)?
                .into_iter()
                .map(|s| s.port)
                .collect();

            let port = self
                .find_free_port(opts.preferred_port, range, &used)
                .ok_or_else(|| {
                    self.metrics().incr_port_search_failures();
                    KernelError::transient(format!(
                        "no free port in {}-{}",
                        range.0, range.1
                    ))
                })?;

            let record = ServiceRecord {
                identity: identity.clone(),
                port,
                pid: opts.pid,
                claimed_at: now,
                last_seen: now,
                expires_at: opts.expires_ms.map(|ms| now + ms),
                health_path: opts.health_path.clone(),
                endpoints: Default::default(),
            };

            match self.store().insert_service(&record) {
                Ok(()) => {
                    info!(identity = %identity, port, "port claimed");
                    self.record_activity(
                        "service",
                        "claim",
                        &identity.to_string(),
                        Some(serde_json::json!({ "port": port })),
                        None,
                    );
                    return Ok(ClaimResult {
                        service: record,
                        existing: false,
                    });
                }
                Err(e) if e.is_constraint() => {
                    // Lost the race for either the port or the identity.
                    self.metrics().incr_claim_retries();
                    if let Some(winner) = self.store().get_service(identity)? {
                        return Ok(ClaimResult {
                            service: winner,
                            existing: true,
                        });
                    }
                    debug!(identity = %identity, port, "claim collision, rescanning");
                }
                Err(e) => return Err(e.into()),
            }
        }

        self.metrics().incr_port_search_failures();
        Err(KernelError::conflict(format!(
            "could not claim a port for '{}' after {} retries",
            identity,
            self.config().claim_retries
        )))
    }

    /// Release by exact identity or wildcard pattern; returns rows removed.
    ///
    /// Patterns only ever touch the services table — sessions' file claims
    /// are left alone.
    pub fn release(&self, pattern: &str) -> Result<u64, KernelError> {
        let parsed = IdentityPattern::parse(pattern)?;
        let released = if parsed.is_wildcard() {
            self.store().delete_services_matching(&parsed)?
        } else {
            let identity = Identity::parse(pattern)?;
            u64::from(self.store().delete_service(&identity)?)
        };
        if released > 0 {
            self.record_activity(
                "service",
                "release",
                pattern,
                Some(serde_json::json!({ "released": released })),
                None,
            );
        }
        Ok(released)
    }

    /// Sweep lapsed claims: rows past their expiry plus rows whose owning
    /// pid is gone. Returns rows removed.
    pub fn release_expired(&self) -> Result<u64, KernelError> {
        let now = self.now();
        let mut released = self.store().delete_expired_services(now)?;

        for (identity, pid) in self.store().list_service_pids()? {
            if !self.pid_alive(pid) {
                debug!(identity = %identity, pid, "dropping service with dead pid");
                released += u64::from(self.store().delete_service(&identity)?);
            }
        }

        if released > 0 {
            self.record_activity(
                "service",
                "release_expired",
                "*",
                Some(serde_json::json!({ "released": released })),
                None,
            );
        }
        Ok(released)
    }

    /// Query services, optionally by wildcard pattern.
    pub fn services(
        &self,
        pattern: Option<&IdentityPattern>,
    ) -> Result<Vec<ServiceRecord>, KernelError> {
        Ok(self.store().list_services(pattern)?)
    }

    /// Fetch one service.
    pub fn service(&self, identity: &Identity) -> Result<ServiceRecord, KernelError> {
        self.store()
            .get_service(identity)?
            .ok_or_else(|| KernelError::not_found("service", identity.to_string()))
    }

    /// Merge one endpoint URL into a service's endpoint map.
    pub fn set_endpoint(
        &self,
        identity: &Identity,
        env: &str,
        url: &str,
    ) -> Result<ServiceRecord, KernelError> {
        if env.is_empty() || !env.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(KernelError::validation(format!(
                "invalid environment tag '{}'",
                env
            )));
        }
        if url.is_empty() {
            return Err(KernelError::validation("endpoint url must not be empty"));
        }
        if !self.store().set_service_endpoint(identity, env, url)? {
            return Err(KernelError::not_found("service", identity.to_string()));
        }
        self.record_activity(
            "service",
            "set_endpoint",
            &identity.to_string(),
            Some(serde_json::json!({ "env": env, "url": url })),
            None,
        );
        self.service(identity)
    }

    fn claim_range(&self, opts: &ClaimOptions) -> Result<(u16, u16), KernelError> {
        let range = opts.range.unwrap_or(self.config().port_range);
        if range.0 < 1024 || range.0 > range.1 {
            return Err(KernelError::validation(format!(
                "invalid port range {}-{}",
                range.0, range.1
            )));
        }
        Ok(range)
    }

    /// Preferred port if free, else first free port in the range. Skips
    /// rows in the database, reserved ports, and OS listeners.
    fn find_free_port(
        &self,
        preferred: Option<u16>,
        range: (u16, u16),
        used: &HashSet<u16>,
    ) -> Option<u16> {
        let reserved = &self.config().reserved_ports;
        let free = |port: u16| {
            !used.contains(&port) && !reserved.contains(&port) && !self.port_listening(port)
        };

        if let Some(port) = preferred {
            if port >= range.0 && port <= range.1 && free(port) {
                return Some(port);
            }
        }
        (range.0..=range.1).find(|&port| free(port))
    }
}

#[cfg(test)]
#[path = "ports_tests.rs"]
mod tests;
