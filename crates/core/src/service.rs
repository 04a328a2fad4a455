// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Service records: the identity → port assignment.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::identity::Identity;

/// A bound association of an identity to a TCP port.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub identity: Identity,
    pub port: u16,
    /// Owning process, when the claimer supplied one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    pub claimed_at: i64,
    pub last_seen: i64,
    /// When set, the claim lapses at this time and becomes reapable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    /// HTTP path the orchestrator probes for readiness (e.g. "/healthz").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_path: Option<String>,
    /// URL per environment tag: "local", "tunnel", "prod", ...
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub endpoints: BTreeMap<String, String>,
}

impl ServiceRecord {
    /// True when an expiry is set and has passed.
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
