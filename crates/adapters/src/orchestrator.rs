// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Orchestrator contract.
//!
//! The orchestrator spawns user dev processes, claims their ports, sets
//! endpoints, and probes health paths. Its side of the conversation is the
//! kernel HTTP surface; what lives here is the publication it emits when a
//! service comes up, and the health-probe seam the daemon can hand it.

use async_trait::async_trait;
use harbor_core::Identity;
use serde::{Deserialize, Serialize};

/// Channel the orchestrator publishes readiness events on.
pub const SERVICE_READY_CHANNEL: &str = "services";

/// Payload published on [`SERVICE_READY_CHANNEL`] when a service is up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceReady {
    pub event: String,
    pub identity: Identity,
    pub port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ServiceReady {
    pub fn new(identity: Identity, port: u16) -> Self {
        Self {
            event: "service.ready".to_string(),
            identity,
            port,
            url: None,
        }
    }
}

/// Probe a service's health path.
#[async_trait]
pub trait HealthProbe: Send + Sync + 'static {
    /// True when the endpoint answered healthy.
    async fn probe(&self, url: &str) -> bool;
}

/// Probe that never reports healthy; for wiring without an orchestrator.
#[derive(Clone, Default)]
pub struct NoOpHealthProbe;

#[async_trait]
impl HealthProbe for NoOpHealthProbe {
    async fn probe(&self, _url: &str) -> bool {
        false
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
