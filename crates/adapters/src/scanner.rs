// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project-scanner contract: the services manifest.
//!
//! The scanner walks a project, detects its runnable services, and writes
//! a manifest the orchestrator consumes. Only the manifest shape is the
//! kernel's business.

use harbor_core::Identity;
use serde::{Deserialize, Serialize};

/// One detected service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestService {
    pub identity: Identity,
    /// Command line the orchestrator runs.
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_path: Option<String>,
    /// Extra environment for the spawned process.
    #[serde(default, skip_serializing_if = "std::collections::BTreeMap::is_empty")]
    pub env: std::collections::BTreeMap<String, String>,
}

/// The manifest a scan produces.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServicesManifest {
    #[serde(default)]
    pub services: Vec<ManifestService>,
}

impl ServicesManifest {
    /// Look up a service by identity.
    pub fn service(&self, identity: &Identity) -> Option<&ManifestService> {
        self.services.iter().find(|s| &s.identity == identity)
    }
}

#[cfg(test)]
#[path = "scanner_tests.rs"]
mod tests;
