// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Kernel tunables.
//!
//! Everything the spec leaves configurable lands here with a conservative
//! default. The daemon layers environment overrides on top at startup.

use harbor_core::StalenessThresholds;
use serde::Serialize;

/// Kernel configuration; `Default` gives the documented defaults.
#[derive(Debug, Clone, Serialize)]
pub struct KernelConfig {
    /// Inclusive port search range for claims.
    pub port_range: (u16, u16),
    /// Ports never handed out, on top of everything outside `port_range`.
    pub reserved_ports: Vec<u16>,
    /// Insert retries when a claim loses a port race.
    pub claim_retries: u32,
    /// How long one OS listen-scan result stays valid.
    pub port_scan_ttl_ms: u64,

    /// Upper bound for lock TTLs (ms).
    pub lock_ttl_max_ms: i64,

    /// Frames a subscriber may have in flight before eviction.
    pub subscriber_queue_max: usize,
    /// Concurrent SSE streams allowed per source address.
    pub sse_per_source_max: usize,
    /// Stored rows kept per channel.
    pub message_retention_count: u32,
    /// Stored message age bound (ms).
    pub message_retention_age_ms: i64,
    /// Cap on a publish payload (bytes).
    pub max_payload_bytes: usize,
    /// Longest a history poll may wait for a publication (ms).
    pub poll_wait_max_ms: u64,

    /// Agent staleness thresholds.
    pub staleness: StalenessThresholds,

    /// Notes captured per session in a resurrection snapshot.
    pub salvage_notes_per_session: u32,

    /// Activity age bound (ms).
    pub activity_retention_age_ms: i64,
    /// Activity row-count bound.
    pub activity_retention_rows: u32,

    /// Agent id used when a caller supplies none (implicit sessions).
    pub default_agent_id: String,

    /// Reaper sweep period (ms).
    pub reaper_period_ms: u64,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            port_range: (4000, 4999),
            reserved_ports: vec![9876],
            claim_retries: 5,
            port_scan_ttl_ms: 2_000,

            lock_ttl_max_ms: 24 * 60 * 60 * 1000,

            subscriber_queue_max: 100,
            sse_per_source_max: 10,
            message_retention_count: 1_000,
            message_retention_age_ms: 24 * 60 * 60 * 1000,
            max_payload_bytes: 10 * 1024,
            poll_wait_max_ms: 30_000,

            staleness: StalenessThresholds::default(),

            salvage_notes_per_session: 20,

            activity_retention_age_ms: 7 * 24 * 60 * 60 * 1000,
            activity_retention_rows: 100_000,

            default_agent_id: "harbor".to_string(),

            reaper_period_ms: 5 * 60 * 1000,
        }
    }
}

impl KernelConfig {
    /// True when `port` may be handed out.
    pub fn port_allowed(&self, port: u16) -> bool {
        port >= self.port_range.0
            && port <= self.port_range.1
            && !self.reserved_ports.contains(&port)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
