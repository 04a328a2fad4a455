// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Kernel metrics: plain counters behind a mutex, snapshotted on demand.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use crate::reaper::SweepReport;

/// Shared counter set.
#[derive(Clone, Default)]
pub struct Metrics {
    inner: Arc<Mutex<MetricsSnapshot>>,
}

/// Point-in-time copy of every counter.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricsSnapshot {
    pub requests_ok: u64,
    pub requests_error: u64,
    pub rate_limited: u64,
    pub claim_retries: u64,
    pub port_search_failures: u64,
    pub messages_published: u64,
    pub subscribers_connected: u64,
    pub subscribers_evicted: u64,
    pub sse_rejected: u64,
    pub errors_by_kind: BTreeMap<String, u64>,
    pub reaper_sweeps: u64,
    pub last_sweep: Option<SweepReport>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn incr_requests_ok(&self) {
        self.inner.lock().requests_ok += 1;
    }

    pub fn incr_requests_error(&self) {
        self.inner.lock().requests_error += 1;
    }

    pub fn incr_rate_limited(&self) {
        self.inner.lock().rate_limited += 1;
    }

    pub fn incr_claim_retries(&self) {
        self.inner.lock().claim_retries += 1;
    }

    pub fn incr_port_search_failures(&self) {
        self.inner.lock().port_search_failures += 1;
    }

    pub fn incr_messages_published(&self) {
        self.inner.lock().messages_published += 1;
    }

    pub fn incr_subscribers_connected(&self) {
        self.inner.lock().subscribers_connected += 1;
    }

    pub fn incr_subscribers_evicted(&self) {
        self.inner.lock().subscribers_evicted += 1;
    }

    pub fn incr_sse_rejected(&self) {
        self.inner.lock().sse_rejected += 1;
    }

    pub fn incr_error_kind(&self, code: &str) {
        *self
            .inner
            .lock()
            .errors_by_kind
            .entry(code.to_string())
            .or_insert(0) += 1;
    }

    pub fn record_sweep(&self, report: &SweepReport) {
        let mut inner = self.inner.lock();
        inner.reaper_sweeps += 1;
        inner.last_sweep = Some(report.clone());
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.inner.lock().clone()
    }
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod tests;
