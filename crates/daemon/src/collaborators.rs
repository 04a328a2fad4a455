// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Glue to the external collaborators.
//!
//! The webhook deliverer consumes curated activity events; this forwarder
//! tails the audit log and hands matching entries to whatever deliverer is
//! configured. Delivery, signing, and retries stay on the deliverer's side
//! of the seam. The other collaborators (orchestrator, scanner, tunnels,
//! DNS) talk to the daemon over HTTP and need no resident task.

use std::sync::Arc;
use std::time::Duration;

use harbor_adapters::{WebhookDeliverer, WebhookEvent};
use harbor_engine::SystemKernel;
use harbor_storage::ActivityQuery;
use tokio::sync::Notify;
use tracing::{debug, warn};

/// How often the forwarder looks for new activity.
const FORWARD_INTERVAL: Duration = Duration::from_secs(30);

/// Rows fetched per poll; older rows beyond this are skipped.
const FORWARD_BATCH: u32 = 200;

/// Tails the activity log and forwards curated events.
pub struct WebhookForwarder {
    kernel: Arc<SystemKernel>,
    deliverer: Arc<dyn WebhookDeliverer>,
    last_id: i64,
}

impl WebhookForwarder {
    /// Start from the current end of the log: only new activity forwards.
    pub fn new(kernel: Arc<SystemKernel>, deliverer: Arc<dyn WebhookDeliverer>) -> Self {
        let last_id = newest_activity_id(&kernel);
        Self {
            kernel,
            deliverer,
            last_id,
        }
    }

    /// Forward pending entries once; returns how many were delivered.
    pub async fn forward_once(&mut self) -> usize {
        let entries = match self.kernel.activity(&ActivityQuery {
            limit: FORWARD_BATCH,
            ..Default::default()
        }) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "webhook forwarder failed to read activity");
                return 0;
            }
        };

        // Newest-first from the store; deliver oldest-first.
        let threshold = self.last_id;
        let mut delivered = 0;
        for entry in entries.iter().rev().filter(|e| e.id > threshold) {
            self.last_id = self.last_id.max(entry.id);
            if !self.deliverer.wants(&entry.action) {
                continue;
            }
            let event = WebhookEvent::from(entry);
            match self.deliverer.deliver(&event).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    // The deliverer owns retries; we move on.
                    debug!(action = %event.action, error = %e, "webhook delivery failed");
                }
            }
        }
        delivered
    }

    /// Poll until `shutdown` fires.
    pub async fn run(mut self, shutdown: Arc<Notify>) {
        let mut interval = tokio::time::interval(FORWARD_INTERVAL);
        interval.tick().await;
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.forward_once().await;
                }
                _ = shutdown.notified() => return,
            }
        }
    }
}

fn newest_activity_id(kernel: &SystemKernel) -> i64 {
    kernel
        .activity(&ActivityQuery {
            limit: 1,
            ..Default::default()
        })
        .ok()
        .and_then(|entries| entries.first().map(|e| e.id))
        .unwrap_or(0)
}

#[cfg(test)]
#[path = "collaborators_tests.rs"]
mod tests;
