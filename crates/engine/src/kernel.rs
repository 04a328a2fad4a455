// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The kernel handle.
//!
//! One [`Kernel`] per process: one store, one subscriber registry, one set
//! of OS probes. Component operations live in the sibling modules as
//! `impl` blocks on this type.

use std::sync::Arc;
use std::time::Duration;

use harbor_core::{Clock, IdGen, SystemClock, UuidIdGen};
use harbor_storage::Store;
use tracing::warn;

use crate::config::KernelConfig;
use crate::metrics::Metrics;
use crate::probe::{
    PortProbe, PortScanCache, ProcessProbe, SystemPortProbe, SystemProcessProbe,
};
use crate::subscribers::SubscriberRegistry;

/// The coordination kernel.
pub struct Kernel<C: Clock = SystemClock, I: IdGen = UuidIdGen> {
    store: Arc<Store>,
    config: KernelConfig,
    clock: C,
    ids: I,
    metrics: Metrics,
    subscribers: Arc<SubscriberRegistry>,
    process_probe: Arc<dyn ProcessProbe>,
    port_scan: PortScanCache,
}

/// Kernel with production clock, ids, and probes.
pub type SystemKernel = Kernel<SystemClock, UuidIdGen>;

impl SystemKernel {
    /// Build a kernel with the system clock and real OS probes.
    pub fn system(store: Arc<Store>, config: KernelConfig) -> Self {
        Kernel::new(
            store,
            config,
            SystemClock,
            UuidIdGen,
            Arc::new(SystemProcessProbe),
            Arc::new(SystemPortProbe),
        )
    }
}

impl<C: Clock, I: IdGen> Kernel<C, I> {
    pub fn new(
        store: Arc<Store>,
        config: KernelConfig,
        clock: C,
        ids: I,
        process_probe: Arc<dyn ProcessProbe>,
        port_probe: Arc<dyn PortProbe>,
    ) -> Self {
        let metrics = Metrics::new();
        let subscribers = SubscriberRegistry::new(
            config.subscriber_queue_max,
            config.sse_per_source_max,
            metrics.clone(),
        );
        let port_scan = PortScanCache::new(
            port_probe,
            Duration::from_millis(config.port_scan_ttl_ms),
        );
        Self {
            store,
            config,
            clock,
            ids,
            metrics,
            subscribers,
            process_probe,
            port_scan,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn subscribers(&self) -> &Arc<SubscriberRegistry> {
        &self.subscribers
    }

    /// Current time in epoch milliseconds.
    pub fn now(&self) -> i64 {
        self.clock.epoch_ms()
    }

    pub(crate) fn next_id(&self) -> String {
        self.ids.next()
    }

    pub(crate) fn pid_alive(&self, pid: u32) -> bool {
        self.process_probe.is_alive(pid)
    }

    pub(crate) fn port_listening(&self, port: u16) -> bool {
        self.port_scan.is_listening(port)
    }

    /// Write one audit row. Failures are logged, never propagated: the
    /// mutation being audited has already committed.
    pub fn record_activity(
        &self,
        entry_type: &str,
        action: &str,
        target: &str,
        details: Option<serde_json::Value>,
        agent_id: Option<&str>,
    ) {
        let now = self.now();
        if let Err(e) = self.store.append_activity(
            entry_type,
            action,
            target,
            details.as_ref(),
            agent_id,
            now,
        ) {
            warn!(entry_type, action, target, error = %e, "activity write failed");
        }
    }
}
