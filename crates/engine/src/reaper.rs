// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The reaper: one periodic sweep driving every lifecycle transition.
//!
//! Each pass runs independently so a failure in one entity class never
//! blocks reclamation in another; the store keeps each pass atomic. Agent
//! transitions are detected against the previous sweep's derived states,
//! with a store-side guard so one death yields exactly one resurrection
//! entry even across daemon restarts.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use harbor_core::{AgentState, Clock, IdGen, KernelError, SystemClock, UuidIdGen};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::Notify;
use tracing::{debug, info, warn};

use crate::kernel::Kernel;

/// What one sweep reclaimed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepReport {
    pub stale_services: u64,
    pub expired_services: u64,
    pub expired_locks: u64,
    pub agents_marked_stale: u64,
    pub agents_marked_dead: u64,
    pub resurrections_created: u64,
    pub messages_pruned: u64,
    pub activity_pruned: u64,
}

/// Periodic background sweeper.
pub struct Reaper<C: Clock = SystemClock, I: IdGen = UuidIdGen> {
    kernel: Arc<Kernel<C, I>>,
    prev_states: Mutex<HashMap<String, AgentState>>,
}

impl<C: Clock, I: IdGen> Reaper<C, I> {
    pub fn new(kernel: Arc<Kernel<C, I>>) -> Self {
        Self {
            kernel,
            prev_states: Mutex::new(HashMap::new()),
        }
    }

    /// Run sweeps on the configured period until `shutdown` fires.
    pub async fn run(self: Arc<Self>, shutdown: Arc<Notify>) {
        let period = Duration::from_millis(self.kernel.config().reaper_period_ms);
        let mut interval = tokio::time::interval(period);
        // The first tick fires immediately; skip it so startup stays quick.
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let report = self.sweep();
                    debug!(?report, "reaper sweep complete");
                }
                _ = shutdown.notified() => {
                    info!("reaper stopping");
                    return;
                }
            }
        }
    }

    /// One full sweep. Pass failures are logged and skipped, never fatal.
    pub fn sweep(&self) -> SweepReport {
        let mut report = SweepReport::default();

        match self.sweep_stale_pid_services() {
            Ok(n) => report.stale_services = n,
            Err(e) => warn!(error = %e, "stale-service pass failed"),
        }
        match self.kernel.store().delete_expired_locks(self.kernel.now()) {
            Ok(n) => report.expired_locks = n,
            Err(e) => warn!(error = %e, "expired-lock pass failed"),
        }
        match self
            .kernel
            .store()
            .delete_expired_services(self.kernel.now())
        {
            Ok(n) => report.expired_services = n,
            Err(e) => warn!(error = %e, "expired-service pass failed"),
        }
        match self.sweep_agents() {
            Ok((stale, dead, resurrected)) => {
                report.agents_marked_stale = stale;
                report.agents_marked_dead = dead;
                report.resurrections_created = resurrected;
            }
            Err(e) => warn!(error = %e, "agent pass failed"),
        }
        match self.sweep_message_retention() {
            Ok(n) => report.messages_pruned = n,
            Err(e) => warn!(error = %e, "message-retention pass failed"),
        }
        match self.sweep_activity_retention() {
            Ok(n) => report.activity_pruned = n,
            Err(e) => warn!(error = %e, "activity-retention pass failed"),
        }

        self.kernel.metrics().record_sweep(&report);
        report
    }

    /// Drop service rows whose owning pid is gone.
    fn sweep_stale_pid_services(&self) -> Result<u64, KernelError> {
        let mut dropped = 0;
        for (identity, pid) in self.kernel.store().list_service_pids()? {
            if !self.kernel.pid_alive(pid) {
                debug!(identity = %identity, pid, "reaping service with dead pid");
                dropped += u64::from(self.kernel.store().delete_service(&identity)?);
            }
        }
        Ok(dropped)
    }

    /// Re-derive agent states and handle transitions.
    fn sweep_agents(&self) -> Result<(u64, u64, u64), KernelError> {
        let now = self.kernel.now();
        let thresholds = self.kernel.config().staleness;
        let agents = self.kernel.store().list_agents(None)?;

        let mut marked_stale = 0;
        let mut marked_dead = 0;
        let mut resurrected = 0;
        let mut next_states = HashMap::with_capacity(agents.len());
        let prev_states = {
            let guard = self.prev_states.lock();
            guard.clone()
        };

        for agent in &agents {
            let state = agent.state(now, &thresholds);
            let prev = prev_states.get(&agent.id).copied();
            next_states.insert(agent.id.clone(), state);

            match state {
                AgentState::Stale if prev != Some(AgentState::Stale) => {
                    marked_stale += 1;
                    self.kernel.record_activity(
                        "agent",
                        "agent.stale",
                        &agent.id,
                        None,
                        Some(&agent.id),
                    );
                }
                AgentState::Dead if prev != Some(AgentState::Dead) => {
                    marked_dead += 1;
                    self.kernel.record_activity(
                        "agent",
                        "agent.dead",
                        &agent.id,
                        None,
                        Some(&agent.id),
                    );
                    if self.kernel.create_resurrection_for(agent)?.is_some() {
                        resurrected += 1;
                    }
                }
                _ => {}
            }
        }

        *self.prev_states.lock() = next_states;
        Ok((marked_stale, marked_dead, resurrected))
    }

    fn sweep_message_retention(&self) -> Result<u64, KernelError> {
        let config = self.kernel.config();
        let cutoff = self
            .kernel
            .now()
            .saturating_sub(config.message_retention_age_ms);
        Ok(self
            .kernel
            .store()
            .prune_messages(cutoff, config.message_retention_count)?)
    }

    fn sweep_activity_retention(&self) -> Result<u64, KernelError> {
        let config = self.kernel.config();
        let cutoff = self
            .kernel
            .now()
            .saturating_sub(config.activity_retention_age_ms);
        Ok(self
            .kernel
            .store()
            .prune_activity(cutoff, config.activity_retention_rows)?)
    }
}

#[cfg(test)]
#[path = "reaper_tests.rs"]
mod tests;
