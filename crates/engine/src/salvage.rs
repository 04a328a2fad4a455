// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The resurrection queue: salvage handoff for dead agents' sessions.

use harbor_core::{
    AgentRecord, Clock, IdGen, Identity, KernelError, ResurrectionEntry, SalvageState,
    SessionSnapshot,
};
use tracing::info;

use crate::kernel::Kernel;

impl<C: Clock, I: IdGen> Kernel<C, I> {
    /// Pending entries, optionally scoped to a project.
    pub fn salvage_pending(
        &self,
        project: Option<&str>,
    ) -> Result<Vec<ResurrectionEntry>, KernelError> {
        Ok(self
            .store()
            .list_resurrections(Some(SalvageState::Pending), project)?)
    }

    /// Entries in any state, with optional filters.
    pub fn salvage_list(
        &self,
        state: Option<SalvageState>,
        project: Option<&str>,
    ) -> Result<Vec<ResurrectionEntry>, KernelError> {
        Ok(self.store().list_resurrections(state, project)?)
    }

    /// Claim a pending entry for `by_agent`.
    pub fn salvage_claim(
        &self,
        entry_id: i64,
        by_agent: &str,
    ) -> Result<ResurrectionEntry, KernelError> {
        if by_agent.is_empty() {
            return Err(KernelError::validation("claiming agent must not be empty"));
        }
        self.salvage_transition(entry_id, SalvageState::Claimed, Some(by_agent))
    }

    /// Apply a one-way state transition to an entry.
    pub fn salvage_transition(
        &self,
        entry_id: i64,
        to: SalvageState,
        by_agent: Option<&str>,
    ) -> Result<ResurrectionEntry, KernelError> {
        let entry = self
            .store()
            .get_resurrection(entry_id)?
            .ok_or_else(|| KernelError::not_found("resurrection entry", entry_id.to_string()))?;

        if !entry.state.can_transition_to(to) {
            return Err(KernelError::conflict(format!(
                "resurrection entry {} is {} and cannot become {}",
                entry_id, entry.state, to
            )));
        }

        let now = self.now();
        self.store()
            .update_resurrection_state(entry_id, to, by_agent, now)?;
        info!(entry_id, from = %entry.state, to = %to, "salvage transition");
        self.record_activity(
            "salvage",
            to.as_str(),
            &entry_id.to_string(),
            Some(serde_json::json!({ "dead_agent": entry.dead_agent_id })),
            by_agent,
        );

        self.store()
            .get_resurrection(entry_id)?
            .ok_or_else(|| KernelError::transient("resurrection entry vanished mid-transition"))
    }

    /// Pending counts by project, for `salvage_hint`.
    pub fn salvage_counts(&self) -> Result<Vec<(String, i64)>, KernelError> {
        Ok(self.store().count_pending_by_project()?)
    }

    /// Create the resurrection entry for a freshly dead agent.
    ///
    /// Snapshots the agent's active sessions with their most recent notes.
    /// Returns `None` when the agent has no active sessions, or when this
    /// death already produced an entry (guarded by the final heartbeat).
    pub(crate) fn create_resurrection_for(
        &self,
        agent: &AgentRecord,
    ) -> Result<Option<i64>, KernelError> {
        let sessions = self.store().active_sessions_created_by(&agent.id)?;
        if sessions.is_empty() {
            return Ok(None);
        }
        if self
            .store()
            .resurrection_exists_since(&agent.id, agent.last_heartbeat)?
        {
            return Ok(None);
        }

        let notes_bound = self.config().salvage_notes_per_session;
        let snapshots = sessions
            .into_iter()
            .map(|session| {
                let notes = self
                    .store()
                    .recent_notes_for_session(&session.id, notes_bound)?;
                Ok(SessionSnapshot { session, notes })
            })
            .collect::<Result<Vec<_>, KernelError>>()?;

        let identity = agent_identity(agent);
        let now = self.now();
        let entry_id = self.store().insert_resurrection(
            &agent.id,
            identity.as_ref(),
            &snapshots,
            now,
        )?;
        info!(
            agent = %agent.id,
            entry_id,
            sessions = snapshots.len(),
            "resurrection entry created"
        );
        Ok(Some(entry_id))
    }
}

/// Rebuild the identity an agent registered with, if any.
fn agent_identity(agent: &AgentRecord) -> Option<Identity> {
    let mut s = agent.project.clone()?;
    if let Some(stack) = &agent.stack {
        s.push(':');
        s.push_str(stack);
        if let Some(context) = &agent.context {
            s.push(':');
            s.push_str(context);
        }
    }
    Identity::parse(&s).ok()
}

#[cfg(test)]
#[path = "salvage_tests.rs"]
mod tests;
