// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent registry: register, heartbeat, unregister, list.

use harbor_core::{
    AgentRecord, AgentState, Clock, IdGen, Identity, KernelError,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::kernel::Kernel;

/// Registration payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterAgent {
    pub agent_type: String,
    pub purpose: Option<String>,
    /// Identity prefix the agent is working under.
    pub identity: Option<Identity>,
    pub worktree_id: Option<String>,
}

/// Outcome of a registration.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterResult {
    pub agent: AgentRecord,
    /// Pending resurrection entries for this agent's project, so callers
    /// can offer salvage right away.
    pub salvage_hint: i64,
}

/// An agent row with its derived state.
#[derive(Debug, Clone, Serialize)]
pub struct AgentWithState {
    #[serde(flatten)]
    pub agent: AgentRecord,
    pub state: AgentState,
}

impl<C: Clock, I: IdGen> Kernel<C, I> {
    /// Upsert an agent registration; refreshes the heartbeat.
    pub fn register_agent(
        &self,
        id: &str,
        registration: &RegisterAgent,
    ) -> Result<RegisterResult, KernelError> {
        validate_agent_id(id)?;
        if registration.agent_type.is_empty() {
            return Err(KernelError::validation("agent type must not be empty"));
        }

        let now = self.now();
        let (project, stack, context) = match &registration.identity {
            Some(identity) => AgentRecord::identity_parts(identity),
            None => (None, None, None),
        };

        let record = AgentRecord {
            id: id.to_string(),
            agent_type: registration.agent_type.clone(),
            purpose: registration.purpose.clone(),
            project: project.clone(),
            stack,
            context,
            worktree_id: registration.worktree_id.clone(),
            registered_at: now,
            last_heartbeat: now,
        };
        self.store().upsert_agent(&record)?;

        // The upsert keeps the original registered_at; read the row back so
        // the caller sees what is actually stored.
        let agent = self
            .store()
            .get_agent(id)?
            .ok_or_else(|| KernelError::transient("agent row vanished during register"))?;

        let salvage_hint = match &project {
            Some(p) => self
                .store()
                .count_pending_by_project()?
                .into_iter()
                .find(|(project, _)| project == p)
                .map_or(0, |(_, count)| count),
            None => 0,
        };

        info!(id, agent_type = %registration.agent_type, salvage_hint, "agent registered");
        self.record_activity("agent", "register", id, None, Some(id));

        Ok(RegisterResult {
            agent,
            salvage_hint,
        })
    }

    /// Refresh an agent's heartbeat; unknown ids are an error.
    pub fn heartbeat(&self, id: &str) -> Result<(), KernelError> {
        if !self.store().touch_agent(id, self.now())? {
            return Err(KernelError::not_found("agent", id));
        }
        Ok(())
    }

    /// Remove an agent row. Sessions the agent created are left untouched:
    /// a deliberate unregister is a clean exit, not a death.
    pub fn unregister_agent(&self, id: &str) -> Result<(), KernelError> {
        if !self.store().delete_agent(id)? {
            return Err(KernelError::not_found("agent", id));
        }
        info!(id, "agent unregistered");
        self.record_activity("agent", "unregister", id, None, Some(id));
        Ok(())
    }

    /// List agents with derived state, optionally filtered.
    pub fn agents(
        &self,
        project: Option<&str>,
        state: Option<AgentState>,
    ) -> Result<Vec<AgentWithState>, KernelError> {
        let now = self.now();
        let thresholds = &self.config().staleness;
        Ok(self
            .store()
            .list_agents(project)?
            .into_iter()
            .map(|agent| {
                let derived = agent.state(now, thresholds);
                AgentWithState {
                    agent,
                    state: derived,
                }
            })
            .filter(|a| state.is_none_or(|s| a.state == s))
            .collect())
    }

    /// Fetch one agent with derived state.
    pub fn agent(&self, id: &str) -> Result<AgentWithState, KernelError> {
        let agent = self
            .store()
            .get_agent(id)?
            .ok_or_else(|| KernelError::not_found("agent", id))?;
        let state = agent.state(self.now(), &self.config().staleness);
        Ok(AgentWithState { agent, state })
    }
}

fn validate_agent_id(id: &str) -> Result<(), KernelError> {
    if id.is_empty() || id.len() > 128 {
        return Err(KernelError::validation("agent id must be 1-128 characters"));
    }
    let ok = id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ':'));
    if !ok {
        return Err(KernelError::validation(format!(
            "agent id '{}' contains invalid characters",
            id
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "agents_tests.rs"]
mod tests;
