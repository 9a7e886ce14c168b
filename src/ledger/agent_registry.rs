//! Per-agent derived status.
//!
//! Every agent that has logged at least one activity has an [`AgentState`].
//! Status is re-derived from the single most recent action on every write:
//! `completed` makes the agent idle and clears its task, anything else makes
//! it active on the reported task. `failed` has no state of its own; it is
//! only visible through [`AgentState::last_action`].

use chrono::{DateTime, Utc};

use super::ordered::InsertionOrdered;
use super::types::{Action, AgentState, AgentStatus};

/// Registry of agent states keyed by agent name, in order of first activity.
#[derive(Debug, Clone, Default)]
pub struct AgentRegistry {
    agents: InsertionOrdered<AgentState>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one activity into the agent's state, creating it on first sight.
    pub fn record_activity(
        &mut self,
        agent: &str,
        activity_id: &str,
        action: Action,
        task: &str,
        timestamp: DateTime<Utc>,
    ) -> &AgentState {
        let state = self.agents.get_or_insert_with(agent, AgentState::default);
        state.activity_ids.push(activity_id.to_string());
        state.last_activity = Some(timestamp);
        state.last_action = Some(action);
        if action == Action::Completed {
            state.status = AgentStatus::Idle;
            state.current_task = None;
        } else {
            state.status = AgentStatus::Active;
            state.current_task = Some(task.to_string());
        }
        state
    }

    pub fn get(&self, agent: &str) -> Option<&AgentState> {
        self.agents.get(agent)
    }

    /// All agents, in order of first activity.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AgentState)> {
        self.agents.iter()
    }

    /// Names of agents in the given status.
    pub fn by_status(&self, status: AgentStatus) -> Vec<String> {
        self.agents
            .iter()
            .filter(|(_, state)| state.status == status)
            .map(|(name, _)| name.to_string())
            .collect()
    }

    pub fn active_agents(&self) -> Vec<String> {
        self.by_status(AgentStatus::Active)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
