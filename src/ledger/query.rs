//! Read-side aggregation over the ledger stores.
//!
//! Everything here borrows [`LedgerState`] immutably and produces owned,
//! serializable views. Rendering those views to text lives in
//! [`crate::report`].

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::types::{
    Action, Activity, AgentState, AgentStatus, ContextType, Delegation, FeatureSnapshot,
    TaskStatus,
};
use super::LedgerState;

/// Delegations included in a recent context view.
pub const RECENT_DELEGATIONS: usize = 10;
/// Activities included in a recent context view.
pub const RECENT_ACTIVITIES: usize = 15;
/// Upper bound for `last_n_activities` in a status query.
pub const MAX_HISTORY_ACTIVITIES: usize = 50;
/// Default for `last_n_activities`.
pub const DEFAULT_HISTORY_ACTIVITIES: usize = 10;

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusQuery {
    pub include_history: bool,
    pub include_agent_details: bool,
    /// Clamped to `[1, MAX_HISTORY_ACTIVITIES]`.
    pub last_n_activities: usize,
}

impl Default for StatusQuery {
    fn default() -> Self {
        Self {
            include_history: false,
            include_agent_details: true,
            last_n_activities: DEFAULT_HISTORY_ACTIVITIES,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextQuery {
    pub requesting_agent: Option<String>,
    pub context_type: ContextType,
    pub feature_name: Option<String>,
}

impl ContextQuery {
    pub fn new(context_type: ContextType) -> Self {
        Self {
            context_type,
            ..Self::default()
        }
    }

    pub fn requested_by(mut self, agent: impl Into<String>) -> Self {
        self.requesting_agent = Some(agent.into());
        self
    }

    pub fn for_feature(mut self, feature_name: impl Into<String>) -> Self {
        self.feature_name = Some(feature_name.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// One agent's entry in a status report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSummary {
    pub name: String,
    pub status: AgentStatus,
    pub current_task: Option<String>,
    pub last_activity: Option<DateTime<Utc>>,
    pub last_action: Option<Action>,
    pub activity_count: usize,
}

/// Result of a status query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryStatus {
    pub project_id: String,
    pub last_updated: DateTime<Utc>,
    pub total_activities: usize,
    pub total_delegations: usize,
    pub active_agents: Vec<String>,
    pub active_features: Vec<String>,
    /// Ids of tasks whose latest status is `in_progress`.
    pub active_tasks: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_details: Option<Vec<AgentSummary>>,
    /// Oldest to newest. Omitted when history was not requested or is empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recent_activities: Option<Vec<Activity>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedFeature {
    pub name: String,
    #[serde(flatten)]
    pub snapshot: FeatureSnapshot,
}

/// Outcome of a feature lookup. Absence is a normal result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum FeatureLookup {
    #[serde(rename_all = "camelCase")]
    Found {
        feature_name: String,
        snapshot: FeatureSnapshot,
    },
    #[serde(rename_all = "camelCase")]
    NotFound { feature_name: String },
    NotRequested,
}

impl FeatureLookup {
    pub fn is_found(&self) -> bool {
        matches!(self, FeatureLookup::Found { .. })
    }
}

/// The assembled part of a context view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "camelCase")]
pub enum ContextBody {
    /// Last delegations and activities plus every feature snapshot.
    Recent {
        delegations: Vec<Delegation>,
        activities: Vec<Activity>,
        features: Vec<NamedFeature>,
    },
    Feature { lookup: FeatureLookup },
    /// Activities and delegations involving one agent.
    Agent {
        agent: String,
        state: Option<AgentState>,
        delegations: Vec<Delegation>,
        activities: Vec<Activity>,
    },
}

/// Result of a context query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectContext {
    pub project_id: String,
    pub requesting_agent: Option<String>,
    pub context_type: ContextType,
    pub body: ContextBody,
}

// ---------------------------------------------------------------------------
// QueryEngine
// ---------------------------------------------------------------------------

/// Builds views from a borrowed, consistent ledger state.
pub struct QueryEngine<'a> {
    project_id: &'a str,
    state: &'a LedgerState,
}

impl<'a> QueryEngine<'a> {
    pub fn new(project_id: &'a str, state: &'a LedgerState) -> Self {
        Self { project_id, state }
    }

    pub fn memory_status(&self, query: &StatusQuery) -> MemoryStatus {
        let agent_details = query.include_agent_details.then(|| {
            self.state
                .agents
                .iter()
                .map(|(name, state)| AgentSummary {
                    name: name.to_string(),
                    status: state.status,
                    current_task: state.current_task.clone(),
                    last_activity: state.last_activity,
                    last_action: state.last_action,
                    activity_count: state.activity_ids.len(),
                })
                .collect()
        });

        let recent_activities = (query.include_history && self.state.events.activity_count() > 0)
            .then(|| {
                let n = query.last_n_activities.clamp(1, MAX_HISTORY_ACTIVITIES);
                self.state.events.recent_activities(n)
            });

        MemoryStatus {
            project_id: self.project_id.to_string(),
            last_updated: Utc::now(),
            total_activities: self.state.events.activity_count(),
            total_delegations: self.state.events.delegation_count(),
            active_agents: self.state.agents.active_agents(),
            active_features: self.state.features.names(),
            active_tasks: self.state.tasks.ids_with_status(TaskStatus::InProgress),
            agent_details,
            recent_activities,
        }
    }

    pub fn full_context(&self, query: &ContextQuery) -> ProjectContext {
        let body = match query.context_type {
            ContextType::Full | ContextType::Recent => self.recent_body(),
            ContextType::FeatureSpecific => ContextBody::Feature {
                lookup: self.feature_lookup(query.feature_name.as_deref()),
            },
            ContextType::AgentSpecific => match query.requesting_agent.as_deref() {
                Some(agent) => self.agent_body(agent),
                None => self.recent_body(),
            },
        };

        ProjectContext {
            project_id: self.project_id.to_string(),
            requesting_agent: query.requesting_agent.clone(),
            context_type: query.context_type,
            body,
        }
    }

    fn recent_body(&self) -> ContextBody {
        ContextBody::Recent {
            delegations: self.state.events.recent_delegations(RECENT_DELEGATIONS),
            activities: self.state.events.recent_activities(RECENT_ACTIVITIES),
            features: self
                .state
                .features
                .iter()
                .map(|(name, snapshot)| NamedFeature {
                    name: name.to_string(),
                    snapshot: snapshot.clone(),
                })
                .collect(),
        }
    }

    fn feature_lookup(&self, feature_name: Option<&str>) -> FeatureLookup {
        let Some(name) = feature_name else {
            return FeatureLookup::NotRequested;
        };
        match self.state.features.get(name) {
            Some(snapshot) => FeatureLookup::Found {
                feature_name: name.to_string(),
                snapshot: snapshot.clone(),
            },
            None => FeatureLookup::NotFound {
                feature_name: name.to_string(),
            },
        }
    }

    fn agent_body(&self, agent: &str) -> ContextBody {
        let delegations = last_n(
            self.state
                .events
                .delegations()
                .filter(|d| d.from_agent == agent || d.to_agent == agent),
            RECENT_DELEGATIONS,
        );
        let activities = last_n(
            self.state.events.activities().filter(|a| a.agent == agent),
            RECENT_ACTIVITIES,
        );

        ContextBody::Agent {
            agent: agent.to_string(),
            state: self.state.agents.get(agent).cloned(),
            delegations,
            activities,
        }
    }
}

/// The last `n` items of an oldest-first iterator, still oldest first.
fn last_n<'i, T: Clone + 'i>(items: impl DoubleEndedIterator<Item = &'i T>, n: usize) -> Vec<T> {
    let mut out: Vec<T> = items.rev().take(n).cloned().collect();
    out.reverse();
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
