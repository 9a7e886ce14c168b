//! The coordination ledger.
//!
//! [`Ledger`] owns the four stores behind one lock. Each write operation takes
//! the write half, applies every sub-step, and releases, so readers never see
//! an activity without the agent state it implies. Reads go through
//! [`QueryEngine`] on a shared guard and never mutate.
//!
//! # Example
//!
//! ```
//! use appiq_memory::config::LedgerConfig;
//! use appiq_memory::ledger::{ActivityInput, Ledger, StatusQuery};
//! use appiq_memory::ledger::types::Action;
//!
//! let ledger = Ledger::new(LedgerConfig::new("my-app"));
//! ledger.log_agent_activity(ActivityInput::new("ui-agent", Action::Started, "build form"));
//!
//! let status = ledger.memory_status(&StatusQuery::default());
//! assert_eq!(status.total_activities, 1);
//! assert_eq!(status.active_agents, vec!["ui-agent".to_string()]);
//! ```

pub mod agent_registry;
pub mod event_store;
pub mod feature_table;
mod ordered;
pub mod query;
pub mod task_table;
pub mod types;

use chrono::Utc;
use parking_lot::RwLock;
use serde_json::Value;
use thiserror::Error;

use crate::config::LedgerConfig;

pub use agent_registry::AgentRegistry;
pub use event_store::EventStore;
pub use feature_table::FeatureTable;
pub use query::{ContextQuery, MemoryStatus, ProjectContext, QueryEngine, StatusQuery};
pub use task_table::TaskTable;

use types::{
    completion_rate, generate_id, Action, Activity, Delegation, DelegationStatus,
    FeatureSnapshot, Phase, Priority, TaskProgress, TaskStatus, TaskType,
};

/// Default sender of a delegation.
pub const DEFAULT_DELEGATOR: &str = "feature-manager";
/// Default expected duration of a delegation.
pub const DEFAULT_EXPECTED_DURATION: &str = "Unknown";

/// Caller-contract violations detected by the ledger itself.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LedgerError {
    /// Progress must lie in `[0, 100]`; it is never clamped.
    #[error("progress must be between 0 and 100, got {0}")]
    ProgressOutOfRange(f64),
}

// ---------------------------------------------------------------------------
// Operation inputs
// ---------------------------------------------------------------------------

/// Input of [`Ledger::log_agent_activity`].
#[derive(Debug, Clone)]
pub struct ActivityInput {
    pub agent: String,
    pub action: Action,
    pub task: String,
    pub details: Value,
}

impl ActivityInput {
    pub fn new(agent: impl Into<String>, action: Action, task: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            action,
            task: task.into(),
            details: Value::Object(Default::default()),
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }
}

/// Input of [`Ledger::log_task_delegation`].
#[derive(Debug, Clone)]
pub struct DelegationInput {
    pub from_agent: String,
    pub to_agent: String,
    pub task_type: TaskType,
    pub task_description: String,
    pub expected_duration: String,
    pub priority: Priority,
}

impl DelegationInput {
    pub fn new(
        to_agent: impl Into<String>,
        task_type: TaskType,
        task_description: impl Into<String>,
    ) -> Self {
        Self {
            from_agent: DEFAULT_DELEGATOR.to_string(),
            to_agent: to_agent.into(),
            task_type,
            task_description: task_description.into(),
            expected_duration: DEFAULT_EXPECTED_DURATION.to_string(),
            priority: Priority::default(),
        }
    }

    pub fn from_agent(mut self, from_agent: impl Into<String>) -> Self {
        self.from_agent = from_agent.into();
        self
    }

    pub fn with_expected_duration(mut self, expected_duration: impl Into<String>) -> Self {
        self.expected_duration = expected_duration.into();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

/// Input of [`Ledger::track_task_progress`].
#[derive(Debug, Clone)]
pub struct ProgressInput {
    /// Generated when absent.
    pub task_id: Option<String>,
    pub status: TaskStatus,
    pub progress: f64,
    pub agent: String,
    pub notes: String,
}

impl ProgressInput {
    pub fn new(status: TaskStatus, agent: impl Into<String>) -> Self {
        Self {
            task_id: None,
            status,
            progress: 0.0,
            agent: agent.into(),
            notes: String::new(),
        }
    }

    pub fn with_task_id(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = Some(task_id.into());
        self
    }

    pub fn with_progress(mut self, progress: f64) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}

/// Input of [`Ledger::update_feature_progress`].
#[derive(Debug, Clone)]
pub struct FeatureInput {
    pub feature_name: String,
    pub phase: Phase,
    pub active_agents: Vec<String>,
    pub completed_tasks: Vec<String>,
    pub blockers: Vec<String>,
}

impl FeatureInput {
    pub fn new(feature_name: impl Into<String>, phase: Phase) -> Self {
        Self {
            feature_name: feature_name.into(),
            phase,
            active_agents: Vec::new(),
            completed_tasks: Vec::new(),
            blockers: Vec::new(),
        }
    }

    pub fn with_active_agents(mut self, agents: Vec<String>) -> Self {
        self.active_agents = agents;
        self
    }

    pub fn with_completed_tasks(mut self, tasks: Vec<String>) -> Self {
        self.completed_tasks = tasks;
        self
    }

    pub fn with_blockers(mut self, blockers: Vec<String>) -> Self {
        self.blockers = blockers;
        self
    }
}

/// Result of [`Ledger::update_feature_progress`].
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureUpdate {
    pub feature_name: String,
    #[serde(flatten)]
    pub snapshot: FeatureSnapshot,
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// The four stores, guarded together.
#[derive(Debug, Clone)]
pub struct LedgerState {
    pub events: EventStore,
    pub agents: AgentRegistry,
    pub tasks: TaskTable,
    pub features: FeatureTable,
}

impl LedgerState {
    fn new(config: &LedgerConfig) -> Self {
        Self {
            events: EventStore::new(config.activity_cap, config.delegation_cap),
            agents: AgentRegistry::new(),
            tasks: TaskTable::new(),
            features: FeatureTable::new(),
        }
    }
}

/// In-process coordination ledger. Share it as `Arc<Ledger>`.
#[derive(Debug)]
pub struct Ledger {
    config: LedgerConfig,
    state: RwLock<LedgerState>,
}

impl Ledger {
    pub fn new(config: LedgerConfig) -> Self {
        let state = RwLock::new(LedgerState::new(&config));
        Self { config, state }
    }

    pub fn project_id(&self) -> &str {
        &self.config.project_id
    }

    /// Record an activity and fold it into the agent's state.
    pub fn log_agent_activity(&self, input: ActivityInput) -> Activity {
        let timestamp = Utc::now();
        let activity = Activity {
            id: generate_id(&input.agent, timestamp),
            timestamp,
            project_id: self.config.project_id.clone(),
            agent: input.agent,
            action: input.action,
            task: input.task,
            details: input.details,
        };

        let mut state = self.state.write();
        state.events.append_activity(activity.clone());
        state.agents.record_activity(
            &activity.agent,
            &activity.id,
            activity.action,
            &activity.task,
            timestamp,
        );
        drop(state);

        tracing::debug!(
            id = %activity.id,
            agent = %activity.agent,
            action = %activity.action,
            "activity logged"
        );
        activity
    }

    /// Record a delegation. Its status is always `delegated`.
    pub fn log_task_delegation(&self, input: DelegationInput) -> Delegation {
        let timestamp = Utc::now();
        let delegation = Delegation {
            id: generate_id("delegation", timestamp),
            timestamp,
            project_id: self.config.project_id.clone(),
            from_agent: input.from_agent,
            to_agent: input.to_agent,
            task_type: input.task_type,
            task_description: input.task_description,
            expected_duration: input.expected_duration,
            priority: input.priority,
            status: DelegationStatus::Delegated,
        };

        self.state.write().events.append_delegation(delegation.clone());

        tracing::debug!(
            id = %delegation.id,
            from = %delegation.from_agent,
            to = %delegation.to_agent,
            priority = %delegation.priority,
            "task delegated"
        );
        delegation
    }

    /// Replace the progress record of a task, generating an id if none is
    /// given.
    pub fn track_task_progress(&self, input: ProgressInput) -> Result<TaskProgress, LedgerError> {
        if !(0.0..=100.0).contains(&input.progress) {
            return Err(LedgerError::ProgressOutOfRange(input.progress));
        }

        let timestamp = Utc::now();
        let id = input
            .task_id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| generate_id("task", timestamp));
        let record = TaskProgress {
            id,
            timestamp,
            project_id: self.config.project_id.clone(),
            status: input.status,
            progress: input.progress,
            agent: input.agent,
            notes: input.notes,
        };

        self.state.write().tasks.upsert(record.clone());

        tracing::debug!(
            task_id = %record.id,
            status = %record.status,
            progress = record.progress,
            "task progress tracked"
        );
        Ok(record)
    }

    /// Replace a feature's snapshot and derive its completion rate.
    pub fn update_feature_progress(&self, input: FeatureInput) -> FeatureUpdate {
        let snapshot = FeatureSnapshot {
            timestamp: Utc::now(),
            project_id: self.config.project_id.clone(),
            phase: input.phase,
            total_agents: input.active_agents.len(),
            completion_rate: completion_rate(
                input.completed_tasks.len(),
                input.active_agents.len(),
            ),
            active_agents: input.active_agents,
            completed_tasks: input.completed_tasks,
            blockers: input.blockers,
        };

        self.state
            .write()
            .features
            .upsert(&input.feature_name, snapshot.clone());

        tracing::debug!(
            feature = %input.feature_name,
            phase = %snapshot.phase,
            completion_rate = snapshot.completion_rate,
            "feature progress updated"
        );
        FeatureUpdate {
            feature_name: input.feature_name,
            snapshot,
        }
    }

    /// Counts and active sets, optionally with agent details and history.
    pub fn memory_status(&self, query: &StatusQuery) -> MemoryStatus {
        let state = self.state.read();
        QueryEngine::new(&self.config.project_id, &state).memory_status(query)
    }

    /// Composite context view for a requesting agent.
    pub fn full_context(&self, query: &ContextQuery) -> ProjectContext {
        let state = self.state.read();
        QueryEngine::new(&self.config.project_id, &state).full_context(query)
    }

    /// Clone of the current stores, for audit and tests.
    pub fn snapshot(&self) -> LedgerState {
        self.state.read().clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::types::AgentStatus;
    use std::sync::Arc;

    fn ledger() -> Ledger {
        Ledger::new(LedgerConfig::new("flutter-app"))
    }

    #[test]
    fn test_log_agent_activity_stamps_project_and_updates_agent() {
        let ledger = ledger();
        let activity = ledger.log_agent_activity(
            ActivityInput::new("ui-agent", Action::Started, "build form")
                .with_details(serde_json::json!({"screen": "login"})),
        );

        assert_eq!(activity.project_id, "flutter-app");
        assert!(activity.id.starts_with("ui-agent-"));
        assert_eq!(activity.details["screen"], "login");

        let state = ledger.snapshot();
        assert_eq!(state.events.activity_count(), 1);
        let agent = state.agents.get("ui-agent").unwrap();
        assert_eq!(agent.activity_ids, vec![activity.id.clone()]);
        assert_eq!(agent.last_activity, Some(activity.timestamp));
    }

    #[test]
    fn test_status_derivation_follows_last_action() {
        let ledger = ledger();
        ledger.log_agent_activity(ActivityInput::new("cubit-agent", Action::Started, "auth cubit"));
        ledger.log_agent_activity(ActivityInput::new("cubit-agent", Action::Fixing, "state bug"));

        let state = ledger.snapshot();
        let agent = state.agents.get("cubit-agent").unwrap();
        assert_eq!(agent.status, AgentStatus::Active);
        assert_eq!(agent.current_task.as_deref(), Some("state bug"));

        ledger.log_agent_activity(ActivityInput::new("cubit-agent", Action::Completed, "state bug"));
        let state = ledger.snapshot();
        let agent = state.agents.get("cubit-agent").unwrap();
        assert_eq!(agent.status, AgentStatus::Idle);
        assert!(agent.current_task.is_none());
    }

    #[test]
    fn test_activity_retention_keeps_agent_history() {
        let ledger = ledger();
        for n in 0..105 {
            ledger.log_agent_activity(ActivityInput::new("data-agent", Action::Creating, format!("model {}", n)));
        }
        let state = ledger.snapshot();
        assert_eq!(state.events.activity_count(), 100);
        assert_eq!(state.events.activities().next().unwrap().task, "model 5");
        // Evicted ids remain as historical references.
        assert_eq!(state.agents.get("data-agent").unwrap().activity_ids.len(), 105);
    }

    #[test]
    fn test_custom_caps_from_config() {
        let ledger = Ledger::new(LedgerConfig::new("p").with_caps(3, 2));
        for n in 0..5 {
            ledger.log_task_delegation(DelegationInput::new("ui-agent", TaskType::UiDesign, format!("screen {}", n)));
        }
        assert_eq!(ledger.snapshot().events.delegation_count(), 2);
    }

    #[test]
    fn test_log_task_delegation_defaults() {
        let ledger = ledger();
        let delegation = ledger.log_task_delegation(DelegationInput::new(
            "security-agent",
            TaskType::Security,
            "audit token storage",
        ));

        assert_eq!(delegation.from_agent, "feature-manager");
        assert_eq!(delegation.expected_duration, "Unknown");
        assert_eq!(delegation.priority, Priority::Medium);
        assert_eq!(delegation.status, DelegationStatus::Delegated);
        assert!(delegation.id.starts_with("delegation-"));
    }

    #[test]
    fn test_track_task_progress_generates_id() {
        let ledger = ledger();
        let record = ledger
            .track_task_progress(ProgressInput::new(TaskStatus::Pending, "po-agent"))
            .unwrap();
        assert!(record.id.starts_with("task-"));
        assert_eq!(record.progress, 0.0);
        assert_eq!(ledger.snapshot().tasks.get(&record.id), Some(&record));
    }

    #[test]
    fn test_track_task_progress_empty_id_is_generated() {
        let ledger = ledger();
        let record = ledger
            .track_task_progress(ProgressInput::new(TaskStatus::Pending, "po-agent").with_task_id(""))
            .unwrap();
        assert!(record.id.starts_with("task-"));
    }

    #[test]
    fn test_track_task_progress_is_latest_wins() {
        let ledger = ledger();
        let input = ProgressInput::new(TaskStatus::InProgress, "ui-agent")
            .with_task_id("login-form")
            .with_progress(50.0)
            .with_notes("half way");
        ledger.track_task_progress(input.clone()).unwrap();
        let second = ledger.track_task_progress(input).unwrap();

        let state = ledger.snapshot();
        assert_eq!(state.tasks.len(), 1);
        assert_eq!(state.tasks.get("login-form"), Some(&second));
    }

    #[test]
    fn test_track_task_progress_rejects_out_of_range() {
        let ledger = ledger();
        let err = ledger
            .track_task_progress(ProgressInput::new(TaskStatus::InProgress, "ui-agent").with_progress(120.0))
            .unwrap_err();
        assert_eq!(err, LedgerError::ProgressOutOfRange(120.0));
        assert!(ledger.snapshot().tasks.is_empty());
    }

    #[test]
    fn test_update_feature_progress_completion_rate() {
        let ledger = ledger();
        let update = ledger.update_feature_progress(
            FeatureInput::new("X", Phase::Implementation)
                .with_active_agents(vec!["a".into(), "b".into()])
                .with_completed_tasks(vec!["t1".into()]),
        );
        assert_eq!(update.snapshot.completion_rate, 33);
        assert_eq!(update.snapshot.total_agents, 2);

        let update = ledger.update_feature_progress(
            FeatureInput::new("X", Phase::Implementation)
                .with_active_agents(vec!["a".into(), "b".into(), "c".into()]),
        );
        assert_eq!(update.snapshot.completion_rate, 0);
        assert_eq!(ledger.snapshot().features.names().len(), 1);
    }

    #[test]
    fn test_concurrent_writes_are_serialized() {
        let ledger = Arc::new(ledger());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let ledger = Arc::clone(&ledger);
                std::thread::spawn(move || {
                    for n in 0..10 {
                        ledger.log_agent_activity(ActivityInput::new(
                            format!("agent-{}", t),
                            Action::Implementing,
                            format!("step {}", n),
                        ));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let state = ledger.snapshot();
        assert_eq!(state.events.activity_count(), 80);
        let total_ids: usize = state.agents.iter().map(|(_, s)| s.activity_ids.len()).sum();
        assert_eq!(total_ids, 80);
    }

    #[test]
    fn test_reads_never_see_half_applied_activity() {
        let ledger = Arc::new(ledger());
        let writers: Vec<_> = (0..4)
            .map(|t| {
                let ledger = Arc::clone(&ledger);
                std::thread::spawn(move || {
                    for n in 0..20 {
                        ledger.log_agent_activity(ActivityInput::new(
                            format!("agent-{}", t),
                            Action::Fixing,
                            format!("case {}", n),
                        ));
                    }
                })
            })
            .collect();

        let reader = {
            let ledger = Arc::clone(&ledger);
            std::thread::spawn(move || loop {
                let status = ledger.memory_status(&StatusQuery::default());
                let per_agent: usize = status
                    .agent_details
                    .unwrap_or_default()
                    .iter()
                    .map(|a| a.activity_count)
                    .sum();
                assert_eq!(status.total_activities, per_agent);
                if status.total_activities == 80 {
                    break;
                }
            })
        };

        for writer in writers {
            writer.join().unwrap();
        }
        reader.join().unwrap();
    }
}
