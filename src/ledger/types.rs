//! Ledger record types and the enumerations that constrain them.
//!
//! Records serialize with camelCase field names so the structured result of a
//! tool call matches the shape agents already consume.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Defines a closed string enumeration with kebab/snake wire names,
/// `as_str`, `Display`, `FromStr` and an `ALL` list.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            /// Every accepted value, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The wire name of this value.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }

            /// Wire names of every accepted value (used in input schemas).
            pub fn wire_names() -> Vec<&'static str> {
                Self::ALL.iter().map(|v| v.as_str()).collect()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    other => Err(UnknownVariant {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

/// A string that is not one of an enumeration's accepted values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

wire_enum! {
    /// The cooperating agents known to the ledger.
    AgentRole {
        FeatureManager => "feature-manager",
        PoAgent => "po-agent",
        UiAgent => "ui-agent",
        CubitAgent => "cubit-agent",
        DataAgent => "data-agent",
        DomainAgent => "domain-agent",
        TestAgent => "test-agent",
        SecurityAgent => "security-agent",
    }
}

impl AgentRole {
    /// Agents that can receive a delegation (everyone but the manager).
    pub fn delegation_targets() -> Vec<&'static str> {
        Self::ALL
            .iter()
            .filter(|r| **r != AgentRole::FeatureManager)
            .map(|r| r.as_str())
            .collect()
    }
}

wire_enum! {
    /// What an agent reports it is doing.
    Action {
        Started => "started",
        Analyzing => "analyzing",
        Implementing => "implementing",
        Creating => "creating",
        Fixing => "fixing",
        Completed => "completed",
        Failed => "failed",
    }
}

wire_enum! {
    /// Category of a delegated task.
    TaskType {
        Requirements => "requirements",
        UiDesign => "ui-design",
        StateManagement => "state-management",
        DataLayer => "data-layer",
        BusinessLogic => "business-logic",
        Testing => "testing",
        Security => "security",
        BugFix => "bug-fix",
    }
}

wire_enum! {
    Priority {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

wire_enum! {
    /// Status of a tracked task.
    TaskStatus {
        Pending => "pending",
        InProgress => "in_progress",
        Completed => "completed",
        Failed => "failed",
        Blocked => "blocked",
    }
}

wire_enum! {
    /// Development phase of a feature.
    Phase {
        Analysis => "analysis",
        Planning => "planning",
        Implementation => "implementation",
        Testing => "testing",
        Integration => "integration",
        Completed => "completed",
    }
}

wire_enum! {
    /// Which view `get_full_context` assembles.
    ContextType {
        Full => "full",
        Recent => "recent",
        FeatureSpecific => "feature-specific",
        AgentSpecific => "agent-specific",
    }
}

impl Default for ContextType {
    fn default() -> Self {
        ContextType::Recent
    }
}

wire_enum! {
    /// Derived agent status. `Inactive` only exists before the first activity.
    AgentStatus {
        Active => "active",
        Idle => "idle",
        Inactive => "inactive",
    }
}

wire_enum! {
    /// Delegations are written once and never transition.
    DelegationStatus {
        Delegated => "delegated",
    }
}

// ---------------------------------------------------------------------------
// Ids
// ---------------------------------------------------------------------------

/// Build a record id of the form `<prefix>-<epoch millis>-<uuid>`.
///
/// The uuid makes ids unique within the process without a shared counter; the
/// prefix and timestamp keep them readable in logs.
pub fn generate_id(prefix: &str, timestamp: DateTime<Utc>) -> String {
    format!(
        "{}-{}-{}",
        prefix,
        timestamp.timestamp_millis(),
        Uuid::new_v4().simple()
    )
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One agent performing one action on one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub project_id: String,
    pub agent: String,
    pub action: Action,
    pub task: String,
    /// Free-form caller metadata, stored as given.
    pub details: Value,
}

/// One agent handing a task to another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delegation {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub project_id: String,
    pub from_agent: String,
    pub to_agent: String,
    pub task_type: TaskType,
    pub task_description: String,
    pub expected_duration: String,
    pub priority: Priority,
    pub status: DelegationStatus,
}

/// Latest progress report for a task id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskProgress {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub project_id: String,
    pub status: TaskStatus,
    /// Percentage in `[0, 100]`.
    pub progress: f64,
    pub agent: String,
    pub notes: String,
}

/// Latest snapshot of a feature's phase, agents and blockers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSnapshot {
    pub timestamp: DateTime<Utc>,
    pub project_id: String,
    pub phase: Phase,
    pub active_agents: Vec<String>,
    pub completed_tasks: Vec<String>,
    pub blockers: Vec<String>,
    pub total_agents: usize,
    /// Approximate progress, see [`completion_rate`].
    pub completion_rate: u32,
}

/// Heuristic feature progress: completed tasks relative to completed tasks
/// plus agents still working, as a rounded percentage.
///
/// This is a proxy, not task-weighted completion. No completed tasks always
/// yields 0.
pub fn completion_rate(completed_tasks: usize, active_agents: usize) -> u32 {
    if completed_tasks == 0 {
        return 0;
    }
    let denominator = (completed_tasks + active_agents) as f64;
    (100.0 * completed_tasks as f64 / denominator).round() as u32
}

/// Derived per-agent state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentState {
    /// Ids of every activity this agent logged. Ids may outlive the activity
    /// itself once it is evicted from the event store.
    pub activity_ids: Vec<String>,
    pub status: AgentStatus,
    pub last_activity: Option<DateTime<Utc>>,
    pub current_task: Option<String>,
    /// Most recent action, kept so a `failed` report stays visible.
    pub last_action: Option<Action>,
}

impl Default for AgentState {
    fn default() -> Self {
        Self {
            activity_ids: Vec::new(),
            status: AgentStatus::Inactive,
            last_activity: None,
            current_task: None,
            last_action: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
