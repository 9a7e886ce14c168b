//! The tool catalogue and argument decoding.
//!
//! Each tool maps to one ledger operation. Arguments are decoded with serde,
//! defaults are filled in here, and the enumerations are enforced before the
//! ledger is called.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use super::errors::McpError;
use super::types::Tool;
use crate::ledger::query::{DEFAULT_HISTORY_ACTIVITIES, MAX_HISTORY_ACTIVITIES};
use crate::ledger::types::{
    Action, AgentRole, ContextType, Phase, Priority, TaskStatus, TaskType,
};
use crate::ledger::{
    ActivityInput, ContextQuery, DelegationInput, FeatureInput, ProgressInput, StatusQuery,
    DEFAULT_DELEGATOR, DEFAULT_EXPECTED_DURATION,
};

// ============================================================================
// Tool names
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    LogAgentActivity,
    LogTaskDelegation,
    TrackTaskProgress,
    UpdateFeatureProgress,
    GetMemoryStatus,
    GetFullContext,
}

impl ToolName {
    pub const ALL: [ToolName; 6] = [
        ToolName::LogAgentActivity,
        ToolName::LogTaskDelegation,
        ToolName::TrackTaskProgress,
        ToolName::UpdateFeatureProgress,
        ToolName::GetMemoryStatus,
        ToolName::GetFullContext,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::LogAgentActivity => "log_agent_activity",
            ToolName::LogTaskDelegation => "log_task_delegation",
            ToolName::TrackTaskProgress => "track_task_progress",
            ToolName::UpdateFeatureProgress => "update_feature_progress",
            ToolName::GetMemoryStatus => "get_memory_status",
            ToolName::GetFullContext => "get_full_context",
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = McpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| McpError::unknown_tool(s))
    }
}

// ============================================================================
// Catalogue
// ============================================================================

/// Every tool with its input schema, in a stable order.
pub fn tool_catalogue() -> Vec<Tool> {
    vec![
        Tool {
            name: ToolName::LogAgentActivity.to_string(),
            description: "Log agent activity for complete transparency".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "agent": {
                        "type": "string",
                        "description": "Agent name",
                        "enum": AgentRole::wire_names(),
                    },
                    "action": {
                        "type": "string",
                        "description": "Action type",
                        "enum": Action::wire_names(),
                    },
                    "task": {
                        "type": "string",
                        "description": "Detailed task description",
                    },
                    "details": {
                        "type": "object",
                        "description": "Additional context and metadata",
                        "default": {},
                    },
                },
                "required": ["agent", "action", "task"],
            }),
        },
        Tool {
            name: ToolName::LogTaskDelegation.to_string(),
            description: "Log when feature-manager delegates tasks to other agents".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "fromAgent": {
                        "type": "string",
                        "description": "Agent delegating the task (usually feature-manager)",
                        "default": DEFAULT_DELEGATOR,
                    },
                    "toAgent": {
                        "type": "string",
                        "description": "Agent receiving the task",
                        "enum": AgentRole::delegation_targets(),
                    },
                    "taskType": {
                        "type": "string",
                        "description": "Type of task being delegated",
                        "enum": TaskType::wire_names(),
                    },
                    "taskDescription": {
                        "type": "string",
                        "description": "Detailed description of the delegated task",
                    },
                    "expectedDuration": {
                        "type": "string",
                        "description": "Expected completion time",
                        "default": DEFAULT_EXPECTED_DURATION,
                    },
                    "priority": {
                        "type": "string",
                        "description": "Task priority level",
                        "enum": Priority::wire_names(),
                        "default": Priority::default().as_str(),
                    },
                },
                "required": ["toAgent", "taskType", "taskDescription"],
            }),
        },
        Tool {
            name: ToolName::TrackTaskProgress.to_string(),
            description: "Track progress of specific tasks".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "taskId": {
                        "type": "string",
                        "description": "Unique task identifier (auto-generated if not provided)",
                    },
                    "status": {
                        "type": "string",
                        "description": "Current task status",
                        "enum": TaskStatus::wire_names(),
                    },
                    "progress": {
                        "type": "number",
                        "description": "Progress percentage (0-100)",
                        "minimum": 0,
                        "maximum": 100,
                        "default": 0,
                    },
                    "agent": {
                        "type": "string",
                        "description": "Agent handling the task",
                    },
                    "notes": {
                        "type": "string",
                        "description": "Additional progress notes",
                        "default": "",
                    },
                },
                "required": ["status", "agent"],
            }),
        },
        Tool {
            name: ToolName::UpdateFeatureProgress.to_string(),
            description: "Update overall feature development progress".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "featureName": {
                        "type": "string",
                        "description": "Name of the feature being developed",
                    },
                    "phase": {
                        "type": "string",
                        "description": "Current development phase",
                        "enum": Phase::wire_names(),
                    },
                    "activeAgents": string_list("Currently active agents working on this feature"),
                    "completedTasks": string_list("List of completed tasks"),
                    "blockers": string_list("Current blockers or issues"),
                },
                "required": ["featureName", "phase"],
            }),
        },
        Tool {
            name: ToolName::GetMemoryStatus.to_string(),
            description: "Get current memory system status and activity overview".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "includeHistory": {
                        "type": "boolean",
                        "description": "Include recent activity history",
                        "default": false,
                    },
                    "includeAgentDetails": {
                        "type": "boolean",
                        "description": "Include detailed agent activity",
                        "default": true,
                    },
                    "lastNActivities": {
                        "type": "number",
                        "description": "Number of recent activities to include",
                        "default": DEFAULT_HISTORY_ACTIVITIES,
                        "minimum": 1,
                        "maximum": MAX_HISTORY_ACTIVITIES,
                    },
                },
            }),
        },
        Tool {
            name: ToolName::GetFullContext.to_string(),
            description: "Get complete project context for agent coordination".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "requestingAgent": {
                        "type": "string",
                        "description": "Agent requesting the context",
                    },
                    "contextType": {
                        "type": "string",
                        "description": "Type of context needed",
                        "enum": ContextType::wire_names(),
                        "default": ContextType::default().as_str(),
                    },
                    "featureName": {
                        "type": "string",
                        "description": "Specific feature name (for feature-specific context)",
                    },
                },
            }),
        },
    ]
}

fn string_list(description: &str) -> Value {
    json!({
        "type": "array",
        "items": { "type": "string" },
        "description": description,
        "default": [],
    })
}

// ============================================================================
// Arguments
// ============================================================================

/// Decode tool arguments; a missing or `null` argument object counts as `{}`.
pub fn decode_args<T: DeserializeOwned>(tool: ToolName, arguments: Value) -> Result<T, McpError> {
    let arguments = if arguments.is_null() {
        Value::Object(Default::default())
    } else {
        arguments
    };
    serde_json::from_value(arguments)
        .map_err(|e| McpError::invalid_params(format!("{}: {}", tool, e)))
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}

fn default_delegator() -> String {
    DEFAULT_DELEGATOR.to_string()
}

fn default_expected_duration() -> String {
    DEFAULT_EXPECTED_DURATION.to_string()
}

fn default_true() -> bool {
    true
}

fn default_history() -> u64 {
    DEFAULT_HISTORY_ACTIVITIES as u64
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogActivityArgs {
    pub agent: AgentRole,
    pub action: Action,
    pub task: String,
    #[serde(default = "empty_object")]
    pub details: Value,
}

impl From<LogActivityArgs> for ActivityInput {
    fn from(args: LogActivityArgs) -> Self {
        ActivityInput::new(args.agent.as_str(), args.action, args.task).with_details(args.details)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogDelegationArgs {
    #[serde(default = "default_delegator")]
    pub from_agent: String,
    pub to_agent: AgentRole,
    pub task_type: TaskType,
    pub task_description: String,
    #[serde(default = "default_expected_duration")]
    pub expected_duration: String,
    #[serde(default)]
    pub priority: Priority,
}

impl LogDelegationArgs {
    pub fn validate(&self) -> Result<(), McpError> {
        if self.to_agent == AgentRole::FeatureManager {
            return Err(McpError::invalid_params(format!(
                "{}: toAgent cannot be {}",
                ToolName::LogTaskDelegation,
                AgentRole::FeatureManager
            )));
        }
        Ok(())
    }
}

impl From<LogDelegationArgs> for DelegationInput {
    fn from(args: LogDelegationArgs) -> Self {
        DelegationInput::new(args.to_agent.as_str(), args.task_type, args.task_description)
            .from_agent(args.from_agent)
            .with_expected_duration(args.expected_duration)
            .with_priority(args.priority)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackProgressArgs {
    #[serde(default)]
    pub task_id: Option<String>,
    pub status: TaskStatus,
    #[serde(default)]
    pub progress: f64,
    pub agent: String,
    #[serde(default)]
    pub notes: String,
}

impl TrackProgressArgs {
    pub fn validate(&self) -> Result<(), McpError> {
        if !(0.0..=100.0).contains(&self.progress) {
            return Err(McpError::invalid_params(format!(
                "{}: progress must be between 0 and 100, got {}",
                ToolName::TrackTaskProgress,
                self.progress
            )));
        }
        Ok(())
    }
}

impl From<TrackProgressArgs> for ProgressInput {
    fn from(args: TrackProgressArgs) -> Self {
        ProgressInput {
            task_id: args.task_id.filter(|id| !id.is_empty()),
            status: args.status,
            progress: args.progress,
            agent: args.agent,
            notes: args.notes,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFeatureArgs {
    pub feature_name: String,
    pub phase: Phase,
    #[serde(default)]
    pub active_agents: Vec<String>,
    #[serde(default)]
    pub completed_tasks: Vec<String>,
    #[serde(default)]
    pub blockers: Vec<String>,
}

impl From<UpdateFeatureArgs> for FeatureInput {
    fn from(args: UpdateFeatureArgs) -> Self {
        FeatureInput::new(args.feature_name, args.phase)
            .with_active_agents(args.active_agents)
            .with_completed_tasks(args.completed_tasks)
            .with_blockers(args.blockers)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryStatusArgs {
    #[serde(default)]
    pub include_history: bool,
    #[serde(default = "default_true")]
    pub include_agent_details: bool,
    #[serde(default = "default_history")]
    pub last_n_activities: u64,
}

impl MemoryStatusArgs {
    pub fn validate(&self) -> Result<(), McpError> {
        let max = MAX_HISTORY_ACTIVITIES as u64;
        if !(1..=max).contains(&self.last_n_activities) {
            return Err(McpError::invalid_params(format!(
                "{}: lastNActivities must be between 1 and {}, got {}",
                ToolName::GetMemoryStatus,
                max,
                self.last_n_activities
            )));
        }
        Ok(())
    }
}

impl From<MemoryStatusArgs> for StatusQuery {
    fn from(args: MemoryStatusArgs) -> Self {
        StatusQuery {
            include_history: args.include_history,
            include_agent_details: args.include_agent_details,
            last_n_activities: args.last_n_activities as usize,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullContextArgs {
    #[serde(default)]
    pub requesting_agent: Option<String>,
    #[serde(default)]
    pub context_type: ContextType,
    #[serde(default)]
    pub feature_name: Option<String>,
}

impl From<FullContextArgs> for ContextQuery {
    fn from(args: FullContextArgs) -> Self {
        ContextQuery {
            requesting_agent: args.requesting_agent,
            context_type: args.context_type,
            feature_name: args.feature_name,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
