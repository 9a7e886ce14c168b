//! Human-readable rendering of ledger results.
//!
//! Pure functions from structured results to the text placed in a tool
//! call's content block. Nothing here reads the ledger.

use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::ledger::query::{
    ContextBody, FeatureLookup, MemoryStatus, NamedFeature, ProjectContext,
};
use crate::ledger::types::{Activity, AgentState, Delegation, TaskProgress};
use crate::ledger::FeatureUpdate;

const NONE: &str = "None";

fn clock(ts: &DateTime<Utc>) -> String {
    ts.format("%H:%M:%S").to_string()
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        NONE.to_string()
    } else {
        items.join(", ")
    }
}

fn activity_line(out: &mut String, activity: &Activity) {
    let _ = writeln!(
        out,
        "├── [{}] {}: {} - {}",
        clock(&activity.timestamp),
        activity.agent,
        activity.action,
        activity.task
    );
}

fn delegation_line(out: &mut String, delegation: &Delegation) {
    let _ = writeln!(
        out,
        "├── [{}] {} → {}: {}",
        clock(&delegation.timestamp),
        delegation.from_agent,
        delegation.to_agent,
        delegation.task_description
    );
}

pub fn activity_logged(activity: &Activity) -> String {
    format!(
        "✅ Activity logged: {} {}\n📝 Task: {}\n⏰ Time: {}\n🆔 ID: {}",
        activity.agent,
        activity.action,
        activity.task,
        activity.timestamp.to_rfc3339(),
        activity.id
    )
}

pub fn delegation_logged(delegation: &Delegation) -> String {
    format!(
        "🔄 Task delegated: {} → {}\n📋 Type: {}\n📝 Task: {}\n⏱️ Expected: {}\n🔥 Priority: {}\n🆔 ID: {}",
        delegation.from_agent,
        delegation.to_agent,
        delegation.task_type,
        delegation.task_description,
        delegation.expected_duration,
        delegation.priority,
        delegation.id
    )
}

pub fn progress_tracked(task: &TaskProgress) -> String {
    let notes = if task.notes.is_empty() {
        NONE
    } else {
        task.notes.as_str()
    };
    format!(
        "📊 Progress updated: {}\n🎯 Status: {} ({}%)\n🤖 Agent: {}\n📝 Notes: {}",
        task.id, task.status, task.progress, task.agent, notes
    )
}

pub fn feature_updated(update: &FeatureUpdate) -> String {
    let snapshot = &update.snapshot;
    format!(
        "🎯 Feature: {}\n📍 Phase: {}\n🤖 Active agents: {}\n✅ Completed: {} tasks\n🚫 Blockers: {}\n📊 Progress: {}%",
        update.feature_name,
        snapshot.phase,
        join_or_none(&snapshot.active_agents),
        snapshot.completed_tasks.len(),
        snapshot.blockers.len(),
        snapshot.completion_rate
    )
}

pub fn memory_status(status: &MemoryStatus) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "🧠 AppIQ Memory Status (Project: {}):", status.project_id);
    let _ = writeln!(out, "📊 Total activities: {}", status.total_activities);
    let _ = writeln!(out, "🔄 Total delegations: {}", status.total_delegations);
    let _ = writeln!(
        out,
        "🤖 Active agents: {} ({})",
        status.active_agents.len(),
        join_or_none(&status.active_agents)
    );
    let _ = writeln!(
        out,
        "🎯 Active features: {} ({})",
        status.active_features.len(),
        join_or_none(&status.active_features)
    );
    let _ = writeln!(out, "📋 Active tasks: {}", status.active_tasks.len());
    let _ = write!(out, "⏰ Last updated: {}", status.last_updated.to_rfc3339());

    if let Some(details) = &status.agent_details {
        out.push_str("\n\n🤖 AGENT DETAILS:\n");
        for agent in details {
            let _ = write!(out, "├── {}: {}", agent.name, agent.status);
            if let Some(task) = &agent.current_task {
                let _ = write!(out, " ({})", task);
            }
            out.push('\n');
        }
    }

    if let Some(activities) = &status.recent_activities {
        let _ = writeln!(out, "\n\n📜 RECENT ACTIVITIES (last {}):", activities.len());
        for activity in activities {
            activity_line(&mut out, activity);
        }
    }

    out
}

pub fn project_context(context: &ProjectContext) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "📚 FULL CONTEXT for {} (Type: {}):\n",
        context.requesting_agent.as_deref().unwrap_or("Agent"),
        context.context_type
    );

    match &context.body {
        ContextBody::Recent {
            delegations,
            activities,
            features,
        } => {
            render_delegations(&mut out, "🔄 RECENT DELEGATIONS:", delegations);
            render_activities(&mut out, "📝 RECENT ACTIVITIES:", activities);
            render_features(&mut out, features);
        }
        ContextBody::Feature { lookup } => render_lookup(&mut out, lookup),
        ContextBody::Agent {
            agent,
            state,
            delegations,
            activities,
        } => {
            render_agent_state(&mut out, agent, state.as_ref());
            render_delegations(&mut out, "🔄 DELEGATIONS:", delegations);
            render_activities(&mut out, "📝 ACTIVITIES:", activities);
        }
    }

    out
}

fn render_delegations(out: &mut String, heading: &str, delegations: &[Delegation]) {
    if delegations.is_empty() {
        return;
    }
    let _ = writeln!(out, "{}", heading);
    for delegation in delegations {
        delegation_line(out, delegation);
    }
    out.push('\n');
}

fn render_activities(out: &mut String, heading: &str, activities: &[Activity]) {
    if activities.is_empty() {
        return;
    }
    let _ = writeln!(out, "{}", heading);
    for activity in activities {
        activity_line(out, activity);
    }
    out.push('\n');
}

fn render_features(out: &mut String, features: &[NamedFeature]) {
    if features.is_empty() {
        return;
    }
    out.push_str("🎯 ACTIVE FEATURES:\n");
    for feature in features {
        let _ = writeln!(
            out,
            "├── {}: {} ({}%)",
            feature.name, feature.snapshot.phase, feature.snapshot.completion_rate
        );
        if !feature.snapshot.active_agents.is_empty() {
            let _ = writeln!(out, "│   └── Active: {}", feature.snapshot.active_agents.join(", "));
        }
    }
}

fn render_lookup(out: &mut String, lookup: &FeatureLookup) {
    match lookup {
        FeatureLookup::Found {
            feature_name,
            snapshot,
        } => {
            let _ = writeln!(out, "🎯 FEATURE: {}", feature_name);
            let _ = writeln!(out, "├── Phase: {}", snapshot.phase);
            let _ = writeln!(out, "├── Progress: {}%", snapshot.completion_rate);
            let _ = writeln!(out, "├── Active agents: {}", join_or_none(&snapshot.active_agents));
            let _ = writeln!(out, "├── Completed tasks: {}", snapshot.completed_tasks.len());
            let _ = writeln!(out, "└── Blockers: {}", snapshot.blockers.len());
        }
        FeatureLookup::NotFound { feature_name } => {
            let _ = writeln!(out, "❌ Feature '{}' not found in memory.", feature_name);
        }
        FeatureLookup::NotRequested => {
            out.push_str("❌ No feature name given for feature-specific context.\n");
        }
    }
}

fn render_agent_state(out: &mut String, agent: &str, state: Option<&AgentState>) {
    let Some(state) = state else {
        let _ = writeln!(out, "🤖 AGENT: {} (no recorded activity)\n", agent);
        return;
    };
    let _ = writeln!(out, "🤖 AGENT: {}", agent);
    let _ = writeln!(out, "├── Status: {}", state.status);
    let _ = writeln!(
        out,
        "├── Current task: {}",
        state.current_task.as_deref().unwrap_or(NONE)
    );
    if let Some(action) = state.last_action {
        let _ = writeln!(out, "├── Last action: {}", action);
    }
    let _ = writeln!(out, "└── Activities logged: {}\n", state.activity_ids.len());
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
