//! Append-only activity and delegation logs with FIFO retention caps.

use std::collections::VecDeque;

use super::types::{Activity, Delegation};

/// Default number of activities retained.
pub const DEFAULT_ACTIVITY_CAP: usize = 100;
/// Default number of delegations retained.
pub const DEFAULT_DELEGATION_CAP: usize = 50;

/// Bounded, ordered (oldest first) sequences of activities and delegations.
#[derive(Debug, Clone)]
pub struct EventStore {
    activities: VecDeque<Activity>,
    delegations: VecDeque<Delegation>,
    activity_cap: usize,
    delegation_cap: usize,
}

impl Default for EventStore {
    fn default() -> Self {
        Self::new(DEFAULT_ACTIVITY_CAP, DEFAULT_DELEGATION_CAP)
    }
}

impl EventStore {
    /// Create a store with the given retention caps. A cap of zero is raised
    /// to one so the latest write is always observable.
    pub fn new(activity_cap: usize, delegation_cap: usize) -> Self {
        let activity_cap = activity_cap.max(1);
        let delegation_cap = delegation_cap.max(1);
        Self {
            activities: VecDeque::with_capacity(activity_cap),
            delegations: VecDeque::with_capacity(delegation_cap),
            activity_cap,
            delegation_cap,
        }
    }

    /// Append an activity, evicting the oldest entries past the cap.
    pub fn append_activity(&mut self, activity: Activity) {
        self.activities.push_back(activity);
        while self.activities.len() > self.activity_cap {
            self.activities.pop_front();
        }
    }

    /// Append a delegation, evicting the oldest entries past the cap.
    pub fn append_delegation(&mut self, delegation: Delegation) {
        self.delegations.push_back(delegation);
        while self.delegations.len() > self.delegation_cap {
            self.delegations.pop_front();
        }
    }

    pub fn activities(&self) -> impl DoubleEndedIterator<Item = &Activity> + ExactSizeIterator {
        self.activities.iter()
    }

    pub fn delegations(
        &self,
    ) -> impl DoubleEndedIterator<Item = &Delegation> + ExactSizeIterator {
        self.delegations.iter()
    }

    /// The last `n` activities, oldest to newest.
    pub fn recent_activities(&self, n: usize) -> Vec<Activity> {
        let start = self.activities.len().saturating_sub(n);
        self.activities.range(start..).cloned().collect()
    }

    /// The last `n` delegations, oldest to newest.
    pub fn recent_delegations(&self, n: usize) -> Vec<Delegation> {
        let start = self.delegations.len().saturating_sub(n);
        self.delegations.range(start..).cloned().collect()
    }

    pub fn activity_count(&self) -> usize {
        self.activities.len()
    }

    pub fn delegation_count(&self) -> usize {
        self.delegations.len()
    }

    pub fn activity_cap(&self) -> usize {
        self.activity_cap
    }

    pub fn delegation_cap(&self) -> usize {
        self.delegation_cap
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::types::{Action, DelegationStatus, Priority, TaskType};
    use chrono::Utc;

    fn activity(n: usize) -> Activity {
        Activity {
            id: format!("a{}", n),
            timestamp: Utc::now(),
            project_id: "p".into(),
            agent: "ui-agent".into(),
            action: Action::Started,
            task: format!("task {}", n),
            details: serde_json::json!({}),
        }
    }

    fn delegation(n: usize) -> Delegation {
        Delegation {
            id: format!("d{}", n),
            timestamp: Utc::now(),
            project_id: "p".into(),
            from_agent: "feature-manager".into(),
            to_agent: "ui-agent".into(),
            task_type: TaskType::UiDesign,
            task_description: format!("screen {}", n),
            expected_duration: "Unknown".into(),
            priority: Priority::Medium,
            status: DelegationStatus::Delegated,
        }
    }

    #[test]
    fn test_activity_cap_keeps_most_recent_in_order() {
        let mut store = EventStore::default();
        for n in 0..130 {
            store.append_activity(activity(n));
        }
        assert_eq!(store.activity_count(), 100);
        let ids: Vec<_> = store.activities().map(|a| a.id.clone()).collect();
        let expected: Vec<_> = (30..130).map(|n| format!("a{}", n)).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_delegation_cap_keeps_most_recent_in_order() {
        let mut store = EventStore::default();
        for n in 0..75 {
            store.append_delegation(delegation(n));
        }
        assert_eq!(store.delegation_count(), 50);
        assert_eq!(store.delegations().next().unwrap().id, "d25");
        assert_eq!(store.delegations().last().unwrap().id, "d74");
    }

    #[test]
    fn test_recent_slices_from_end() {
        let mut store = EventStore::new(10, 10);
        for n in 0..4 {
            store.append_activity(activity(n));
        }
        let recent = store.recent_activities(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].id, "a2");
        assert_eq!(recent[1].id, "a3");
        assert_eq!(store.recent_activities(50).len(), 4);
        assert!(store.recent_delegations(5).is_empty());
    }

    #[test]
    fn test_zero_cap_is_raised_to_one() {
        let mut store = EventStore::new(0, 0);
        store.append_activity(activity(1));
        store.append_activity(activity(2));
        assert_eq!(store.activity_count(), 1);
        assert_eq!(store.activity_cap(), 1);
        assert_eq!(store.delegation_cap(), 1);
    }
}
