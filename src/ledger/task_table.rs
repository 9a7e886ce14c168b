//! Latest-wins task progress records.

use super::ordered::InsertionOrdered;
use super::types::{TaskProgress, TaskStatus};

/// Task progress keyed by task id. A write replaces the whole record.
#[derive(Debug, Clone, Default)]
pub struct TaskTable {
    tasks: InsertionOrdered<TaskProgress>,
}

impl TaskTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `record` under its id, replacing any previous record.
    pub fn upsert(&mut self, record: TaskProgress) -> &TaskProgress {
        let id = record.id.clone();
        self.tasks.insert(&id, record)
    }

    pub fn get(&self, task_id: &str) -> Option<&TaskProgress> {
        self.tasks.get(task_id)
    }

    /// Ids of tasks currently in `status`.
    pub fn ids_with_status(&self, status: TaskStatus) -> Vec<String> {
        self.tasks
            .values()
            .filter(|t| t.status == status)
            .map(|t| t.id.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
