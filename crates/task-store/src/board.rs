//! Task Board
//!
//! The UI controller behind the task table. Components call these handlers
//! with ids only; each handler re-resolves the task from the current list,
//! so a reload between render and click never acts on a stale copy.

use std::rc::Rc;

use chrono::{DateTime, Local, Utc};

use crate::domain::{SyncStatus, Task, TaskId};
use crate::service::StorageService;

/// One rendered table row
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRow {
    /// Stable render key: the id, or `draft-<n>` before the first persist
    pub key: String,
    pub id: Option<TaskId>,
    pub name: String,
    pub completed: bool,
    pub date_label: String,
    pub status: SyncStatus,
}

impl TaskRow {
    pub fn from_task(task: &Task) -> Self {
        Self {
            key: task.row_key(),
            id: task.id.clone(),
            name: task.name.clone(),
            completed: task.completed,
            date_label: date_label(task.date_completed),
            status: task.status,
        }
    }

    /// DOM id of the completion toggle
    pub fn complete_element_id(&self) -> String {
        format!("complete-{}", self.key)
    }

    /// DOM id of the delete control
    pub fn delete_element_id(&self) -> String {
        format!("delete-{}", self.key)
    }

    /// Only persisted rows can be toggled or deleted
    pub fn is_actionable(&self) -> bool {
        self.id.is_some()
    }
}

/// `MM/DD/YYYY` in local time, empty when not completed
pub fn date_label(date: Option<DateTime<Utc>>) -> String {
    date.map(|d| d.with_timezone(&Local).format("%m/%d/%Y").to_string())
        .unwrap_or_default()
}

#[derive(Clone)]
pub struct TaskBoard {
    storage: Rc<StorageService>,
    restore_snapshot: bool,
}

impl TaskBoard {
    pub fn new(storage: Rc<StorageService>) -> Self {
        Self {
            storage,
            restore_snapshot: true,
        }
    }

    pub fn with_snapshot_restore(mut self, enabled: bool) -> Self {
        self.restore_snapshot = enabled;
        self
    }

    pub fn storage(&self) -> &StorageService {
        &self.storage
    }

    /// Restore the cached snapshot (when enabled) and load the remote list
    pub async fn initialize(&self) {
        self.restore_cached();
        self.reload().await;
    }

    /// Seed the list from the local snapshot so the table can render before
    /// the remote answers
    pub fn restore_cached(&self) -> usize {
        if self.restore_snapshot {
            self.storage.restore_snapshot()
        } else {
            0
        }
    }

    pub async fn reload(&self) {
        self.storage.load_all().await;
    }

    /// Create a task from the text input. Blank input is ignored.
    pub async fn create_from_input(&self, input: &str) -> bool {
        match self.stage_from_input(input) {
            Some(draft) => {
                self.persist_draft(draft).await;
                true
            }
            None => false,
        }
    }

    /// First half of [`create_from_input`](Self::create_from_input): list the
    /// trimmed name as a pending row so it can be drawn before the store answers
    pub fn stage_from_input(&self, input: &str) -> Option<u32> {
        let name = input.trim();
        if name.is_empty() {
            tracing::debug!("ignoring blank task name");
            return None;
        }
        Some(self.storage.stage(Task::new(name)))
    }

    pub async fn persist_draft(&self, draft: u32) {
        self.storage.persist(draft).await;
    }

    /// Flip completion of the task currently listed under `id`
    pub async fn toggle_complete(&self, id: &TaskId) {
        let Some(task) = self.storage.find(id) else {
            tracing::debug!(task_id = %id, "toggle for a task no longer listed");
            return;
        };
        self.storage.update(task.toggled(Utc::now())).await;
    }

    pub async fn delete(&self, id: &TaskId) {
        self.storage.remove(id).await;
    }

    /// Rows for the table, rebuilt from the current list
    pub fn rows(&self) -> Vec<TaskRow> {
        self.storage.tasks().iter().map(TaskRow::from_task).collect()
    }
}
