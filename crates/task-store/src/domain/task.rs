//! Task Entity
//!
//! A single to-do entry mirrored from the remote `tasks` collection.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque document identifier assigned by the remote store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Where a task stands relative to the remote store (client-side only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SyncStatus {
    /// Loaded from, or confirmed by, the remote store
    #[default]
    Synced,
    /// Added locally, create request still in flight
    Pending,
    /// Never reached the remote store
    Failed,
}

/// A to-do task
///
/// `date_completed` is set exactly when `completed` is true. The store does
/// not enforce this; [`Task::toggle`] keeps it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Store-assigned id, `None` until the first successful persist
    #[serde(default)]
    pub id: Option<TaskId>,
    pub name: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub date_completed: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub status: SyncStatus,
    /// Client-side key for finding an unpersisted task again
    #[serde(skip)]
    pub(crate) draft: u32,
}

impl Task {
    /// A fresh, unpersisted, incomplete task
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            completed: false,
            date_completed: None,
            status: SyncStatus::Synced,
            draft: 0,
        }
    }

    /// A task as read back from the remote store
    pub fn persisted(
        id: TaskId,
        name: impl Into<String>,
        completed: bool,
        date_completed: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
            completed,
            date_completed,
            status: SyncStatus::Synced,
            draft: 0,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Flip completion, stamping or clearing the completion date
    pub fn toggle(&mut self, now: DateTime<Utc>) {
        self.completed = !self.completed;
        self.date_completed = if self.completed { Some(now) } else { None };
    }

    pub fn toggled(&self, now: DateTime<Utc>) -> Self {
        let mut task = self.clone();
        task.toggle(now);
        task
    }

    /// True when `date_completed` agrees with `completed`
    pub fn is_consistent(&self) -> bool {
        self.completed == self.date_completed.is_some()
    }

    /// Stable key for rendering: the id, or a draft key before persist
    pub fn row_key(&self) -> String {
        match &self.id {
            Some(id) => id.to_string(),
            None => format!("draft-{}", self.draft),
        }
    }
}
