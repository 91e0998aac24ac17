//! In-Memory Repository Implementation
//!
//! Keeps the collection inside the page. Backs the app when no remote store
//! is configured, and stands in for Firestore in tests (including an offline
//! switch to simulate an unreachable remote).

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use async_trait::async_trait;

use super::traits::TaskRepository;
use crate::domain::{DomainError, DomainResult, Task, TaskId};

/// In-memory task collection
#[derive(Debug, Default)]
pub struct MemoryRepository {
    docs: RefCell<BTreeMap<TaskId, Task>>,
    next_id: Cell<u64>,
    offline: Cell<bool>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `tasks`, as a page reload would find them.
    ///
    /// Persisted tasks keep their ids; unpersisted ones get fresh ids.
    pub fn seeded(tasks: &[Task]) -> Self {
        let repo = Self::new();
        for task in tasks {
            match &task.id {
                Some(id) => {
                    repo.reserve(id);
                    repo.docs.borrow_mut().insert(id.clone(), stored(task, id.clone()));
                }
                None => {
                    repo.insert(task);
                }
            }
        }
        repo
    }

    /// Simulate losing (or regaining) the connection to the store
    pub fn set_offline(&self, offline: bool) {
        self.offline.set(offline);
    }

    pub fn is_offline(&self) -> bool {
        self.offline.get()
    }

    /// Insert a task directly, bypassing the offline switch
    pub fn insert(&self, task: &Task) -> TaskId {
        let id = self.allocate_id();
        self.docs.borrow_mut().insert(id.clone(), stored(task, id.clone()));
        id
    }

    pub fn len(&self) -> usize {
        self.docs.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.borrow().is_empty()
    }

    /// Stored copy of a task, as the remote store sees it
    pub fn get(&self, id: &TaskId) -> Option<Task> {
        self.docs.borrow().get(id).cloned()
    }

    fn allocate_id(&self) -> TaskId {
        let next = self.next_id.get() + 1;
        self.next_id.set(next);
        // Zero-padded so BTreeMap order matches creation order
        TaskId::new(format!("mem-{:06}", next))
    }

    /// Keep generated ids clear of one seeded from elsewhere
    fn reserve(&self, id: &TaskId) {
        let seq = id
            .as_str()
            .strip_prefix("mem-")
            .and_then(|n| n.parse::<u64>().ok());
        if let Some(seq) = seq {
            self.next_id.set(self.next_id.get().max(seq));
        }
    }

    fn ensure_online(&self) -> DomainResult<()> {
        if self.offline.get() {
            Err(DomainError::Remote {
                status: 503,
                message: "memory store is offline".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

/// Copy of the stored fields only; client bookkeeping is dropped
fn stored(task: &Task, id: TaskId) -> Task {
    Task::persisted(id, task.name.clone(), task.completed, task.date_completed)
}

#[async_trait(?Send)]
impl TaskRepository for MemoryRepository {
    async fn list(&self) -> DomainResult<Vec<Task>> {
        self.ensure_online()?;
        Ok(self.docs.borrow().values().cloned().collect())
    }

    async fn create(&self, task: &Task) -> DomainResult<TaskId> {
        self.ensure_online()?;
        Ok(self.insert(task))
    }

    async fn update(&self, task: &Task) -> DomainResult<()> {
        self.ensure_online()?;
        let id = task
            .id
            .clone()
            .ok_or_else(|| DomainError::InvalidInput("cannot update a task without an id".to_string()))?;

        let mut docs = self.docs.borrow_mut();
        match docs.get_mut(&id) {
            Some(existing) => {
                *existing = stored(task, id);
                Ok(())
            }
            None => Err(DomainError::NotFound(format!("task {}", id))),
        }
    }

    async fn delete(&self, id: &TaskId) -> DomainResult<()> {
        self.ensure_online()?;
        // Deleting a missing document succeeds, as in Firestore
        self.docs.borrow_mut().remove(id);
        Ok(())
    }
}
