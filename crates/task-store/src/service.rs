//! Storage Service
//!
//! In-memory mirror of the remote task collection. Every remote failure is
//! logged and swallowed here; callers only ever see the resulting list.
//!
//! The list sits in a `RefCell` that is never borrowed across an `.await`,
//! so overlapping handlers cannot trip a borrow panic.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::config::{Backend, StoreConfig};
use crate::domain::{DomainResult, SyncStatus, Task, TaskId};
use crate::repository::{
    FirestoreRepository, LocalStorageSnapshot, MemoryRepository, SnapshotStore, TaskRepository,
};

pub struct StorageService {
    repo: Rc<dyn TaskRepository>,
    snapshots: Rc<dyn SnapshotStore>,
    snapshot_key: String,
    tasks: RefCell<Vec<Task>>,
    next_draft: Cell<u32>,
}

impl StorageService {
    pub fn new(
        repo: Rc<dyn TaskRepository>,
        snapshots: Rc<dyn SnapshotStore>,
        snapshot_key: impl Into<String>,
    ) -> Self {
        Self {
            repo,
            snapshots,
            snapshot_key: snapshot_key.into(),
            tasks: RefCell::new(Vec::new()),
            next_draft: Cell::new(0),
        }
    }

    /// Build the service a config describes, snapshotting to localStorage
    pub fn from_config(config: &StoreConfig) -> DomainResult<Self> {
        Self::from_config_with(config, Rc::new(LocalStorageSnapshot))
    }

    pub fn from_config_with(config: &StoreConfig, snapshots: Rc<dyn SnapshotStore>) -> DomainResult<Self> {
        config.validate()?;
        match config.backend {
            Backend::Firestore => {
                let repo = Rc::new(FirestoreRepository::from_config(config)?);
                Ok(Self::new(repo, snapshots, config.snapshot_key.clone()))
            }
            Backend::Memory => Ok(Self::memory(snapshots, config.snapshot_key.clone())),
        }
    }

    /// An in-page store seeded from the snapshot, so a reload keeps the list
    pub fn memory(snapshots: Rc<dyn SnapshotStore>, snapshot_key: impl Into<String>) -> Self {
        let snapshot_key = snapshot_key.into();
        let seed = match snapshots.load(&snapshot_key) {
            Ok(tasks) => tasks.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(key = %snapshot_key, error = %e, "ignoring unreadable snapshot");
                Vec::new()
            }
        };
        tracing::debug!(count = seed.len(), "seeding in-memory store");
        Self::new(Rc::new(MemoryRepository::seeded(&seed)), snapshots, snapshot_key)
    }

    fn allocate_draft(&self) -> u32 {
        let draft = self.next_draft.get() + 1;
        self.next_draft.set(draft);
        draft
    }

    // ========================
    // Queries
    // ========================

    /// Current list, in display order
    pub fn tasks(&self) -> Vec<Task> {
        self.tasks.borrow().clone()
    }

    pub fn find(&self, id: &TaskId) -> Option<Task> {
        self.tasks
            .borrow()
            .iter()
            .find(|task| task.id.as_ref() == Some(id))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.tasks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.borrow().is_empty()
    }

    // ========================
    // Remote Operations
    // ========================

    /// Replace the list with the remote collection; keep it on failure
    pub async fn load_all(&self) {
        match self.repo.list().await {
            Ok(loaded) => {
                tracing::info!(count = loaded.len(), "loaded tasks");
                *self.tasks.borrow_mut() = loaded;
                self.save_snapshot();
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load tasks, keeping current list");
            }
        }
    }

    /// Append optimistically, then persist.
    ///
    /// On success the assigned id is written back into the list entry. On
    /// failure the entry stays, marked `Failed`.
    pub async fn add(&self, task: Task) {
        let draft = self.stage(task);
        self.persist(draft).await;
    }

    /// Append `task` as `Pending` and return its draft key
    pub fn stage(&self, mut task: Task) -> u32 {
        let draft = self.allocate_draft();
        task.id = None;
        task.draft = draft;
        task.status = SyncStatus::Pending;
        self.tasks.borrow_mut().push(task);
        draft
    }

    /// Create the staged entry `draft` remotely and back-fill its id
    pub async fn persist(&self, draft: u32) {
        let staged = self
            .tasks
            .borrow()
            .iter()
            .find(|t| t.id.is_none() && t.draft == draft)
            .cloned();
        let Some(task) = staged else {
            tracing::debug!(draft, "staged task no longer in list");
            return;
        };

        let result = self.repo.create(&task).await;

        {
            let mut tasks = self.tasks.borrow_mut();
            let entry = tasks
                .iter_mut()
                .find(|t| t.id.is_none() && t.draft == draft);
            match (result, entry) {
                (Ok(id), Some(entry)) => {
                    tracing::info!(task_id = %id, name = %entry.name, "task created");
                    entry.id = Some(id);
                    entry.status = SyncStatus::Synced;
                }
                (Ok(id), None) => {
                    // A reload replaced the list while the create was in flight
                    tracing::debug!(task_id = %id, "created task no longer in list");
                }
                (Err(e), Some(entry)) => {
                    tracing::warn!(error = %e, name = %entry.name, "failed to create task");
                    entry.status = SyncStatus::Failed;
                }
                (Err(e), None) => {
                    tracing::warn!(error = %e, "failed to create task");
                }
            }
        }

        self.save_snapshot();
    }

    /// Persist all fields, then replace the matching entry by id
    pub async fn update(&self, task: Task) {
        let Some(id) = task.id.clone() else {
            tracing::warn!(name = %task.name, "cannot update a task that was never persisted");
            return;
        };

        match self.repo.update(&task).await {
            Ok(()) => {
                {
                    let mut tasks = self.tasks.borrow_mut();
                    if let Some(entry) = tasks.iter_mut().find(|t| t.id.as_ref() == Some(&id)) {
                        *entry = Task { status: SyncStatus::Synced, ..task };
                    }
                }
                tracing::info!(task_id = %id, "task updated");
                self.save_snapshot();
            }
            Err(e) => {
                tracing::warn!(task_id = %id, error = %e, "failed to update task");
            }
        }
    }

    /// Delete remotely, then drop the entry by id
    pub async fn remove(&self, id: &TaskId) {
        match self.repo.delete(id).await {
            Ok(()) => {
                self.tasks.borrow_mut().retain(|t| t.id.as_ref() != Some(id));
                tracing::info!(task_id = %id, "task removed");
                self.save_snapshot();
            }
            Err(e) => {
                tracing::warn!(task_id = %id, error = %e, "failed to remove task");
            }
        }
    }

    // ========================
    // Local Snapshot
    // ========================

    /// Overwrite the local snapshot with the whole list
    pub fn save_snapshot(&self) {
        let tasks = self.tasks.borrow();
        if let Err(e) = self.snapshots.save(&self.snapshot_key, &tasks) {
            tracing::warn!(key = %self.snapshot_key, error = %e, "failed to save snapshot");
        }
    }

    /// Seed an empty list from the local snapshot; returns how many were restored
    pub fn restore_snapshot(&self) -> usize {
        if !self.is_empty() {
            return 0;
        }

        match self.snapshots.load(&self.snapshot_key) {
            Ok(Some(mut restored)) => {
                for task in restored.iter_mut().filter(|t| t.id.is_none()) {
                    task.draft = self.allocate_draft();
                    task.status = SyncStatus::Failed;
                }
                let count = restored.len();
                *self.tasks.borrow_mut() = restored;
                tracing::info!(count, "restored tasks from snapshot");
                count
            }
            Ok(None) => 0,
            Err(e) => {
                tracing::warn!(key = %self.snapshot_key, error = %e, "ignoring unreadable snapshot");
                0
            }
        }
    }
}
