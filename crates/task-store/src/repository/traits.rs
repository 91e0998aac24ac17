//! Repository Layer - Core Traits
//!
//! Defines the abstract interfaces for task persistence.
//! The remote collection can be Firestore or in-memory; the snapshot can be
//! browser localStorage or in-memory.

use async_trait::async_trait;

use crate::domain::{DomainResult, Task, TaskId};

/// CRUD over the remote `tasks` collection
///
/// Futures are `!Send`: the browser runs everything on one thread.
#[async_trait(?Send)]
pub trait TaskRepository {
    /// Fetch every task in the collection
    async fn list(&self) -> DomainResult<Vec<Task>>;

    /// Persist a new task, returning the id the store assigned
    async fn create(&self, task: &Task) -> DomainResult<TaskId>;

    /// Overwrite name, completion and completion date of an existing task
    async fn update(&self, task: &Task) -> DomainResult<()>;

    /// Delete a task by id
    async fn delete(&self, id: &TaskId) -> DomainResult<()>;
}

/// Local key/value persistence for full-list snapshots
pub trait SnapshotStore {
    /// Overwrite the snapshot stored under `key`
    fn save(&self, key: &str, tasks: &[Task]) -> DomainResult<()>;

    /// Read the snapshot under `key`, `None` if nothing was ever saved
    fn load(&self, key: &str) -> DomainResult<Option<Vec<Task>>>;
}
