//! Storage Service Integration Tests
//!
//! Tests for StorageService and TaskBoard over the in-memory repository and
//! snapshot store.

use std::cell::Cell;
use std::collections::HashSet;
use std::rc::Rc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::{DomainResult, SyncStatus, Task, TaskId};
use crate::repository::{MemoryRepository, MemorySnapshot, SnapshotStore, TaskRepository};
use crate::{StorageService, StoreConfig, TaskBoard};

const KEY: &str = "tasks";

fn setup() -> (Rc<MemoryRepository>, Rc<MemorySnapshot>, StorageService) {
    let repo = Rc::new(MemoryRepository::new());
    let snapshots = Rc::new(MemorySnapshot::new());
    let service = StorageService::new(repo.clone(), snapshots.clone(), KEY);
    (repo, snapshots, service)
}

fn snapshot_of(snapshots: &MemorySnapshot) -> Vec<Task> {
    snapshots.load(KEY).expect("Snapshot unreadable").unwrap_or_default()
}

// ========================
// add
// ========================

#[tokio::test]
async fn test_add_buy_milk() {
    let (repo, _, service) = setup();

    service.add(Task::new("Buy milk")).await;

    let tasks = service.tasks();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].name, "Buy milk");
    assert!(!tasks[0].completed);
    assert!(tasks[0].date_completed.is_none());
    assert_eq!(tasks[0].status, SyncStatus::Synced);
    assert_eq!(repo.len(), 1);
}

#[tokio::test]
async fn test_add_backfills_assigned_id() {
    let (repo, _, service) = setup();

    service.add(Task::new("Buy milk")).await;

    let id = service.tasks()[0].id.clone().expect("id should be back-filled");
    assert_eq!(repo.get(&id).map(|t| t.name), Some("Buy milk".to_string()));
}

#[tokio::test]
async fn test_add_grows_list_by_one() {
    let (repo, _, service) = setup();
    repo.insert(&Task::new("Existing 1"));
    repo.insert(&Task::new("Existing 2"));
    service.load_all().await;

    service.add(Task::new("New one")).await;

    assert_eq!(service.len(), 3);
    assert!(service.tasks().iter().any(|t| t.name == "New one"));
}

#[tokio::test]
async fn test_add_failure_keeps_unpersisted_entry() {
    let (repo, snapshots, service) = setup();
    repo.set_offline(true);

    service.add(Task::new("Lost task")).await;

    let tasks = service.tasks();
    assert_eq!(tasks.len(), 1);
    assert!(tasks[0].id.is_none());
    assert_eq!(tasks[0].status, SyncStatus::Failed);
    assert!(repo.is_empty());

    let raw = snapshots.raw(KEY).expect("Snapshot should be written");
    assert!(raw.contains(r#""id":null"#));
    assert!(raw.contains("Lost task"));
}

// ========================
// update
// ========================

#[tokio::test]
async fn test_update_replaces_entry_on_success() {
    let (repo, snapshots, service) = setup();
    service.add(Task::new("Write report")).await;
    let mut task = service.tasks()[0].clone();
    let id = task.id.clone().unwrap();

    task.name = "Write final report".to_string();
    service.update(task).await;

    assert_eq!(service.find(&id).unwrap().name, "Write final report");
    assert_eq!(repo.get(&id).unwrap().name, "Write final report");
    assert_eq!(snapshot_of(&snapshots)[0].name, "Write final report");
}

#[tokio::test]
async fn test_update_failure_leaves_list_unchanged() {
    let (repo, _, service) = setup();
    service.add(Task::new("Write report")).await;
    let before = service.tasks();

    repo.set_offline(true);
    service.update(before[0].toggled(Utc::now())).await;

    assert_eq!(service.tasks(), before);
}

#[tokio::test]
async fn test_update_of_deleted_document_leaves_list_unchanged() {
    let (repo, _, service) = setup();
    let id = repo.insert(&Task::new("Gone soon"));
    service.load_all().await;

    // Removed by someone else; the update precondition fails
    repo.delete(&id).await.unwrap();
    let stale = service.find(&id).unwrap();
    service.update(stale.toggled(Utc::now())).await;

    assert!(!service.find(&id).unwrap().completed);
}

#[tokio::test]
async fn test_update_without_id_is_ignored() {
    let (repo, _, service) = setup();

    service.update(Task::new("Never saved")).await;

    assert!(service.is_empty());
    assert!(repo.is_empty());
}

// ========================
// remove
// ========================

#[tokio::test]
async fn test_remove_drops_task() {
    let (repo, snapshots, service) = setup();
    service.add(Task::new("Buy milk")).await;
    let id = service.tasks()[0].id.clone().unwrap();

    service.remove(&id).await;

    assert!(service.is_empty());
    assert!(service.find(&id).is_none());
    assert!(repo.is_empty());
    assert!(snapshot_of(&snapshots).is_empty());
}

#[tokio::test]
async fn test_remove_only_matching_id() {
    let (_, _, service) = setup();
    service.add(Task::new("Keep")).await;
    service.add(Task::new("Drop")).await;
    let drop_id = service.tasks()[1].id.clone().unwrap();

    service.remove(&drop_id).await;

    let names: Vec<_> = service.tasks().into_iter().map(|t| t.name).collect();
    assert_eq!(names, vec!["Keep"]);
}

#[tokio::test]
async fn test_remove_failure_keeps_entry() {
    let (repo, _, service) = setup();
    service.add(Task::new("Sticky")).await;
    let id = service.tasks()[0].id.clone().unwrap();

    repo.set_offline(true);
    service.remove(&id).await;

    assert!(service.find(&id).is_some());
}

// ========================
// load_all
// ========================

#[tokio::test]
async fn test_load_all_is_idempotent() {
    let (repo, _, service) = setup();
    repo.insert(&Task::new("One"));
    repo.insert(&Task::persisted(TaskId::new("ignored"), "Two", true, Some(Utc::now())));

    service.load_all().await;
    let first = service.tasks();
    service.load_all().await;

    assert_eq!(first.len(), 2);
    assert_eq!(service.tasks(), first);
}

#[tokio::test]
async fn test_load_all_replaces_wholesale() {
    let (repo, _, service) = setup();
    service.add(Task::new("Local")).await;
    repo.insert(&Task::new("Remote"));

    service.load_all().await;

    let names: Vec<_> = service.tasks().into_iter().map(|t| t.name).collect();
    assert_eq!(names, vec!["Local", "Remote"]);
}

#[tokio::test]
async fn test_load_all_offline_on_first_load() {
    let (repo, _, service) = setup();
    repo.insert(&Task::new("Unreachable"));
    repo.set_offline(true);

    service.load_all().await;

    assert!(service.is_empty());
}

#[tokio::test]
async fn test_load_all_offline_keeps_previous_list() {
    let (repo, _, service) = setup();
    repo.insert(&Task::new("Cached"));
    service.load_all().await;
    let before = service.tasks();

    repo.insert(&Task::new("Added elsewhere"));
    repo.set_offline(true);
    service.load_all().await;

    assert_eq!(service.tasks(), before);
}

// ========================
// Snapshot
// ========================

#[tokio::test]
async fn test_restore_snapshot_seeds_empty_list() {
    let (repo, snapshots, service) = setup();
    service.add(Task::new("Saved before reload")).await;

    // A fresh page load over the same stores
    let reloaded = StorageService::new(repo.clone(), snapshots.clone(), KEY);
    assert_eq!(reloaded.restore_snapshot(), 1);
    assert_eq!(reloaded.tasks()[0].name, "Saved before reload");
    assert_eq!(reloaded.tasks()[0].status, SyncStatus::Synced);
}

#[tokio::test]
async fn test_restore_snapshot_skips_populated_list() {
    let (repo, snapshots, service) = setup();
    snapshots.save(KEY, &[Task::new("Old")]).unwrap();
    repo.insert(&Task::new("Fresh"));
    service.load_all().await;

    assert_eq!(service.restore_snapshot(), 0);
    assert_eq!(service.tasks()[0].name, "Fresh");
}

#[test]
fn test_restore_marks_unpersisted_tasks_failed() {
    let (_, snapshots, service) = setup();
    snapshots
        .save(KEY, &[Task::new("Never saved"), Task::new("Also never saved")])
        .unwrap();

    assert_eq!(service.restore_snapshot(), 2);
    let tasks = service.tasks();
    assert!(tasks.iter().all(|t| t.status == SyncStatus::Failed));
    assert_ne!(tasks[0].row_key(), tasks[1].row_key());
}

#[test]
fn test_corrupt_snapshot_is_ignored() {
    let (_, snapshots, service) = setup();
    snapshots.put_raw(KEY, "{not json");

    assert_eq!(service.restore_snapshot(), 0);
    assert!(service.is_empty());
}

#[tokio::test]
async fn test_snapshot_written_after_load() {
    let (repo, snapshots, service) = setup();
    repo.insert(&Task::new("From remote"));

    service.load_all().await;

    assert_eq!(snapshot_of(&snapshots), service.tasks());
}

// ========================
// TaskBoard
// ========================

fn board() -> (Rc<MemoryRepository>, Rc<MemorySnapshot>, TaskBoard) {
    let (repo, snapshots, service) = setup();
    (repo, snapshots, TaskBoard::new(Rc::new(service)))
}

#[tokio::test]
async fn test_board_add_toggle_remove_scenario() {
    let (repo, _, board) = board();

    assert!(board.create_from_input("Buy milk").await);
    let rows = board.rows();
    assert_eq!(rows.len(), 1);
    assert!(!rows[0].completed);
    assert_eq!(rows[0].date_label, "");
    let id = rows[0].id.clone().unwrap();

    let before = Utc::now();
    board.toggle_complete(&id).await;
    let task = board.storage().find(&id).unwrap();
    assert!(task.completed);
    let stamped = task.date_completed.expect("completion date should be set");
    assert!(stamped >= before && stamped <= Utc::now());
    assert!(repo.get(&id).unwrap().completed);

    board.delete(&id).await;
    assert!(board.rows().is_empty());
}

#[tokio::test]
async fn test_board_toggle_keeps_invariant() {
    let (_, _, board) = board();
    board.create_from_input("Stretch").await;
    let id = board.rows()[0].id.clone().unwrap();

    for _ in 0..4 {
        board.toggle_complete(&id).await;
        assert!(board.storage().find(&id).unwrap().is_consistent());
    }
    assert!(!board.storage().find(&id).unwrap().completed);
}

#[tokio::test]
async fn test_board_ignores_blank_input() {
    let (repo, _, board) = board();

    assert!(!board.create_from_input("   ").await);
    assert!(board.rows().is_empty());
    assert!(repo.is_empty());
}

#[tokio::test]
async fn test_board_trims_input() {
    let (_, _, board) = board();
    board.create_from_input("  Buy milk \n").await;
    assert_eq!(board.rows()[0].name, "Buy milk");
}

#[tokio::test]
async fn test_board_toggle_unknown_id_is_noop() {
    let (repo, _, board) = board();
    board.create_from_input("Only").await;

    board.toggle_complete(&TaskId::new("missing")).await;

    assert!(!board.rows()[0].completed);
    assert_eq!(repo.len(), 1);
}

#[tokio::test]
async fn test_board_toggle_uses_current_list() {
    let (repo, _, board) = board();
    board.create_from_input("Rename me").await;
    let id = board.rows()[0].id.clone().unwrap();

    // Another client renames it; a reload picks that up
    let mut renamed = repo.get(&id).unwrap();
    renamed.name = "Renamed".to_string();
    repo.update(&renamed).await.unwrap();
    board.reload().await;

    board.toggle_complete(&id).await;
    let stored = repo.get(&id).unwrap();
    assert_eq!(stored.name, "Renamed");
    assert!(stored.completed);
}

#[tokio::test]
async fn test_board_initialize_offline_shows_snapshot() {
    let (repo, snapshots, board) = board();
    board.create_from_input("Cached task").await;

    let reloaded = TaskBoard::new(Rc::new(StorageService::new(repo.clone(), snapshots.clone(), KEY)));
    repo.set_offline(true);
    reloaded.initialize().await;

    assert_eq!(reloaded.rows().len(), 1);
    assert_eq!(reloaded.rows()[0].name, "Cached task");
}

#[tokio::test]
async fn test_board_initialize_without_restore() {
    let (repo, snapshots, board) = board();
    board.create_from_input("Cached task").await;

    let reloaded = TaskBoard::new(Rc::new(StorageService::new(repo.clone(), snapshots.clone(), KEY)))
        .with_snapshot_restore(false);
    repo.set_offline(true);
    reloaded.initialize().await;

    assert!(reloaded.rows().is_empty());
}

#[tokio::test]
async fn test_board_staged_row_is_pending_until_persisted() {
    let (repo, _, board) = board();

    let draft = board.stage_from_input("  Buy milk ").expect("Non-blank input is staged");
    let rows = board.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Buy milk");
    assert_eq!(rows[0].status, SyncStatus::Pending);
    assert!(!rows[0].is_actionable());
    assert!(repo.is_empty());

    board.persist_draft(draft).await;
    let rows = board.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, SyncStatus::Synced);
    assert!(rows[0].is_actionable());
    assert_eq!(repo.len(), 1);
}

#[test]
fn test_board_blank_input_stages_nothing() {
    let (_, _, board) = board();
    assert!(board.stage_from_input("   ").is_none());
    assert!(board.rows().is_empty());
}

// ========================
// Memory backend
// ========================

#[test]
fn test_memory_backend_from_config() {
    let snapshots = Rc::new(MemorySnapshot::new());
    let service =
        StorageService::from_config_with(&StoreConfig::memory(), snapshots).expect("Memory config is valid");
    assert!(service.is_empty());
}

#[tokio::test]
async fn test_memory_backend_keeps_snapshot_across_reload() {
    let snapshots = Rc::new(MemorySnapshot::new());
    let first = TaskBoard::new(Rc::new(StorageService::memory(snapshots.clone(), KEY)));
    first.create_from_input("Buy milk").await;
    let id = first.rows()[0].id.clone().expect("Task should be persisted");

    // Page reload: new service and store over the same snapshot
    let reloaded = TaskBoard::new(Rc::new(StorageService::memory(snapshots.clone(), KEY)));
    assert_eq!(reloaded.restore_cached(), 1);
    reloaded.reload().await;

    let rows = reloaded.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, Some(id));
    assert_eq!(rows[0].name, "Buy milk");
    assert_eq!(snapshot_of(&snapshots).len(), 1);

    reloaded.create_from_input("Walk dog").await;
    let ids: HashSet<TaskId> = reloaded.rows().into_iter().filter_map(|row| row.id).collect();
    assert_eq!(ids.len(), 2);
}

#[tokio::test]
async fn test_memory_backend_persists_unsynced_snapshot_entries() {
    let snapshots = Rc::new(MemorySnapshot::new());
    snapshots.save(KEY, &[Task::new("Never synced")]).unwrap();

    let service = StorageService::memory(snapshots.clone(), KEY);
    service.load_all().await;

    let tasks = service.tasks();
    assert_eq!(tasks.len(), 1);
    assert!(tasks[0].is_persisted());
    assert_eq!(tasks[0].status, SyncStatus::Synced);
}

#[test]
fn test_memory_backend_with_corrupt_snapshot_starts_empty() {
    let snapshots = Rc::new(MemorySnapshot::new());
    snapshots.put_raw(KEY, "not json");

    let service = StorageService::memory(snapshots, KEY);
    assert_eq!(service.restore_snapshot(), 0);
    assert!(service.is_empty());
}

// ========================
// Overlapping handlers
// ========================

/// Holds every create until released, so another handler can run meanwhile
struct HeldRepository {
    inner: Rc<MemoryRepository>,
    hold: Cell<bool>,
}

impl HeldRepository {
    fn new(inner: Rc<MemoryRepository>) -> Self {
        Self { inner, hold: Cell::new(true) }
    }

    fn release(&self) {
        self.hold.set(false);
    }
}

#[async_trait(?Send)]
impl TaskRepository for HeldRepository {
    async fn list(&self) -> DomainResult<Vec<Task>> {
        self.inner.list().await
    }

    async fn create(&self, task: &Task) -> DomainResult<TaskId> {
        while self.hold.get() {
            tokio::task::yield_now().await;
        }
        self.inner.create(task).await
    }

    async fn update(&self, task: &Task) -> DomainResult<()> {
        self.inner.update(task).await
    }

    async fn delete(&self, id: &TaskId) -> DomainResult<()> {
        self.inner.delete(id).await
    }
}

fn held_setup() -> (Rc<MemoryRepository>, Rc<HeldRepository>, StorageService) {
    let repo = Rc::new(MemoryRepository::new());
    let held = Rc::new(HeldRepository::new(repo.clone()));
    let service = StorageService::new(held.clone(), Rc::new(MemorySnapshot::new()), KEY);
    (repo, held, service)
}

#[tokio::test]
async fn test_reload_during_add_drops_draft_until_next_reload() {
    let (repo, held, service) = held_setup();

    tokio::join!(service.add(Task::new("Buy milk")), async {
        service.load_all().await;
        held.release();
    });

    // Saved remotely, but the reload replaced the list before the id came back
    assert!(service.is_empty());
    assert_eq!(repo.len(), 1);

    service.load_all().await;
    let tasks = service.tasks();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].name, "Buy milk");
    assert_eq!(tasks[0].status, SyncStatus::Synced);
}

#[tokio::test]
async fn test_concurrent_adds_both_backfill() {
    let (repo, held, service) = held_setup();

    tokio::join!(service.add(Task::new("Buy milk")), service.add(Task::new("Walk dog")), async {
        tokio::task::yield_now().await;
        held.release();
    });

    let tasks = service.tasks();
    assert_eq!(tasks.len(), 2);
    assert!(tasks.iter().all(|t| t.is_persisted() && t.status == SyncStatus::Synced));
    assert_eq!(tasks[0].name, "Buy milk");
    assert_eq!(tasks[1].name, "Walk dog");
    assert_eq!(repo.len(), 2);
}
