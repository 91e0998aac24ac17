//! Task Store
//!
//! Layered architecture:
//! - domain: the `Task` entity and errors
//! - repository: remote collection and local snapshot backends
//! - service: the in-memory mirror that syncs with them
//! - board: UI handler logic on top of the service

mod domain;
mod repository;
mod config;
mod service;
mod board;

pub use domain::{DomainError, DomainResult, SyncStatus, Task, TaskId};
pub use repository::{
    FirestoreRepository, LocalStorageSnapshot, MemoryRepository, MemorySnapshot, SnapshotStore,
    TaskRepository,
};
pub use config::{Backend, StoreConfig};
pub use service::StorageService;
pub use board::{date_label, TaskBoard, TaskRow};
