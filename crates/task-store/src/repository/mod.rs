//! Repository Layer
//!
//! Remote document store and local snapshot abstractions with their
//! implementations.

mod traits;
mod firestore;
mod memory;
mod snapshot;

#[cfg(test)]
mod tests;

pub use traits::{SnapshotStore, TaskRepository};
pub use firestore::FirestoreRepository;
pub use memory::MemoryRepository;
pub use snapshot::{LocalStorageSnapshot, MemorySnapshot};
