//! Domain Layer
//!
//! Task entity and the error type shared by every layer.
//! No I/O happens here.

mod error;
mod task;

pub use error::{DomainError, DomainResult};
pub use task::{SyncStatus, Task, TaskId};
