//! Application Context
//!
//! Shared handles provided via Leptos Context API.

use leptos::prelude::*;
use leptos::task::spawn_local;
use task_store::{TaskBoard, TaskRow};

use crate::store::{store_rows, store_set_loading, store_set_rows, AppStore};

/// App-wide handles provided via context
#[derive(Clone, Copy)]
pub struct AppContext {
    /// The UI controller; not thread-safe, so it lives in local storage
    board: StoredValue<TaskBoard, LocalStorage>,
    /// Rendered table state
    pub store: AppStore,
}

impl AppContext {
    pub fn new(board: TaskBoard, store: AppStore) -> Self {
        Self {
            board: StoredValue::new_local(board),
            store,
        }
    }

    pub fn board(&self) -> TaskBoard {
        self.board.get_value()
    }

    /// Rebuild the table rows from the current task list
    pub fn render(&self) {
        let rows = self.board.with_value(|board| board.rows());
        store_set_rows(&self.store, rows);
    }

    pub fn rows(&self) -> Vec<TaskRow> {
        store_rows(&self.store)
    }

    /// Restore cached rows, then load the remote list and render again
    pub fn initialize(&self) {
        let ctx = *self;
        let restored = ctx.board.with_value(|board| board.restore_cached());
        tracing::debug!(restored, "rendering cached rows");
        ctx.render();

        spawn_local(async move {
            ctx.board().reload().await;
            store_set_loading(&ctx.store, false);
            ctx.render();
        });
    }
}
