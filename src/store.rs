//! Global Application State Store
//!
//! Uses Leptos reactive_stores for fine-grained reactivity.

use leptos::prelude::*;
use reactive_stores::Store;
use task_store::TaskRow;

/// Rendered state of the task table
#[derive(Clone, Debug, Default, Store)]
pub struct AppState {
    /// Rows in display order, rebuilt after every operation
    pub rows: Vec<TaskRow>,
    /// True until the first remote load has finished
    pub loading: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            loading: true,
            ..Default::default()
        }
    }
}

/// Type alias for the store
pub type AppStore = Store<AppState>;

// ========================
// Store Helper Functions
// ========================

/// Replace every row
pub fn store_set_rows(store: &AppStore, rows: Vec<TaskRow>) {
    store.rows().set(rows);
}

/// Current rows (tracked)
pub fn store_rows(store: &AppStore) -> Vec<TaskRow> {
    store.rows().get()
}

pub fn store_set_loading(store: &AppStore, loading: bool) {
    store.loading().set(loading);
}

/// Whether the first load is still running (tracked)
pub fn store_loading(store: &AppStore) -> bool {
    store.loading().get()
}
