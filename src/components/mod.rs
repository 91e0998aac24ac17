//! UI Components
//!
//! Leptos components for the task table.

mod task_form;
mod task_table;
mod task_row;

pub use task_form::TaskForm;
pub use task_table::TaskTable;
pub use task_row::TaskRowView;
