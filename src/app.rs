//! Task Table App
//!
//! Root component: a create form above the task table.

use leptos::prelude::*;
use reactive_stores::Store;
use task_store::TaskBoard;

use crate::components::{TaskForm, TaskTable};
use crate::context::AppContext;
use crate::store::{store_loading, AppState};

#[component]
pub fn App(board: TaskBoard) -> impl IntoView {
    let ctx = AppContext::new(board, Store::new(AppState::new()));

    // Provide context to all children
    provide_context(ctx);

    // Load tasks on mount
    Effect::new(move |_| ctx.initialize());

    view! {
        <main class="container">
            <h1>"Tasks"</h1>

            <TaskForm />

            <TaskTable />

            <p class="task-count">
                {move || {
                    if store_loading(&ctx.store) {
                        "Loading...".to_string()
                    } else {
                        format!("{} tasks", ctx.rows().len())
                    }
                }}
            </p>
        </main>
    }
}
