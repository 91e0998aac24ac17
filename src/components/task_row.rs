//! Task Row Component
//!
//! One table row with completion toggle and delete icons.

use leptos::prelude::*;
use leptos::task::spawn_local;
use task_store::{SyncStatus, TaskRow};

use crate::context::AppContext;

/// A single task row
///
/// Handlers capture only the task id; the board looks the task up again
/// when clicked.
#[component]
pub fn TaskRowView(row: TaskRow) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");

    let complete_id = row.complete_element_id();
    let delete_id = row.delete_element_id();
    let actionable = row.is_actionable();

    let row_class = match row.status {
        SyncStatus::Synced => "task-row",
        SyncStatus::Pending => "task-row pending",
        SyncStatus::Failed => "task-row failed",
    };
    let complete_class = match (row.completed, actionable) {
        (true, true) => "bi bi-circle-fill green pointer",
        (false, true) => "bi bi-circle-fill red pointer",
        (true, false) => "bi bi-circle-fill green",
        (false, false) => "bi bi-circle-fill red",
    };
    let delete_class = if actionable { "bi bi-trash pointer" } else { "bi bi-trash" };

    let toggle_id = row.id.clone();
    let on_toggle = move |_: web_sys::MouseEvent| {
        let Some(id) = toggle_id.clone() else { return };
        let board = ctx.board();
        spawn_local(async move {
            board.toggle_complete(&id).await;
            ctx.render();
        });
    };

    let remove_id = row.id.clone();
    let on_delete = move |_: web_sys::MouseEvent| {
        let Some(id) = remove_id.clone() else { return };
        let board = ctx.board();
        spawn_local(async move {
            board.delete(&id).await;
            ctx.render();
        });
    };

    view! {
        <tr class=row_class>
            <td>{row.name}</td>
            <td>
                <i id=complete_id class=complete_class on:click=on_toggle></i>
            </td>
            <td>{row.date_label}</td>
            <td>
                <i id=delete_id class=delete_class on:click=on_delete></i>
            </td>
        </tr>
    }
}
