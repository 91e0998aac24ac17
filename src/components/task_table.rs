//! Task Table Component
//!
//! Renders every row of the current list into `#table-body`.

use leptos::prelude::*;

use crate::components::TaskRowView;
use crate::context::AppContext;

#[component]
pub fn TaskTable() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");

    view! {
        <table class="task-table">
            <thead>
                <tr>
                    <th>"Task"</th>
                    <th>"Done"</th>
                    <th>"Completed"</th>
                    <th></th>
                </tr>
            </thead>
            <tbody id="table-body">
                <For
                    each=move || ctx.rows()
                    key=|row| {
                        // Every displayed field, so any change re-renders the row
                        (
                            row.key.clone(),
                            row.name.clone(),
                            row.completed,
                            row.date_label.clone(),
                            row.status,
                        )
                    }
                    children=move |row| view! { <TaskRowView row=row /> }
                />
            </tbody>
        </table>
    }
}
