//! Task Form Component
//!
//! Text input plus submit button for creating tasks.

use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen::JsCast;

use crate::context::AppContext;

/// Form for creating a new task (`#task-form` / `#task-input`)
#[component]
pub fn TaskForm() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");

    let (new_text, set_new_text) = signal(String::new());

    let create_task = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let text = new_text.get_untracked();
        set_new_text.set(String::new());

        let board = ctx.board();
        let Some(draft) = board.stage_from_input(&text) else { return };

        // Draw the pending row now; the create settles it later
        ctx.render();
        spawn_local(async move {
            board.persist_draft(draft).await;
            ctx.render();
        });
    };

    view! {
        <form id="task-form" class="task-form" on:submit=create_task>
            <input
                id="task-input"
                type="text"
                placeholder="Add new task..."
                autocomplete="off"
                prop:value=move || new_text.get()
                on:input=move |ev| {
                    if let Some(input) = ev
                        .target()
                        .and_then(|target| target.dyn_into::<web_sys::HtmlInputElement>().ok())
                    {
                        set_new_text.set(input.value());
                    }
                }
            />
            <button type="submit">"Add"</button>
        </form>
    }
}
