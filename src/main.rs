//! Task Table Frontend Entry Point

mod app;
mod components;
mod config;
mod context;
mod store;

use std::rc::Rc;

use app::App;
use leptos::prelude::*;
use task_store::{LocalStorageSnapshot, StorageService, StoreConfig, TaskBoard};

fn main() {
    console_error_panic_hook::set_once();

    let (config, warning) = config::load_config();
    if let Err(e) = console_logger::init_logger("TaskTable", &config.log_level) {
        web_sys::console::warn_1(&format!("[APP] Logger not installed: {}", e).into());
    }
    if let Some(warning) = warning {
        tracing::warn!("{}", warning);
    }

    let board = build_board(&config);
    mount_to_body(move || view! { <App board=board /> });
}

/// Wire the storage service the config asks for into a board
fn build_board(config: &StoreConfig) -> TaskBoard {
    let storage = StorageService::from_config(config).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "store unavailable, using in-memory store");
        StorageService::memory(Rc::new(LocalStorageSnapshot), config.snapshot_key.clone())
    });

    tracing::info!(backend = ?config.backend, collection = %config.collection, "task store ready");
    TaskBoard::new(Rc::new(storage)).with_snapshot_restore(config.restore_snapshot)
}
