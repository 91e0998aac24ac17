//! Config Bootstrap
//!
//! The page embeds the store config as JSON in
//! `<script id="task-store-config" type="application/json">`.

use task_store::StoreConfig;

pub const CONFIG_ELEMENT_ID: &str = "task-store-config";

/// Read the config embedded in the page
///
/// Runs before logging is set up, so problems come back as a message for the
/// caller to log.
pub fn load_config() -> (StoreConfig, Option<String>) {
    let raw = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.get_element_by_id(CONFIG_ELEMENT_ID))
        .and_then(|element| element.text_content());
    resolve_config(raw.as_deref())
}

/// Parse the embedded JSON, falling back to the in-memory store
pub fn resolve_config(raw: Option<&str>) -> (StoreConfig, Option<String>) {
    let Some(json) = raw.map(str::trim).filter(|json| !json.is_empty()) else {
        return (
            StoreConfig::memory(),
            Some(format!("no #{} element, using in-memory store", CONFIG_ELEMENT_ID)),
        );
    };

    match StoreConfig::from_json(json) {
        Ok(config) => (config, None),
        Err(e) => (
            StoreConfig::memory(),
            Some(format!("{}, using in-memory store", e)),
        ),
    }
}
