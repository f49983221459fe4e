/// Background service worker: feeds browser events into the engine
use crate::config::{BUNDLED_CONFIG_PATH, BundledConfig, ConfigSource};
use crate::engine::Engine;
use crate::error::ExtensionError;
use crate::host;
use crate::rule::{NormalizedRule, RawRule};
use crate::storage::{LOCAL_AREA, RECORDED_ENTRIES_KEY, StorageChanges, StorageData};
use crate::tab_data::{TabChange, TabInfo};
use log::{debug, error, warn};
use serde_json::{Value, json};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

/// The configuration file shipped with the extension
struct PackagedConfig;

impl ConfigSource for PackagedConfig {
    async fn fetch(&self) -> Result<String, ExtensionError> {
        host::fetch_packaged_text(BUNDLED_CONFIG_PATH).await
    }
}

thread_local! {
    static ENGINE: RefCell<Engine> = RefCell::new(Engine::new());
    static BUNDLED: Rc<BundledConfig<PackagedConfig>> = Rc::new(BundledConfig::new(PackagedConfig));
}

async fn bundled_rules() -> Rc<[NormalizedRule]> {
    let config = BUNDLED.with(Rc::clone);
    config.rules().await
}

/// Read the persisted state and hand it to the engine
#[wasm_bindgen]
pub async fn start_background() {
    let data = match host::storage_get(&StorageData::defaults()).await {
        Ok(value) => StorageData::from_value(&value),
        Err(e) => {
            error!("Unable to read stored state: {}", e);
            StorageData::new()
        }
    };

    let now = js_sys::Date::now();
    ENGINE.with(|engine| engine.borrow_mut().initialize(data, now));
}

#[wasm_bindgen]
pub fn on_startup() {
    let now = js_sys::Date::now();
    ENGINE.with(|engine| engine.borrow_mut().on_startup(now));
}

#[wasm_bindgen]
pub fn on_storage_changed(changes: JsValue, area: String) {
    if area != LOCAL_AREA {
        return;
    }

    match host::from_js::<Value>(changes) {
        Ok(value) => {
            let changes = StorageChanges::from_value(&value);
            if !changes.is_empty() {
                ENGINE.with(|engine| engine.borrow_mut().apply_storage_changes(changes));
            }
        }
        Err(e) => warn!("Ignoring unreadable storage change: {}", e),
    }
}

#[wasm_bindgen]
pub async fn on_tab_created(tab: JsValue) {
    match host::from_js::<TabInfo>(tab) {
        Ok(tab) => handle_tab(tab.id, tab).await,
        Err(e) => error!("Failed to read created tab: {}", e),
    }
}

#[wasm_bindgen]
pub async fn on_tab_updated(tab_id: i32, change: JsValue, tab: JsValue) {
    let change: TabChange = host::from_js(change).unwrap_or_default();
    if !change.is_relevant() {
        return;
    }

    match host::from_js::<TabInfo>(tab) {
        Ok(tab) => handle_tab(Some(tab_id), tab).await,
        Err(e) => error!("Failed to read updated tab {}: {}", tab_id, e),
    }
}

async fn handle_tab(tab_id: Option<i32>, tab: TabInfo) {
    let bundled = bundled_rules().await;
    let now = js_sys::Date::now();
    let verdict = ENGINE.with(|engine| engine.borrow_mut().observe_tab(&tab, now, &bundled));

    if let Some(entries) = verdict.persist {
        if let Err(e) = persist_recorded(&entries).await {
            error!("Failed to record tab: {}", e);
        }
    }

    if verdict.close {
        if let Some(id) = tab_id {
            close_tab(id).await;
        }
    }
}

async fn persist_recorded(entries: &[RawRule]) -> Result<(), ExtensionError> {
    host::storage_set(&json!({ RECORDED_ENTRIES_KEY: entries })).await
}

/// Fire-and-forget: the tab may already be gone
async fn close_tab(tab_id: i32) {
    match host::remove_tab(tab_id).await {
        Ok(()) => debug!("Closed first-run tab {}", tab_id),
        Err(e) => error!("Error while closing tab {}: {}", tab_id, e),
    }
}
