/// Bridge to the extension APIs (chrome.storage, chrome.tabs, fetch, clipboard)
use crate::error::ExtensionError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use wasm_bindgen::prelude::*;

// Import JS bridge functions
#[wasm_bindgen(module = "/bridge/host.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn fetchPackagedText(path: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn getLocalStorage(defaults: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setLocalStorage(values: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn removeTab(tab_id: i32) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn copyToClipboard(text: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    fn downloadText(data: &str, filename: &str) -> Result<(), JsValue>;
}

/// Convert to a plain JS value (objects, not `Map`s), as chrome.storage expects
pub fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, ExtensionError> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| ExtensionError::Serialization(format!("{:?}", e)))
}

pub fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T, ExtensionError> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| ExtensionError::Serialization(format!("{:?}", e)))
}

/// Read a file shipped inside the extension package
pub async fn fetch_packaged_text(path: &str) -> Result<String, ExtensionError> {
    let text = fetchPackagedText(path)
        .await
        .map_err(|e| ExtensionError::Config(format!("{:?}", e)))?;

    text.as_string()
        .ok_or_else(|| ExtensionError::Config(format!("{} did not yield text", path)))
}

/// `chrome.storage.local.get(defaults)`
pub async fn storage_get(defaults: &Value) -> Result<Value, ExtensionError> {
    let result = getLocalStorage(to_js(defaults)?)
        .await
        .map_err(|e| ExtensionError::Storage(format!("{:?}", e)))?;

    from_js(result)
}

/// `chrome.storage.local.set(values)`
pub async fn storage_set(values: &Value) -> Result<(), ExtensionError> {
    setLocalStorage(to_js(values)?)
        .await
        .map_err(|e| ExtensionError::Storage(format!("{:?}", e)))
}

pub async fn remove_tab(tab_id: i32) -> Result<(), ExtensionError> {
    removeTab(tab_id)
        .await
        .map_err(|e| ExtensionError::Tab(format!("{:?}", e)))
}

pub async fn copy_text(text: &str) -> Result<(), ExtensionError> {
    copyToClipboard(text)
        .await
        .map_err(|e| ExtensionError::Clipboard(format!("{:?}", e)))
}

pub fn download_text(data: &str, filename: &str) -> Result<(), ExtensionError> {
    downloadText(data, filename).map_err(|e| ExtensionError::Download(format!("{:?}", e)))
}
