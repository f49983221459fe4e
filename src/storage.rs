/// Storage layout of chrome.storage.local and its change notifications
use crate::rule::{RawRule, sanitize_entries};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

pub const AUTO_RECORD_ENABLED_KEY: &str = "autoRecordEnabled";
pub const RECORDED_ENTRIES_KEY: &str = "recordedEntries";
pub const CUSTOM_ENTRIES_KEY: &str = "customEntries";

/// Only changes to this area concern the background worker
pub const LOCAL_AREA: &str = "local";

/// State the background worker reads on start
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageData {
    pub auto_record_enabled: bool,
    pub recorded_entries: Vec<RawRule>,
}

impl StorageData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults object passed to `chrome.storage.local.get`
    pub fn defaults() -> Value {
        json!({
            AUTO_RECORD_ENABLED_KEY: false,
            RECORDED_ENTRIES_KEY: [],
        })
    }

    /// Read whatever the store returned; malformed values fall back to defaults
    pub fn from_value(value: &Value) -> StorageData {
        StorageData {
            auto_record_enabled: value.get(AUTO_RECORD_ENABLED_KEY).is_some_and(is_truthy),
            recorded_entries: value
                .get(RECORDED_ENTRIES_KEY)
                .map(sanitize_entries)
                .unwrap_or_default(),
        }
    }
}

/// A `chrome.storage.onChanged` notification reduced to the keys we track
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StorageChanges {
    pub auto_record_enabled: Option<bool>,
    pub recorded_entries: Option<Vec<RawRule>>,
}

impl StorageChanges {
    /// Parse the `changes` object (`{key: {oldValue, newValue}}`).
    ///
    /// A removed key has no `newValue` and reads as false / empty.
    pub fn from_value(changes: &Value) -> StorageChanges {
        let new_value = |key: &str| {
            changes
                .get(key)
                .map(|change| change.get("newValue").cloned().unwrap_or(Value::Null))
        };

        StorageChanges {
            auto_record_enabled: new_value(AUTO_RECORD_ENABLED_KEY).map(|value| is_truthy(&value)),
            recorded_entries: new_value(RECORDED_ENTRIES_KEY).map(|value| sanitize_entries(&value)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.auto_record_enabled.is_none() && self.recorded_entries.is_none()
    }
}

/// JavaScript truthiness, for values written by older versions or by hand
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
