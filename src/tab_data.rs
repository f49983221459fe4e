/// Data structures for tabs reported by the browser
use serde::{Deserialize, Serialize};

/// The parts of a `chrome.tabs.Tab` the closer looks at.
///
/// Every field is optional on the host side, so missing fields fall back to
/// empty defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TabInfo {
    pub id: Option<i32>,
    pub url: String,
    pub title: String,
    pub pending_url: String,
}

impl TabInfo {
    pub fn new(id: i32, url: &str, title: &str) -> TabInfo {
        TabInfo {
            id: Some(id),
            url: url.to_string(),
            title: title.to_string(),
            pending_url: String::new(),
        }
    }

    /// The committed URL, or the pending one while the tab is still loading
    pub fn effective_url(&self) -> &str {
        if self.url.is_empty() {
            &self.pending_url
        } else {
            &self.url
        }
    }
}

/// `changeInfo` of a `chrome.tabs.onUpdated` notification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabChange {
    pub url: Option<String>,
    pub title: Option<String>,
    pub status: Option<String>,
}

impl TabChange {
    /// Only URL/title changes and load completion can turn a tab into a match
    pub fn is_relevant(&self) -> bool {
        self.url.as_deref().is_some_and(|url| !url.is_empty())
            || self.title.as_deref().is_some_and(|title| !title.is_empty())
            || self.status.as_deref() == Some("complete")
    }
}
