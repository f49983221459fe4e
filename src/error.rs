/// Error type shared by the background worker and the UI pages
use std::fmt;

/// Errors raised while talking to the host browser or parsing its data.
///
/// None of these are fatal: every caller logs them and degrades to
/// "do nothing" for the affected item.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtensionError {
    /// The bundled configuration could not be fetched or read.
    Config(String),
    /// A `chrome.storage.local` read or write failed.
    Storage(String),
    /// A tab operation (e.g. removal) failed.
    Tab(String),
    /// A value could not be converted to or from its JS representation.
    Serialization(String),
    /// Writing to the clipboard was refused.
    Clipboard(String),
    /// Starting a file download failed.
    Download(String),
}

impl fmt::Display for ExtensionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtensionError::Config(msg) => write!(f, "Configuration error: {}", msg),
            ExtensionError::Storage(msg) => write!(f, "Storage error: {}", msg),
            ExtensionError::Tab(msg) => write!(f, "Tab error: {}", msg),
            ExtensionError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            ExtensionError::Clipboard(msg) => write!(f, "Clipboard error: {}", msg),
            ExtensionError::Download(msg) => write!(f, "Download error: {}", msg),
        }
    }
}

impl std::error::Error for ExtensionError {}

impl From<serde_json::Error> for ExtensionError {
    fn from(err: serde_json::Error) -> Self {
        ExtensionError::Serialization(err.to_string())
    }
}
