/// Rule editing helpers for the configurator page
use crate::error::ExtensionError;
use crate::rule::RawRule;
use std::fmt;

/// File name offered when downloading the edited configuration
pub const EXPORT_FILE_NAME: &str = "first-run-config.json";

/// Split textarea content into one trimmed entry per non-blank line
pub fn parse_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Pretty-printed JSON array, as written to the bundled configuration file
pub fn to_pretty_json(rules: &[RawRule]) -> Result<String, ExtensionError> {
    Ok(serde_json::to_string_pretty(rules)?)
}

/// Confirmation shown after a manual reload, only when every source loaded
pub fn reload_notice<A, B, E>(
    refreshed: bool,
    bundled: &Result<A, E>,
    custom: &Result<B, E>,
) -> Option<&'static str> {
    (refreshed && bundled.is_ok() && custom.is_ok()).then_some("Reloaded configuration from file.")
}

/// Why a draft cannot be turned into a rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    MissingName,
    MissingUrlPattern,
}

impl fmt::Display for DraftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Both fields are required together in the form
        write!(f, "Name and at least one URL pattern are required.")
    }
}

impl std::error::Error for DraftError {}

/// Raw contents of the "add rule" form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleDraft {
    pub name: String,
    pub url_patterns: String,
    pub title_all: String,
    pub title_any: String,
}

impl RuleDraft {
    pub fn into_rule(self) -> Result<RawRule, DraftError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(DraftError::MissingName);
        }

        let url_patterns = parse_lines(&self.url_patterns);
        if url_patterns.is_empty() {
            return Err(DraftError::MissingUrlPattern);
        }

        Ok(RawRule {
            name,
            url_patterns,
            title_must_include: parse_lines(&self.title_all),
            title_should_include_any: parse_lines(&self.title_any),
        })
    }
}
