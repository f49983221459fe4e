/// Rule definitions and their normalization into a matchable form
use log::warn;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A rule as stored in the bundled configuration or in `chrome.storage.local`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawRule {
    pub name: String,
    pub url_patterns: Vec<String>,
    pub title_must_include: Vec<String>,
    pub title_should_include_any: Vec<String>,
}

impl RawRule {
    /// Rule recorded automatically for a tab that showed up during a session
    pub fn recorded(url: &str, title: &str) -> RawRule {
        let title = title.trim();
        let label = if title.is_empty() { url } else { title };

        RawRule {
            name: format!("Auto: {}", label),
            url_patterns: vec![url.to_string()],
            title_must_include: Vec::new(),
            title_should_include_any: Vec::new(),
        }
    }

    /// Build a rule from an arbitrary JSON value, degrading field by field.
    ///
    /// Missing or mistyped fields become empty, non-string list items are dropped
    /// and the remaining items are trimmed with blanks removed.
    pub fn from_value(value: &Value) -> RawRule {
        RawRule {
            name: value
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            url_patterns: string_list(value.get("urlPatterns")),
            title_must_include: string_list(value.get("titleMustInclude")),
            title_should_include_any: string_list(value.get("titleShouldIncludeAny")),
        }
    }

    /// Whether `url` appears verbatim among this rule's URL patterns
    pub fn lists_url(&self, url: &str) -> bool {
        self.url_patterns.iter().any(|pattern| pattern == url)
    }
}

/// Matchable view of a [`RawRule`]. Rebuilt whenever the rule set changes.
#[derive(Debug, Clone)]
pub struct NormalizedRule {
    pub name: String,
    pub url_regexes: Vec<Regex>,
    /// Lower-cased substrings that must all appear in the title
    pub title_must_include: Vec<String>,
    /// Lower-cased substrings of which at least one must appear, if any are given
    pub title_should_include_any: Vec<String>,
}

/// Convert a sanitized JSON value into a list of rules.
///
/// A non-array value yields an empty list.
pub fn sanitize_entries(value: &Value) -> Vec<RawRule> {
    match value {
        Value::Array(entries) => entries.iter().map(RawRule::from_value).collect(),
        _ => Vec::new(),
    }
}

/// Compile a wildcard pattern into an anchored regex.
///
/// `*` matches any run of characters (including none); every other character
/// is literal.
pub fn compile_wildcard(pattern: &str) -> Result<Regex, regex::Error> {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");

    Regex::new(&format!("(?s)^{}$", body))
}

/// Normalize a rule. Never fails: a pattern that cannot be compiled is
/// dropped with a warning.
pub fn normalize(raw: &RawRule) -> NormalizedRule {
    let url_regexes = clean_strings(&raw.url_patterns)
        .into_iter()
        .filter_map(|pattern| match compile_wildcard(&pattern) {
            Ok(regex) => Some(regex),
            Err(e) => {
                warn!("Dropping URL pattern {:?} of rule {:?}: {}", pattern, raw.name, e);
                None
            }
        })
        .collect();

    NormalizedRule {
        name: raw.name.clone(),
        url_regexes,
        title_must_include: lowercase_all(&raw.title_must_include),
        title_should_include_any: lowercase_all(&raw.title_should_include_any),
    }
}

pub fn normalize_all(rules: &[RawRule]) -> Vec<NormalizedRule> {
    rules.iter().map(normalize).collect()
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn clean_strings(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn lowercase_all(items: &[String]) -> Vec<String> {
    clean_strings(items)
        .into_iter()
        .map(|item| item.to_lowercase())
        .collect()
}
