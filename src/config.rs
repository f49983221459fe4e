/// Bundled first-run configuration: parsing and process-wide caching
use crate::error::ExtensionError;
use crate::rule::{NormalizedRule, RawRule, normalize_all, sanitize_entries};
use log::{error, warn};
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;

/// Path of the configuration file inside the extension package
pub const BUNDLED_CONFIG_PATH: &str = "first-run-config.json";

/// Where the raw configuration text comes from
#[allow(async_fn_in_trait)]
pub trait ConfigSource {
    async fn fetch(&self) -> Result<String, ExtensionError>;
}

/// Parse configuration text into raw rules.
///
/// Fails on invalid JSON or when the top-level value is not an array;
/// individual malformed rules are repaired, never rejected.
pub fn parse_raw(text: &str) -> Result<Vec<RawRule>, ExtensionError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| ExtensionError::Config(format!("invalid JSON: {}", e)))?;

    if !value.is_array() {
        return Err(ExtensionError::Config(
            "Configuration JSON must be an array".to_string(),
        ));
    }

    Ok(sanitize_entries(&value))
}

/// Parse and normalize the bundled rules. Any problem yields an empty rule set.
pub fn parse_bundled(text: &str) -> Vec<NormalizedRule> {
    match parse_raw(text) {
        Ok(rules) => normalize_all(&rules),
        Err(e) => {
            warn!("First-run configuration ignored: {}", e);
            Vec::new()
        }
    }
}

/// The bundled rules, loaded at most once and then shared.
///
/// The bundle is immutable for the lifetime of the extension process, so the
/// cache is never invalidated. A failed fetch is cached as an empty rule set.
pub struct BundledConfig<S> {
    source: S,
    cached: RefCell<Option<Rc<[NormalizedRule]>>>,
}

impl<S: ConfigSource> BundledConfig<S> {
    pub fn new(source: S) -> Self {
        BundledConfig {
            source,
            cached: RefCell::new(None),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.cached.borrow().is_some()
    }

    pub async fn rules(&self) -> Rc<[NormalizedRule]> {
        if let Some(rules) = self.cached.borrow().clone() {
            return rules;
        }

        let loaded: Rc<[NormalizedRule]> = match self.source.fetch().await {
            Ok(text) => parse_bundled(&text).into(),
            Err(e) => {
                error!("Unable to load first-run configuration: {}", e);
                Rc::from(Vec::new())
            }
        };

        // Another caller may have finished loading while we were waiting
        self.cached.borrow_mut().get_or_insert(loaded).clone()
    }
}
