/// Auto-recording of tabs that show up shortly after browser startup
use crate::matcher::is_match_any;
use crate::rule::{NormalizedRule, RawRule, normalize, normalize_all, sanitize_entries};
use crate::tab_data::TabInfo;
use log::{debug, info};
use serde_json::Value;
use std::collections::HashSet;
use url::Url;
use uuid::Uuid;

/// How long a session keeps recording after a startup event
pub const RECORDING_WINDOW_MS: f64 = 120_000.0;

/// Browser-internal and placeholder pages never worth recording
const INTERNAL_SCHEMES: &[&str] = &["chrome", "chrome-untrusted", "edge", "devtools", "about"];

/// Recorded rules, kept alongside their normalized form
#[derive(Debug, Clone, Default)]
pub struct RecordedRules {
    raw: Vec<RawRule>,
    normalized: Vec<NormalizedRule>,
}

impl RecordedRules {
    pub fn new(raw: Vec<RawRule>) -> RecordedRules {
        let normalized = normalize_all(&raw);
        RecordedRules { raw, normalized }
    }

    /// Rebuild from whatever is found under the `recordedEntries` key
    pub fn from_value(value: &Value) -> RecordedRules {
        RecordedRules::new(sanitize_entries(value))
    }

    pub fn raw(&self) -> &[RawRule] {
        &self.raw
    }

    pub fn normalized(&self) -> &[NormalizedRule] {
        &self.normalized
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn push(&mut self, rule: RawRule) {
        self.normalized.push(normalize(&rule));
        self.raw.push(rule);
    }

    /// Literal URL equality, not pattern matching
    pub fn lists_url(&self, url: &str) -> bool {
        self.raw.iter().any(|rule| rule.lists_url(url))
    }
}

/// Result of offering a tab to the recording session
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    Inactive,
    MissingTabId,
    BlankUrl,
    InternalUrl,
    AlreadySeen,
    AlreadyMatches,
    AlreadyRecorded,
    /// A new rule was appended; the recorded set must be persisted
    Recorded(RawRule),
}

/// A recording window opened by a startup event.
///
/// There is no timer: expiry is checked against `now` on every intake.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingSession {
    id: Uuid,
    active_until: f64,
    seen_tab_ids: HashSet<i32>,
}

impl RecordingSession {
    pub fn new() -> Self {
        RecordingSession {
            id: Uuid::nil(),
            active_until: 0.0,
            seen_tab_ids: HashSet::new(),
        }
    }

    pub fn start(&mut self, now: f64) {
        self.id = Uuid::new_v4();
        self.active_until = now + RECORDING_WINDOW_MS;
        self.seen_tab_ids.clear();
        info!(
            "Auto-recording first-run tabs is active (session {}, until {})",
            self.id, self.active_until
        );
    }

    pub fn stop(&mut self) {
        self.active_until = 0.0;
        self.seen_tab_ids.clear();
        info!("Auto-recording first-run tabs stopped (session {})", self.id);
    }

    pub fn is_active(&self, enabled: bool, now: f64) -> bool {
        enabled && self.active_until > 0.0 && now <= self.active_until
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn active_until(&self) -> f64 {
        self.active_until
    }

    pub fn has_seen(&self, tab_id: i32) -> bool {
        self.seen_tab_ids.contains(&tab_id)
    }

    /// Offer a freshly created or updated tab to the session.
    ///
    /// On [`RecordOutcome::Recorded`] the new rule has already been appended
    /// to `recorded`.
    pub fn maybe_record(
        &mut self,
        tab: &TabInfo,
        now: f64,
        enabled: bool,
        bundled: &[NormalizedRule],
        recorded: &mut RecordedRules,
    ) -> RecordOutcome {
        if !self.is_active(enabled, now) {
            return RecordOutcome::Inactive;
        }

        let outcome = self.intake(tab, bundled, recorded);
        if let RecordOutcome::Recorded(rule) = &outcome {
            info!("Recorded first-run tab {:?} as {:?}", rule.url_patterns, rule.name);
        } else {
            debug!("Not recording tab {:?}: {:?}", tab.id, outcome);
        }
        outcome
    }

    fn intake(
        &mut self,
        tab: &TabInfo,
        bundled: &[NormalizedRule],
        recorded: &mut RecordedRules,
    ) -> RecordOutcome {
        let Some(tab_id) = tab.id else {
            return RecordOutcome::MissingTabId;
        };

        let url = tab.effective_url().trim();
        if url.is_empty() {
            return RecordOutcome::BlankUrl;
        }
        if is_internal_url(url) {
            return RecordOutcome::InternalUrl;
        }

        if self.seen_tab_ids.contains(&tab_id) {
            return RecordOutcome::AlreadySeen;
        }

        if is_match_any(tab, &[bundled, recorded.normalized()]) {
            return RecordOutcome::AlreadyMatches;
        }

        if recorded.lists_url(url) {
            return RecordOutcome::AlreadyRecorded;
        }

        self.seen_tab_ids.insert(tab_id);
        let rule = RawRule::recorded(url, &tab.title);
        recorded.push(rule.clone());
        RecordOutcome::Recorded(rule)
    }
}

impl Default for RecordingSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether `url` is a browser-internal or placeholder page
pub fn is_internal_url(url: &str) -> bool {
    Url::parse(url.trim())
        .map(|parsed| INTERNAL_SCHEMES.contains(&parsed.scheme()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NOW: f64 = 1_700_000_000_000.0;

    fn active_session() -> RecordingSession {
        let mut session = RecordingSession::new();
        session.start(NOW);
        session
    }

    fn bundled() -> Vec<NormalizedRule> {
        normalize_all(&[RawRule {
            name: "ABP update".to_string(),
            url_patterns: vec!["https://adblockplus.org/*update*".to_string()],
            title_must_include: vec!["adblock plus".to_string()],
            ..RawRule::default()
        }])
    }

    #[test]
    fn test_new_session_is_inactive() {
        let session = RecordingSession::new();

        assert!(!session.is_active(true, NOW));
        assert_eq!(session.active_until(), 0.0);
        assert!(session.id().is_nil());
    }

    #[test]
    fn test_start_opens_window() {
        let session = active_session();

        assert!(session.is_active(true, NOW));
        assert!(session.is_active(true, NOW + RECORDING_WINDOW_MS));
        assert!(!session.is_active(true, NOW + RECORDING_WINDOW_MS + 1.0));
        assert!(!session.is_active(false, NOW));
        assert!(!session.id().is_nil());
    }

    #[test]
    fn test_records_new_tab() {
        let mut session = active_session();
        let mut recorded = RecordedRules::default();
        let tab = TabInfo::new(5, "chrome-extension://abc/firstRun.html", "Welcome to ABP");

        let outcome = session.maybe_record(&tab, NOW + 10.0, true, &bundled(), &mut recorded);

        let expected = RawRule {
            name: "Auto: Welcome to ABP".to_string(),
            url_patterns: vec!["chrome-extension://abc/firstRun.html".to_string()],
            ..RawRule::default()
        };
        assert_eq!(outcome, RecordOutcome::Recorded(expected.clone()));
        assert_eq!(recorded.raw(), &[expected]);
        assert_eq!(recorded.normalized().len(), 1);
        assert!(session.has_seen(5));
    }

    #[test]
    fn test_recorded_rule_matches_later_titled_tabs() {
        let mut session = active_session();
        let mut recorded = RecordedRules::default();
        let first = TabInfo::new(1, "https://example.com/welcome", "");
        let titled = TabInfo::new(2, "https://unrelated.example/", "Unrelated page");

        assert!(matches!(
            session.maybe_record(&first, NOW, true, &[], &mut recorded),
            RecordOutcome::Recorded(_)
        ));
        // Recorded rules carry no title conditions, so any titled tab matches them
        assert_eq!(
            session.maybe_record(&titled, NOW, true, &[], &mut recorded),
            RecordOutcome::AlreadyMatches
        );
        assert_eq!(recorded.len(), 1);
    }

    #[test]
    fn test_same_tab_recorded_once_per_session() {
        let mut session = active_session();
        let mut recorded = RecordedRules::default();

        let first = TabInfo::new(5, "https://example.com/welcome", "");
        let navigated = TabInfo::new(5, "https://example.com/welcome/step-2", "");

        assert!(matches!(
            session.maybe_record(&first, NOW, true, &[], &mut recorded),
            RecordOutcome::Recorded(_)
        ));
        assert_eq!(
            session.maybe_record(&navigated, NOW, true, &[], &mut recorded),
            RecordOutcome::AlreadySeen
        );
        assert_eq!(recorded.len(), 1);
    }

    #[test]
    fn test_tab_matching_recorded_rule_is_skipped() {
        let mut recorded = RecordedRules::new(vec![RawRule {
            name: "Earlier".to_string(),
            url_patterns: vec!["https://example.com/*".to_string(), "https://x/".to_string()],
            title_must_include: vec!["never".to_string()],
            ..RawRule::default()
        }]);
        let mut session = active_session();

        let outcome = session.maybe_record(&TabInfo::new(1, "https://x/", ""), NOW, true, &[], &mut recorded);

        assert_eq!(outcome, RecordOutcome::AlreadyMatches);
        assert_eq!(recorded.len(), 1);
    }

    #[test]
    fn test_literal_duplicate_check() {
        let mut recorded = RecordedRules::new(vec![RawRule::recorded("https://example.com/a*b", "")]);
        let mut session = active_session();
        let tab = TabInfo::new(9, "https://example.com/a*b", "");

        assert!(recorded.lists_url("https://example.com/a*b"));
        // "a*b" also matches itself as a wildcard, so the matcher catches it first
        assert_eq!(
            session.maybe_record(&tab, NOW, true, &[], &mut recorded),
            RecordOutcome::AlreadyMatches
        );
        assert_eq!(recorded.len(), 1);
        assert!(!session.has_seen(9));
    }

    #[test]
    fn test_duplicate_url_from_pending_url() {
        let mut recorded = RecordedRules::new(vec![RawRule::recorded("https://example.com/welcome", "")]);
        let mut session = active_session();
        // Not yet committed: the matcher only looks at the committed URL
        let tab = TabInfo {
            id: Some(3),
            pending_url: "https://example.com/welcome".to_string(),
            ..TabInfo::default()
        };

        assert_eq!(
            session.maybe_record(&tab, NOW, true, &[], &mut recorded),
            RecordOutcome::AlreadyRecorded
        );
        assert_eq!(recorded.len(), 1);
    }

    #[test]
    fn test_skips_tabs_matching_bundled_rules() {
        let mut session = active_session();
        let mut recorded = RecordedRules::default();
        let tab = TabInfo::new(2, "https://adblockplus.org/en/update", "");

        assert_eq!(
            session.maybe_record(&tab, NOW, true, &bundled(), &mut recorded),
            RecordOutcome::AlreadyMatches
        );
        assert!(recorded.is_empty());
    }

    #[test]
    fn test_skips_unusable_tabs() {
        let mut session = active_session();
        let mut recorded = RecordedRules::default();

        let no_id = TabInfo {
            url: "https://example.com/".to_string(),
            ..TabInfo::default()
        };
        assert_eq!(
            session.maybe_record(&no_id, NOW, true, &[], &mut recorded),
            RecordOutcome::MissingTabId
        );
        assert_eq!(
            session.maybe_record(&TabInfo::new(1, "   ", ""), NOW, true, &[], &mut recorded),
            RecordOutcome::BlankUrl
        );
        assert_eq!(
            session.maybe_record(&TabInfo::new(2, "chrome://newtab/", ""), NOW, true, &[], &mut recorded),
            RecordOutcome::InternalUrl
        );
        assert_eq!(
            session.maybe_record(&TabInfo::new(3, "about:blank", ""), NOW, true, &[], &mut recorded),
            RecordOutcome::InternalUrl
        );
        assert!(recorded.is_empty());
    }

    #[test]
    fn test_expired_session_records_nothing() {
        let mut session = active_session();
        let mut recorded = RecordedRules::default();
        let tab = TabInfo::new(1, "https://example.com/welcome", "Welcome");

        let outcome = session.maybe_record(&tab, NOW + RECORDING_WINDOW_MS + 1.0, true, &[], &mut recorded);

        assert_eq!(outcome, RecordOutcome::Inactive);
        assert!(recorded.is_empty());
        assert!(!session.has_seen(1));
    }

    #[test]
    fn test_stop_clears_seen_tabs() {
        let mut session = active_session();
        let mut recorded = RecordedRules::default();
        session.maybe_record(&TabInfo::new(1, "https://example.com/a", ""), NOW, true, &[], &mut recorded);
        assert!(session.has_seen(1));

        session.stop();

        assert!(!session.has_seen(1));
        assert!(!session.is_active(true, NOW));
        assert_eq!(
            session.maybe_record(&TabInfo::new(2, "https://example.com/b", ""), NOW, true, &[], &mut recorded),
            RecordOutcome::Inactive
        );
        assert_eq!(recorded.len(), 1);
    }

    #[test]
    fn test_restart_resets_seen_tabs() {
        let mut session = active_session();
        let mut recorded = RecordedRules::default();
        session.maybe_record(&TabInfo::new(1, "https://example.com/a", ""), NOW, true, &[], &mut recorded);
        let first_id = session.id();

        session.start(NOW + 1_000.0);

        assert!(!session.has_seen(1));
        assert_ne!(session.id(), first_id);
    }

    #[test]
    fn test_recorded_rules_from_value() {
        let recorded = RecordedRules::from_value(&json!([
            {"name": "Auto: A", "urlPatterns": ["https://a/"]},
            {"urlPatterns": "broken"}
        ]));

        assert_eq!(recorded.len(), 2);
        assert!(recorded.lists_url("https://a/"));
        assert!(!recorded.lists_url("https://a"));
        assert!(RecordedRules::from_value(&json!({"not": "a list"})).is_empty());
    }

    #[test]
    fn test_is_internal_url() {
        assert!(is_internal_url("chrome://extensions"));
        assert!(is_internal_url("CHROME://newtab/"));
        assert!(is_internal_url("about:blank"));
        assert!(is_internal_url("edge://settings"));
        assert!(!is_internal_url("chrome-extension://abc/firstRun.html"));
        assert!(!is_internal_url("https://adblockplus.org/"));
        assert!(!is_internal_url("not a url"));
    }
}
