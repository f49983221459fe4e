/// State of the background worker and its reactions to browser events
use crate::matcher::is_match_any;
use crate::recording::{RecordOutcome, RecordedRules, RecordingSession};
use crate::rule::{NormalizedRule, RawRule};
use crate::storage::{StorageChanges, StorageData};
use crate::tab_data::TabInfo;
use log::info;

/// What the host should do after a tab was observed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabVerdict {
    /// Full recorded rule set to write back, when a rule was just recorded
    pub persist: Option<Vec<RawRule>>,
    pub close: bool,
}

/// Everything the background worker knows besides the bundled rules
#[derive(Debug, Clone, Default)]
pub struct Engine {
    auto_record_enabled: bool,
    recorded: RecordedRules,
    session: RecordingSession,
    initialized: bool,
    startup_pending: bool,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt the persisted state once it has been read.
    ///
    /// A startup event that arrived earlier opens its session now.
    pub fn initialize(&mut self, data: StorageData, now: f64) {
        self.auto_record_enabled = data.auto_record_enabled;
        self.recorded = RecordedRules::new(data.recorded_entries);
        self.initialized = true;
        info!(
            "Loaded {} recorded rule(s), auto-record {}",
            self.recorded.len(),
            if self.auto_record_enabled { "on" } else { "off" }
        );

        if std::mem::take(&mut self.startup_pending) && self.auto_record_enabled {
            self.session.start(now);
        }
    }

    pub fn on_startup(&mut self, now: f64) {
        if !self.initialized {
            self.startup_pending = true;
        } else if self.auto_record_enabled {
            self.session.start(now);
        }
    }

    pub fn apply_storage_changes(&mut self, changes: StorageChanges) {
        if let Some(enabled) = changes.auto_record_enabled {
            self.auto_record_enabled = enabled;
            if !enabled {
                self.session.stop();
            }
        }

        if let Some(entries) = changes.recorded_entries {
            self.recorded = RecordedRules::new(entries);
        }
    }

    /// Match against bundled rules followed by recorded ones
    pub fn should_close(&self, tab: &TabInfo, bundled: &[NormalizedRule]) -> bool {
        is_match_any(tab, &[bundled, self.recorded.normalized()])
    }

    /// Recording intake followed by the close decision
    pub fn observe_tab(&mut self, tab: &TabInfo, now: f64, bundled: &[NormalizedRule]) -> TabVerdict {
        let outcome = self.session.maybe_record(
            tab,
            now,
            self.auto_record_enabled,
            bundled,
            &mut self.recorded,
        );

        TabVerdict {
            persist: match outcome {
                RecordOutcome::Recorded(_) => Some(self.recorded.raw().to_vec()),
                _ => None,
            },
            close: self.should_close(tab, bundled),
        }
    }

    pub fn auto_record_enabled(&self) -> bool {
        self.auto_record_enabled
    }

    pub fn is_recording(&self, now: f64) -> bool {
        self.session.is_active(self.auto_record_enabled, now)
    }

    pub fn recorded(&self) -> &RecordedRules {
        &self.recorded
    }

    pub fn session(&self) -> &RecordingSession {
        &self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::RECORDING_WINDOW_MS;
    use crate::rule::normalize_all;

    const NOW: f64 = 1_700_000_000_000.0;

    fn bundled() -> Vec<NormalizedRule> {
        normalize_all(&[RawRule {
            name: "ABP".to_string(),
            url_patterns: vec!["https://welcome.adblockplus.org/*".to_string()],
            title_must_include: vec!["plus".to_string()],
            title_should_include_any: vec!["updated".to_string(), "first run".to_string()],
        }])
    }

    fn enabled_engine() -> Engine {
        let mut engine = Engine::new();
        engine.initialize(
            StorageData {
                auto_record_enabled: true,
                recorded_entries: Vec::new(),
            },
            NOW,
        );
        engine.on_startup(NOW);
        engine
    }

    #[test]
    fn test_startup_before_initialize_is_deferred() {
        let mut engine = Engine::new();
        engine.on_startup(NOW);
        assert!(!engine.is_recording(NOW));

        engine.initialize(
            StorageData {
                auto_record_enabled: true,
                recorded_entries: Vec::new(),
            },
            NOW + 5.0,
        );

        assert!(engine.is_recording(NOW + 5.0));
        assert_eq!(engine.session().active_until(), NOW + 5.0 + RECORDING_WINDOW_MS);
    }

    #[test]
    fn test_deferred_startup_ignored_when_disabled() {
        let mut engine = Engine::new();
        engine.on_startup(NOW);
        engine.initialize(StorageData::new(), NOW);

        assert!(!engine.is_recording(NOW));
    }

    #[test]
    fn test_startup_without_auto_record() {
        let mut engine = Engine::new();
        engine.initialize(StorageData::new(), NOW);
        engine.on_startup(NOW);

        assert!(!engine.is_recording(NOW));
    }

    #[test]
    fn test_observe_records_then_closes() {
        let mut engine = enabled_engine();
        let tab = TabInfo::new(7, "https://example.com/welcome", "Welcome");

        let verdict = engine.observe_tab(&tab, NOW + 1.0, &bundled());

        let persisted = verdict.persist.expect("recorded rule set");
        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted[0].name, "Auto: Welcome");
        // The freshly recorded exact URL now matches
        assert!(verdict.close);
        assert_eq!(engine.recorded().len(), 1);
    }

    #[test]
    fn test_observe_bundled_match_closes_without_recording() {
        let mut engine = enabled_engine();
        let tab = TabInfo::new(1, "", "Adblock Plus — First Run");

        let verdict = engine.observe_tab(&tab, NOW, &bundled());

        assert_eq!(verdict, TabVerdict { persist: None, close: true });
        assert!(engine.recorded().is_empty());
    }

    #[test]
    fn test_observe_outside_session_only_matches() {
        let mut engine = Engine::new();
        engine.initialize(StorageData::new(), NOW);

        let verdict = engine.observe_tab(&TabInfo::new(1, "https://example.com/", "Example"), NOW, &bundled());

        assert_eq!(verdict, TabVerdict::default());
    }

    #[test]
    fn test_expired_session_does_not_persist() {
        let mut engine = enabled_engine();
        let tab = TabInfo::new(7, "https://example.com/welcome", "Welcome");

        let verdict = engine.observe_tab(&tab, NOW + RECORDING_WINDOW_MS + 1.0, &bundled());

        assert_eq!(verdict.persist, None);
        assert!(!verdict.close);
    }

    #[test]
    fn test_disable_stops_session_immediately() {
        let mut engine = enabled_engine();
        engine.observe_tab(&TabInfo::new(1, "https://example.com/a", ""), NOW, &[]);
        assert!(engine.session().has_seen(1));

        engine.apply_storage_changes(StorageChanges {
            auto_record_enabled: Some(false),
            recorded_entries: None,
        });

        assert!(!engine.auto_record_enabled());
        assert!(!engine.session().has_seen(1));
        assert!(!engine.is_recording(NOW + 10.0));
        let verdict = engine.observe_tab(&TabInfo::new(2, "https://example.com/b", ""), NOW + 10.0, &[]);
        assert_eq!(verdict.persist, None);
        assert_eq!(engine.recorded().len(), 1);
    }

    #[test]
    fn test_enable_waits_for_next_startup() {
        let mut engine = Engine::new();
        engine.initialize(StorageData::new(), NOW);

        engine.apply_storage_changes(StorageChanges {
            auto_record_enabled: Some(true),
            recorded_entries: None,
        });
        assert!(!engine.is_recording(NOW));

        engine.on_startup(NOW);
        assert!(engine.is_recording(NOW));
    }

    #[test]
    fn test_recorded_entries_change_rebuilds_rules() {
        let mut engine = Engine::new();
        engine.initialize(StorageData::new(), NOW);
        let tab = TabInfo::new(3, "https://example.com/recorded", "");
        assert!(!engine.should_close(&tab, &[]));

        engine.apply_storage_changes(StorageChanges {
            auto_record_enabled: None,
            recorded_entries: Some(vec![RawRule::recorded("https://example.com/recorded", "")]),
        });

        assert!(engine.should_close(&tab, &[]));
    }
}
