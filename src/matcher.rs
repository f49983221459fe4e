/// Decide whether a tab matches a rule set
use crate::rule::NormalizedRule;
use crate::tab_data::TabInfo;

/// Whether the tab matches any rule.
///
/// A rule matches when one of its URL patterns matches the whole URL, or when
/// the (non-empty) title contains every required substring and at least one
/// of the optional ones (if any are listed). Empty substring lists are
/// satisfied by any non-empty title.
pub fn is_match(tab: &TabInfo, rules: &[NormalizedRule]) -> bool {
    is_match_any(tab, &[rules])
}

/// Same as [`is_match`] over several rule slices, e.g. bundled then recorded
pub fn is_match_any(tab: &TabInfo, rule_sets: &[&[NormalizedRule]]) -> bool {
    let title = tab.title.to_lowercase();

    rule_sets
        .iter()
        .flat_map(|rules| rules.iter())
        .any(|rule| matches_url(rule, &tab.url) || matches_title(rule, &title))
}

fn matches_url(rule: &NormalizedRule, url: &str) -> bool {
    !url.is_empty() && rule.url_regexes.iter().any(|regex| regex.is_match(url))
}

/// `title` must already be lower-cased
fn matches_title(rule: &NormalizedRule, title: &str) -> bool {
    if title.is_empty() {
        return false;
    }

    rule.title_must_include.iter().all(|part| title.contains(part.as_str()))
        && (rule.title_should_include_any.is_empty()
            || rule
                .title_should_include_any
                .iter()
                .any(|part| title.contains(part.as_str())))
}
