//! Diacritic-insensitive station-name matching.

use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Fragments identifying the routes the dashboard cares about.
pub const DEFAULT_FRAGMENTS: &[&str] = &["brux", "brussel", "charleroi"];

static DEFAULT_MATCHER: LazyLock<RouteMatcher> = LazyLock::new(RouteMatcher::default);

/// Decomposes accented characters and drops the combining marks,
/// so `Liège` becomes `Liege`.
pub fn strip_diacritics(name: &str) -> String {
    name.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Case- and accent-insensitive substring test against a fixed set of
/// station-name fragments.
#[derive(Debug, Clone)]
pub struct RouteMatcher {
    // `None` when no fragments were configured: nothing matches.
    pattern: Option<Regex>,
}

impl RouteMatcher {
    pub fn new<S: AsRef<str>>(fragments: &[S]) -> Result<Self, regex::Error> {
        let alternation = fragments
            .iter()
            .map(|f| f.as_ref())
            .filter(|f| !f.is_empty())
            .map(|f| regex::escape(&strip_diacritics(f)))
            .collect::<Vec<_>>()
            .join("|");

        if alternation.is_empty() {
            return Ok(Self { pattern: None });
        }

        let pattern = RegexBuilder::new(&alternation)
            .case_insensitive(true)
            .build()?;
        Ok(Self {
            pattern: Some(pattern),
        })
    }

    pub fn matches(&self, station: &str) -> bool {
        self.pattern
            .as_ref()
            .is_some_and(|p| p.is_match(&strip_diacritics(station)))
    }
}

impl Default for RouteMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_FRAGMENTS).expect("default route fragments are valid")
    }
}

/// Tests `station` against the default Brussels/Charleroi fragments.
pub fn matches_route(station: &str) -> bool {
    DEFAULT_MATCHER.matches(station)
}
