//! Process-wide settings.
//!
//! Sources, lowest priority first: built-in defaults, an optional JSON file,
//! then environment variables (a `.env` file is honored by the binary).
//! Command-line flags are applied on top by the caller.
//!
//! ```json
//! {
//!   "station": "Nivelles",
//!   "lang": "fr",
//!   "route_fragments": ["brux", "brussel", "charleroi"],
//!   "refresh_interval_secs": 900
//! }
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::fetch::DEFAULT_USER_AGENT;
use crate::liveboard::DEFAULT_ENDPOINT;
use crate::route::{DEFAULT_FRAGMENTS, RouteMatcher};

pub const STATION_ENV: &str = "TRAIN_DASHBOARD_STATION";
pub const LAYOUT_ENV: &str = "TRAIN_DASHBOARD_LAYOUT";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub station: String,
    pub endpoint: String,
    pub lang: String,
    pub user_agent: String,
    pub route_fragments: Vec<String>,
    pub refresh_interval_secs: u64,
    /// Where the layout is persisted; `None` keeps it in memory only.
    pub layout_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            station: "Nivelles".to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            lang: "fr".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            route_fragments: DEFAULT_FRAGMENTS.iter().map(|s| s.to_string()).collect(),
            refresh_interval_secs: 15 * 60,
            layout_path: default_layout_path(),
        }
    }
}

impl Settings {
    /// Loads settings from a JSON file; fields left out keep their default.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Defaults or `path`, then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(settings.with_overrides(|key| std::env::var(key).ok()))
    }

    /// Applies overrides looked up through `var`.
    pub fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(station) = var(STATION_ENV).filter(|s| !s.trim().is_empty()) {
            self.station = station;
        }
        if let Some(layout) = var(LAYOUT_ENV) {
            self.layout_path = if layout.is_empty() {
                None
            } else {
                Some(PathBuf::from(layout))
            };
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(!self.station.trim().is_empty(), "station must not be empty");
        anyhow::ensure!(
            self.refresh_interval_secs > 0,
            "refresh_interval_secs must be positive"
        );
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn route_matcher(&self) -> Result<RouteMatcher> {
        RouteMatcher::new(self.route_fragments.as_slice()).context("Invalid route fragments")
    }
}

fn default_layout_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("train_dashboard").join("layout.json"))
}
