//! Value types shared by the fetcher, the aggregator and the views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of a movement the reference station sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Arrival,
    Departure,
}

impl Direction {
    /// Value of the upstream `arrdep` query parameter.
    pub fn as_param(self) -> &'static str {
        match self {
            Direction::Arrival => "arrival",
            Direction::Departure => "departure",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param())
    }
}

/// One scheduled train or bus movement at the reference station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub when: DateTime<Utc>,
    pub direction: Direction,
    pub counterpart_station: String,
    pub platform: Option<String>,
    pub delay_seconds: u32,
    pub canceled: bool,
    /// Normalized vehicle identifier such as `IC 1234`; empty when unknown.
    pub short_label: String,
    pub is_bus_substitution: bool,
}

/// Indicators shown on the KPI cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KpiSnapshot {
    pub loading: bool,
    pub average_delay_minutes: u32,
    pub cancel_percent: u32,
}

impl Default for KpiSnapshot {
    fn default() -> Self {
        Self {
            loading: true,
            average_delay_minutes: 0,
            cancel_percent: 0,
        }
    }
}
